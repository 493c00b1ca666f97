//! Latest-release resolution.

use crate::config::{LauncherConfig, Repository};
use crate::error::Result;
use crate::github::{GitHubClient, GitHubRelease};

/// What the launcher needs to know about the latest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Release tag, normally a version such as "v1.2.0".
    pub tag: String,
    /// Download URL of the update asset. Empty when no asset matched.
    pub asset_url: String,
    /// Name of the matched asset, if any.
    pub asset_name: Option<String>,
    /// Declared size of the matched asset, if reported.
    pub asset_size: Option<u64>,
}

impl ReleaseInfo {
    /// Builds release info by picking the first asset named exactly `asset_name`.
    #[must_use]
    pub fn from_release(release: &GitHubRelease, asset_name: &str) -> Self {
        let asset = release.find_asset(asset_name);
        Self {
            tag: release.tag_name.clone(),
            asset_url: asset
                .map(|a| a.browser_download_url.clone())
                .unwrap_or_default(),
            asset_name: asset.map(|a| a.name.clone()),
            asset_size: asset.and_then(|a| a.size),
        }
    }

    /// Whether an update asset was found.
    #[must_use]
    pub fn has_asset(&self) -> bool {
        !self.asset_url.is_empty()
    }
}

/// Queries the release endpoint and extracts the update asset.
#[derive(Debug, Clone)]
pub struct ReleaseResolver {
    client: GitHubClient,
    asset_name: String,
}

impl ReleaseResolver {
    /// Creates a resolver looking for `config.asset_name`.
    pub fn new(config: &LauncherConfig) -> Result<Self> {
        Ok(Self {
            client: GitHubClient::new(config)?,
            asset_name: config.asset_name.clone(),
        })
    }

    /// Name of the asset this resolver looks for.
    #[must_use]
    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    /// Resolves the latest release of `repository`.
    ///
    /// A release without a matching asset is not an error here; the returned
    /// [`ReleaseInfo`] simply has an empty `asset_url`.
    pub fn resolve_latest(&self, repository: &Repository) -> Result<ReleaseInfo> {
        let release = self.client.get_latest_release(repository)?;
        let info = ReleaseInfo::from_release(&release, &self.asset_name);

        if info.has_asset() {
            tracing::info!(
                "Latest release {} provides {} ({})",
                info.tag,
                self.asset_name,
                info.asset_url
            );
        } else {
            tracing::info!(
                "Latest release {} has no asset named {} ({} assets listed)",
                info.tag,
                self.asset_name,
                release.assets.len()
            );
        }

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::GitHubAsset;

    #[test]
    fn test_from_release_without_match() {
        let release = GitHubRelease {
            tag_name: "v2.0.0".to_string(),
            assets: vec![GitHubAsset {
                name: "foo.exe".to_string(),
                browser_download_url: "https://x/foo.exe".to_string(),
                size: Some(10),
            }],
        };
        let info = ReleaseInfo::from_release(&release, "updater.exe");
        assert_eq!(info.tag, "v2.0.0");
        assert!(info.asset_url.is_empty());
        assert!(!info.has_asset());
        assert_eq!(info.asset_name, None);
        assert_eq!(info.asset_size, None);
    }

    #[test]
    fn test_from_release_with_match() {
        let release = GitHubRelease {
            tag_name: "1.1.0".to_string(),
            assets: vec![GitHubAsset {
                name: "updater.exe".to_string(),
                browser_download_url: "https://x/u.exe".to_string(),
                size: Some(4096),
            }],
        };
        let info = ReleaseInfo::from_release(&release, "updater.exe");
        assert_eq!(info.asset_url, "https://x/u.exe");
        assert_eq!(info.asset_name.as_deref(), Some("updater.exe"));
        assert_eq!(info.asset_size, Some(4096));
    }
}
