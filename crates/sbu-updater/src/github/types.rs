//! GitHub API types.
//!
//! Only the fields the launcher reads are modelled; everything else in the
//! release payload is ignored.

use serde::Deserialize;

/// Release data from the `releases/latest` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    /// The release tag name (e.g., "v1.2.0").
    pub tag_name: String,

    /// Release assets in the order GitHub lists them.
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

impl GitHubRelease {
    /// Finds the first asset whose name is exactly `name`.
    #[must_use]
    pub fn find_asset(&self, name: &str) -> Option<&GitHubAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Release asset data from the GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    /// Asset filename.
    pub name: String,

    /// Direct download URL.
    pub browser_download_url: String,

    /// File size in bytes, if reported.
    #[serde(default)]
    pub size: Option<u64>,
}
