//! Launcher configuration.
//!
//! Every literal the launcher needs (repository, asset name, executables,
//! version file, timeouts) lives here. Values come from defaults, an optional
//! JSON file, and finally command-line overrides applied by the binary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LaunchError, Result};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "launcher.json";

/// Default release repository.
pub const DEFAULT_REPOSITORY: &str = "Daniel-McGuire-Corporation/Simple-BrowserCS";

/// Default release-metadata API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default local version file.
pub const DEFAULT_VERSION_FILE: &str = "update.ini";

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("simple-browser-updater/", env!("CARGO_PKG_VERSION"));

/// Platform-appropriate name of the updater asset.
#[must_use]
pub fn default_asset_name() -> String {
    executable_name("updater")
}

/// Platform-appropriate name of the main application.
#[must_use]
pub fn default_app_executable() -> String {
    executable_name("SimpleBrowser")
}

fn executable_name(stem: &str) -> String {
    if cfg!(windows) {
        format!("{stem}.exe")
    } else {
        stem.to_string()
    }
}

/// A release repository written as `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl FromStr for Repository {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(LaunchError::Config(format!(
                "invalid repository '{s}': expected OWNER/REPO"
            ))),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Launcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Release repository as `owner/repo`.
    pub repository: String,

    /// Base URL of the release-metadata API.
    pub api_base_url: String,

    /// Exact name of the release asset to download.
    pub asset_name: String,

    /// Where the downloaded updater is written and launched from.
    pub updater_path: PathBuf,

    /// Main application binary started when no update is needed.
    pub app_executable: PathBuf,

    /// Process name used to terminate the running application before updating.
    pub app_process_name: String,

    /// File whose first line is the installed version.
    pub version_file: PathBuf,

    /// Directory relative paths are resolved against (current directory when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// User agent for all requests.
    pub user_agent: String,

    /// Connect timeout for every request, in seconds.
    pub connect_timeout_secs: u64,

    /// Overall timeout for the release-metadata request, in seconds.
    pub request_timeout_secs: u64,

    /// Overall timeout for the download, in seconds. No limit when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_timeout_secs: Option<u64>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        let asset_name = default_asset_name();
        let app_executable = default_app_executable();
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            updater_path: PathBuf::from(&asset_name),
            asset_name,
            app_process_name: app_executable.clone(),
            app_executable: PathBuf::from(app_executable),
            version_file: PathBuf::from(DEFAULT_VERSION_FILE),
            working_dir: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            download_timeout_secs: None,
        }
    }
}

impl LauncherConfig {
    /// Reads the configuration from a JSON file. Missing keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LaunchError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            LaunchError::Config(format!("failed to parse config file {}: {e}", path.display()))
        })
    }

    /// Loads `explicit` if given, otherwise `launcher.json` in `dir` if it
    /// exists, otherwise the defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!("Loading config from {}", candidate.display());
            Self::from_file(&candidate)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parsed repository identifier.
    pub fn repository(&self) -> Result<Repository> {
        self.repository.parse()
    }

    /// Base directory for relative paths. Always absolute; a relative
    /// `working_dir` is taken relative to the current directory.
    pub fn base_dir(&self) -> Result<PathBuf> {
        match &self.working_dir {
            Some(dir) if dir.is_absolute() => Ok(dir.clone()),
            Some(dir) => Ok(current_dir()?.join(dir)),
            None => current_dir(),
        }
    }

    /// Resolves `path` against the base directory unless it is absolute.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.base_dir()?.join(path))
        }
    }

    /// Connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Overall timeout for the metadata request.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Overall timeout for the download, if any.
    #[must_use]
    pub fn download_timeout(&self) -> Option<Duration> {
        self.download_timeout_secs.map(Duration::from_secs)
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir()
        .map_err(|e| LaunchError::Config(format!("failed to determine current directory: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LauncherConfig::default();
        assert_eq!(config.repository, DEFAULT_REPOSITORY);
        assert_eq!(config.version_file, PathBuf::from("update.ini"));
        assert_eq!(config.updater_path, PathBuf::from(&config.asset_name));
        assert_eq!(
            config.app_executable,
            PathBuf::from(&config.app_process_name)
        );
        assert!(config.asset_name.starts_with("updater"));
        assert!(config.download_timeout().is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_repository_parsing() {
        let repo: Repository = "owner/repo".parse().unwrap();
        assert_eq!(repo.owner, "owner");
        assert_eq!(repo.name, "repo");
        assert_eq!(repo.to_string(), "owner/repo");

        for bad in ["", "owner", "/repo", "owner/", "a/b/c"] {
            assert!(
                matches!(bad.parse::<Repository>(), Err(LaunchError::Config(_))),
                "expected config error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: LauncherConfig =
            serde_json::from_str(r#"{"repository": "acme/browser", "asset_name": "setup.exe"}"#)
                .unwrap();
        assert_eq!(config.repository, "acme/browser");
        assert_eq!(config.asset_name, "setup.exe");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let config = LauncherConfig {
            working_dir: Some(dir.path().to_path_buf()),
            ..LauncherConfig::default()
        };

        assert_eq!(
            config.resolve(Path::new("update.ini")).unwrap(),
            dir.path().join("update.ini")
        );

        let absolute = dir.path().join("elsewhere");
        assert_eq!(config.resolve(&absolute).unwrap(), absolute);
    }

    #[test]
    fn test_relative_working_dir_resolves_to_absolute_path() {
        let config = LauncherConfig {
            working_dir: Some(PathBuf::from("app")),
            ..LauncherConfig::default()
        };
        let cwd = std::env::current_dir().unwrap();

        assert_eq!(config.base_dir().unwrap(), cwd.join("app"));
        let app = config.resolve(&config.app_executable).unwrap();
        assert!(app.is_absolute());
        assert_eq!(app, cwd.join("app").join(&config.app_executable));
    }

    #[test]
    fn test_load_prefers_file_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            LauncherConfig::load(None, dir.path()).unwrap(),
            LauncherConfig::default()
        );

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{"repository": "acme/browser"}"#,
        )
        .unwrap();
        let config = LauncherConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.repository, "acme/browser");
    }

    #[test]
    fn test_load_malformed_or_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            LauncherConfig::load(Some(&missing), dir.path()),
            Err(LaunchError::Config(_))
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            LauncherConfig::from_file(&broken),
            Err(LaunchError::Config(_))
        ));
    }
}
