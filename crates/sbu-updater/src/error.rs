//! Error types for the launcher.

use thiserror::Error;

/// Errors that can end a launcher run.
///
/// Every variant is terminal: the coordinator never retries, it reports the
/// failing step once and exits non-zero.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LaunchError {
    /// Local state (version file, config file, repository identifier) unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP transport failure while talking to the release endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// Malformed JSON or malformed version string.
    #[error("parse error: {0}")]
    Parse(String),

    /// The latest release has no asset with the expected name.
    #[error("no release asset named '{0}' found")]
    NoAssetFound(String),

    /// The update download did not complete cleanly.
    #[error("transfer error: {0}")]
    Transfer(String),

    /// A process could not be started.
    #[error("failed to start '{program}': {reason}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        reason: String,
    },
}

impl LaunchError {
    /// Name of the launcher step this error belongs to.
    #[must_use]
    pub const fn step(&self) -> &'static str {
        match self {
            Self::Config(_) => "read configuration",
            Self::Network(_) => "check for updates",
            Self::Parse(_) => "read release information",
            Self::NoAssetFound(_) => "find updater",
            Self::Transfer(_) => "download updater",
            Self::Spawn { .. } => "start program",
        }
    }

    /// Returns a user-friendly error message suitable for a console prompt.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Config(_) => "The local installation could not be read.",
            Self::Network(_) => {
                "Could not reach the update server. Please check your internet connection."
            }
            Self::Parse(_) => "The update server returned information that could not be read.",
            Self::NoAssetFound(_) => "Updater not found in the latest release.",
            Self::Transfer(_) => "Failed to download the updater.",
            Self::Spawn { .. } => "Failed to start the program.",
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }
}

impl From<serde_json::Error> for LaunchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type alias for launcher operations.
pub type Result<T> = std::result::Result<T, LaunchError>;
