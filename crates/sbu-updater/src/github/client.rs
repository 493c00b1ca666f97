//! Blocking GitHub API client for fetching release information.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

use super::types::GitHubRelease;
use crate::config::{LauncherConfig, Repository};
use crate::error::{LaunchError, Result};

/// GitHub API client bound to one API host.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Creates a client using the host, user agent and timeouts from `config`.
    pub fn new(config: &LauncherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| {
                LaunchError::Config(format!("invalid user agent '{}': {e}", config.user_agent))
            })?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LaunchError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the latest-release endpoint for `repository`.
    #[must_use]
    pub fn latest_release_url(&self, repository: &Repository) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.base_url, repository.owner, repository.name
        )
    }

    /// Fetches the latest release of `repository`.
    pub fn get_latest_release(&self, repository: &Repository) -> Result<GitHubRelease> {
        let url = self.latest_release_url(repository);

        tracing::debug!("Fetching latest release from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| LaunchError::Network(format!("request to {url} failed: {e}")))?;

        Self::handle_response(response)
    }

    /// Checks the HTTP status and parses the JSON body.
    fn handle_response(response: Response) -> Result<GitHubRelease> {
        let status = response.status();

        if status == StatusCode::FORBIDDEN
            && response
                .headers()
                .get("x-ratelimit-remaining")
                .is_some_and(|remaining| remaining.to_str().unwrap_or("1") == "0")
        {
            let retry_after = response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|reset| {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or(0);
                    reset.saturating_sub(now)
                })
                .unwrap_or(60);

            return Err(LaunchError::Network(format!(
                "GitHub API rate limit exceeded, retry after {retry_after} seconds"
            )));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(LaunchError::Network(
                "no releases found for this repository".to_string(),
            ));
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LaunchError::Network(format!(
                "GitHub API error ({status}): {body}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| LaunchError::Network(format!("failed to read response body: {e}")))?;

        let release: GitHubRelease = serde_json::from_str(&body)?;
        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_release_url() {
        let config = LauncherConfig {
            api_base_url: "https://example.test/".to_string(),
            ..LauncherConfig::default()
        };
        let client = GitHubClient::new(&config).unwrap();
        let repo: Repository = "acme/browser".parse().unwrap();
        assert_eq!(
            client.latest_release_url(&repo),
            "https://example.test/repos/acme/browser/releases/latest"
        );
    }

    #[test]
    fn test_invalid_user_agent_is_config_error() {
        let config = LauncherConfig {
            user_agent: "bad\nagent".to_string(),
            ..LauncherConfig::default()
        };
        assert!(matches!(
            GitHubClient::new(&config),
            Err(LaunchError::Config(_))
        ));
    }
}
