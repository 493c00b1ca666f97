//! GitHub Releases API.

pub mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::{GitHubAsset, GitHubRelease};
