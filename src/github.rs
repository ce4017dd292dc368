//! GitHub API interaction module
//!
//! Lists the published releases of the canarycage project.

use crate::error::SetupError;
use crate::types::GitHubRelease;
use anyhow::{Context, Result};
use reqwest::StatusCode;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const RELEASE_OWNER: &str = "loilo-inc";
pub const RELEASE_REPO: &str = "canarycage";

/// Anything that can list canarycage releases.
pub trait ReleaseSource {
    async fn fetch_releases(&self, token: &str) -> Result<Vec<GitHubRelease>>;
}

pub struct ReleaseClient {
    client: reqwest::Client,
    api_base: String,
}

impl ReleaseClient {
    pub fn new(api_base: &str) -> Self {
        ReleaseClient {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Build the release listing URL for the fixed project coordinate.
    pub fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases?per_page=100",
            self.api_base, RELEASE_OWNER, RELEASE_REPO
        )
    }
}

impl ReleaseSource for ReleaseClient {
    /// Fetch the raw release list. No filtering or sorting happens here.
    async fn fetch_releases(&self, token: &str) -> Result<Vec<GitHubRelease>> {
        let url = self.releases_url();
        tracing::debug!("Fetching GitHub releases from: {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header(
                "User-Agent",
                concat!("setup-cage/", env!("CARGO_PKG_VERSION")),
            );

        if !token.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            return Err(SetupError::Fetch {
                status: response.status(),
            }
            .into());
        }

        let releases: Vec<GitHubRelease> = response
            .json()
            .await
            .context("Could not parse release list")?;
        tracing::debug!("Fetched {} releases", releases.len());
        Ok(releases)
    }
}

impl Default for ReleaseClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}
