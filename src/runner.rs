//! Top-level sequence for one setup run.

use crate::config::{
    parse_bool_input, INPUT_CAGE_VERSION, INPUT_GITHUB_TOKEN, INPUT_USE_PRE, INPUT_USE_PRE_RELEASE,
    TOOL_NAME,
};
use crate::download::Transport;
use crate::error::SetupError;
use crate::github::ReleaseSource;
use crate::host::ActionHost;
use crate::install::Installer;
use crate::platform::Platform;
use crate::selector::{get_valid_candidate, Selection};
use anyhow::Result;
use std::path::PathBuf;

/// Message shown to the workflow when a run fails; details go to the log.
pub const FAILURE_MESSAGE: &str = "see error above";

fn require_input<H: ActionHost>(host: &H, name: &str) -> Result<String> {
    let value = host.get_input(name);
    if value.is_empty() {
        return Err(SetupError::MissingRequiredConfig {
            name: name.to_string(),
        }
        .into());
    }
    Ok(value)
}

/// Either spelling of the pre-release switch enables it.
pub fn use_pre_release<H: ActionHost>(host: &H) -> bool {
    parse_bool_input(&host.get_input(INPUT_USE_PRE_RELEASE))
        || parse_bool_input(&host.get_input(INPUT_USE_PRE))
}

pub struct Runner<'a, S: ReleaseSource, T: Transport> {
    pub releases: &'a S,
    pub installer: &'a Installer<'a, T>,
    pub platform: &'a Platform,
}

impl<'a, S: ReleaseSource, T: Transport> Runner<'a, S, T> {
    /// Resolve and install cage. Returns the installed directory, or `None`
    /// when a `cage` binary was already on the search path.
    pub async fn run<H: ActionHost>(&self, host: &H) -> Result<Option<PathBuf>> {
        let token = require_input(host, INPUT_GITHUB_TOKEN)?;
        let use_pre_release = use_pre_release(host);
        let requested = host.get_input(INPUT_CAGE_VERSION);
        let required_version = Some(requested.as_str()).filter(|v| !v.is_empty());

        let releases = self.releases.fetch_releases(&token).await?;
        let cage = get_valid_candidate(
            &releases,
            &Selection {
                platform: self.platform,
                required_version,
                use_pre_release,
            },
        )?
        .ok_or_else(|| SetupError::NoValidCandidate {
            requested: required_version.unwrap_or("latest").to_string(),
        })?;

        match required_version {
            None => host.info(&format!(
                "No version specified. Using latest version: {}",
                cage.version
            )),
            Some(_) if !cage.is_latest => host.warning(&format!(
                "New version of cage found: current={}, latest={}",
                cage.version, cage.latest_version
            )),
            Some(_) => {}
        }

        if let Some(existing) = host.which(TOOL_NAME) {
            host.info(&format!(
                "cage is already installed at '{}'. Skipping installation.",
                existing.display()
            ));
            return Ok(None);
        }

        let installed = self.installer.install(&cage, host).await?;
        Ok(Some(installed))
    }

    /// Run and report. This is the only place errors stop propagating.
    pub async fn run_and_report<H: ActionHost>(&self, host: &H) -> bool {
        match self.run(host).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("{:#}", e);
                host.set_failed(FAILURE_MESSAGE);
                false
            }
        }
    }
}
