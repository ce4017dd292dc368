//! The capabilities the runner needs from whatever is hosting it.
//!
//! [`GitHubActionsHost`] speaks the Actions runner protocol: inputs come from
//! `INPUT_*` variables, messages are workflow commands on stdout, and new
//! search path entries are appended to the `GITHUB_PATH` file.

use crate::config::{github_path_file, input_env_name};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub trait ActionHost {
    /// Trimmed input value; empty when unset.
    fn get_input(&self, name: &str) -> String;
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn set_failed(&self, message: &str);
    /// Locate an executable on the search path.
    fn which(&self, tool: &str) -> Option<PathBuf>;
    /// Make `dir` part of the search path for later steps.
    fn add_path(&self, dir: &Path) -> Result<()>;
}

#[derive(Default)]
pub struct GitHubActionsHost {
    overrides: HashMap<String, String>,
    github_path: Option<PathBuf>,
}

impl GitHubActionsHost {
    pub fn from_env() -> Self {
        GitHubActionsHost {
            overrides: HashMap::new(),
            github_path: github_path_file(),
        }
    }

    /// Use `value` for input `name` instead of the environment.
    pub fn with_input(mut self, name: &str, value: impl Into<String>) -> Self {
        self.overrides.insert(name.to_string(), value.into());
        self
    }
}

/// Escape a message for use inside a workflow command.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

impl ActionHost for GitHubActionsHost {
    fn get_input(&self, name: &str) -> String {
        if let Some(value) = self.overrides.get(name) {
            return value.trim().to_string();
        }
        std::env::var(input_env_name(name))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        println!("::warning::{}", escape_data(message));
    }

    fn set_failed(&self, message: &str) {
        println!("::error::{}", escape_data(message));
    }

    fn which(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }

    fn add_path(&self, dir: &Path) -> Result<()> {
        let Some(path_file) = &self.github_path else {
            tracing::warn!("GITHUB_PATH is not set; add {} to PATH manually", dir.display());
            self.info(&format!("Add to PATH: {}", dir.display()));
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path_file)
            .with_context(|| format!("Could not open {}", path_file.display()))?;
        writeln!(file, "{}", dir.display())?;
        tracing::debug!("Appended {} to {}", dir.display(), path_file.display());
        Ok(())
    }
}
