use crate::github::DEFAULT_API_BASE;
use anyhow::Result;
use std::path::PathBuf;

pub const APP_NAME: &str = "setup-cage";
pub const TOOL_NAME: &str = "cage";
pub const TOOL_CACHE_DIR_NAME: &str = "tool-cache";

pub const INPUT_GITHUB_TOKEN: &str = "github-token";
pub const INPUT_CAGE_VERSION: &str = "cage-version";
pub const INPUT_USE_PRE_RELEASE: &str = "use-pre-release";
/// Older spelling of [`INPUT_USE_PRE_RELEASE`], still honored.
pub const INPUT_USE_PRE: &str = "use-pre";

pub const ENV_API_URL: &str = "GITHUB_API_URL";
pub const ENV_GITHUB_PATH: &str = "GITHUB_PATH";
pub const ENV_TOOL_CACHE: &str = "RUNNER_TOOL_CACHE";
pub const ENV_RUNNER_TEMP: &str = "RUNNER_TEMP";

/// Environment variable the runner exposes an action input under.
///
/// `github-token` becomes `INPUT_GITHUB-TOKEN`; hyphens are kept.
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Inputs are booleans only when spelled exactly `true`.
pub fn parse_bool_input(value: &str) -> bool {
    value.trim() == "true"
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn api_base() -> String {
    non_empty_env(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

pub fn github_path_file() -> Option<PathBuf> {
    non_empty_env(ENV_GITHUB_PATH).map(PathBuf::from)
}

/// Root of the tool cache: the runner's, or one under the user data directory.
pub fn tool_cache_root() -> Result<PathBuf> {
    if let Some(root) = non_empty_env(ENV_TOOL_CACHE) {
        return Ok(PathBuf::from(root));
    }
    let path = dirs::data_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
        .join(APP_NAME)
        .join(TOOL_CACHE_DIR_NAME);
    tracing::debug!("RUNNER_TOOL_CACHE unset, using {}", path.display());
    Ok(path)
}

/// Parent directory for per-run scratch space.
pub fn temp_root() -> PathBuf {
    non_empty_env(ENV_RUNNER_TEMP)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}
