use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Runs the binary inside a scratch runner environment.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub tool_cache: PathBuf,
    pub runner_temp: PathBuf,
    pub github_path: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let tool_cache = temp_dir.path().join("tool-cache");
        let runner_temp = temp_dir.path().join("runner-temp");
        let github_path = temp_dir.path().join("github_path");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_setup-cage"));

        Self {
            _temp_dir: temp_dir,
            tool_cache,
            runner_temp,
            github_path,
            bin_path,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        // Inputs leaking in from an outer workflow would change the run
        for (key, _) in std::env::vars() {
            if key.starts_with("INPUT_") {
                cmd.env_remove(key);
            }
        }
        cmd.env_remove("RUST_LOG");
        cmd.env("RUNNER_TOOL_CACHE", &self.tool_cache);
        cmd.env("RUNNER_TEMP", &self.runner_temp);
        cmd.env("GITHUB_PATH", &self.github_path);
        cmd.env("HOME", self._temp_dir.path());
        cmd
    }

    /// Directories registered through the GITHUB_PATH file.
    pub fn registered_paths(&self) -> Vec<String> {
        std::fs::read_to_string(&self.github_path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        if self.status.success() {
            panic!(
                "Command unexpectedly succeeded\nstdout: {}\nstderr: {}",
                self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
