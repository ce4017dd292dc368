use clap::{Args, Parser, Subcommand};

pub(crate) fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // Release builds are tagged; report the tag alone
    if let Some(tag) = option_env!("SETUP_CAGE_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("SETUP_CAGE_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("SETUP_CAGE_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup so clap can hold a &'static str
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "setup-cage")]
#[command(about = "Install a checksum-verified canarycage release into the runner's tool cache")]
#[command(version = get_version(), propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Defaults to `install` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve, verify and install cage (the action entry point)
    #[command(
        after_help = "Inputs not given as flags are read from INPUT_GITHUB-TOKEN, INPUT_CAGE-VERSION\nand INPUT_USE-PRE-RELEASE (or INPUT_USE-PRE), as set by the Actions runner."
    )]
    Install(InstallArgs),

    /// List the releases installable on this platform, highest first
    List {
        /// Token for the GitHub API (falls back to the github-token input)
        #[arg(long)]
        github_token: Option<String>,
        /// Include pre-release versions
        #[arg(long)]
        use_pre_release: bool,
    },

    /// Show the current version
    Version,
}

#[derive(Args, Default)]
pub struct InstallArgs {
    /// Token for the GitHub API
    #[arg(long)]
    pub github_token: Option<String>,

    /// Exact release tag to install; latest when omitted
    #[arg(long)]
    pub cage_version: Option<String>,

    /// Consider pre-release versions
    #[arg(long)]
    pub use_pre_release: bool,
}
