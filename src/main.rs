mod checksum;
mod cli;
mod config;
mod download;
mod error;
mod github;
mod host;
mod install;
mod platform;
mod runner;
mod selector;
mod tool_cache;
mod types;
mod version;


use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, InstallArgs};
use config::{
    api_base, temp_root, tool_cache_root, INPUT_CAGE_VERSION, INPUT_GITHUB_TOKEN,
    INPUT_USE_PRE_RELEASE,
};
use download::HttpTransport;
use github::{ReleaseClient, ReleaseSource};
use host::{ActionHost, GitHubActionsHost};
use install::Installer;
use platform::Platform;
use runner::{use_pre_release, Runner, FAILURE_MESSAGE};
use selector::list_valid_releases;
use tool_cache::ToolCache;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli)?;

    match cli.command.unwrap_or(Commands::Install(InstallArgs::default())) {
        Commands::Version => {
            println!("setup-cage {}", cli::get_version());
        }

        Commands::List {
            github_token,
            use_pre_release: pre_flag,
        } => {
            let mut host = GitHubActionsHost::from_env();
            if let Some(token) = github_token {
                host = host.with_input(INPUT_GITHUB_TOKEN, token);
            }
            if let Err(e) = list_releases(&host, pre_flag).await {
                tracing::error!("{:#}", e);
                host.set_failed(FAILURE_MESSAGE);
                std::process::exit(1);
            }
        }

        Commands::Install(args) => {
            let host = host_for_install(args);
            if !install(&host).await {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries workflow commands, so logs go to stderr
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

fn host_for_install(args: InstallArgs) -> GitHubActionsHost {
    let mut host = GitHubActionsHost::from_env();
    if let Some(token) = args.github_token {
        host = host.with_input(INPUT_GITHUB_TOKEN, token);
    }
    if let Some(version) = args.cage_version {
        host = host.with_input(INPUT_CAGE_VERSION, version);
    }
    if args.use_pre_release {
        host = host.with_input(INPUT_USE_PRE_RELEASE, "true");
    }
    host
}

async fn install(host: &GitHubActionsHost) -> bool {
    let cache = match tool_cache_root() {
        Ok(root) => ToolCache::new(root),
        Err(e) => {
            tracing::error!("{:#}", e);
            host.set_failed(FAILURE_MESSAGE);
            return false;
        }
    };

    tracing::debug!("Tool cache root: {}", cache.root().display());

    let platform = Platform::current();
    let client = ReleaseClient::new(&api_base());
    let transport = HttpTransport::new();
    let installer = Installer::new(&transport, &cache, &platform.arch, &temp_root());

    let runner = Runner {
        releases: &client,
        installer: &installer,
        platform: &platform,
    };
    runner.run_and_report(host).await
}

async fn list_releases(host: &GitHubActionsHost, pre_flag: bool) -> Result<()> {
    let platform = Platform::current();
    let client = ReleaseClient::new(&api_base());
    let token = host.get_input(INPUT_GITHUB_TOKEN);
    let releases = client.fetch_releases(&token).await?;

    let valid = list_valid_releases(&releases, &platform, pre_flag || use_pre_release(host));
    println!("--- canarycage releases for {} ---", platform);
    if valid.is_empty() {
        println!("  No installable releases found.");
        return Ok(());
    }

    for (i, release) in valid.iter().enumerate() {
        let mut line = format!("  {}", release.tag_name);
        if i == 0 {
            line.push_str(&format!(" {}", console::style("(latest)").green()));
        }
        if release.prerelease {
            line.push_str(&format!(" {}", console::style("(pre-release)").yellow()));
        }
        println!("{}", line);
    }
    Ok(())
}
