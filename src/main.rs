use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reposweep::report::ConsoleReporter;
use reposweep::{
    Config, Credential, GitHubClient, RemoteDirectory, RunMode, RunOptions, Sweeper, Whitelist,
};

#[derive(Parser)]
#[command(name = "reposweep")]
#[command(about = "Delete every GitHub repository that is not on the whitelist")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete every owned repository that is not whitelisted
    Run {
        /// Report what would be deleted without deleting (also enabled by DRY_RUN=true)
        #[arg(long)]
        dry_run: bool,

        /// Whitelist file (overrides the configured path)
        #[arg(short, long)]
        whitelist: Option<PathBuf>,
    },

    /// Show the keep/delete split without deleting anything
    Plan {
        /// Whitelist file (overrides the configured path)
        #[arg(short, long)]
        whitelist: Option<PathBuf>,
    },

    /// Manage authentication
    Auth {
        #[command(subcommand)]
        auth_command: AuthCommands,
    },

    /// Write a starter whitelist file
    Init {
        /// Where to write the whitelist (defaults to the configured path)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Show which account the token belongs to
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config)?;
    init_logging(cli.verbose, &config.logging.level)?;
    info!("Starting reposweep v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run { dry_run, whitelist } => {
            let dry_run_env = std::env::var("DRY_RUN").ok();
            let mode = RunMode::resolve(dry_run, dry_run_env.as_deref());
            cmd_run(mode, whitelist, &config).await
        }
        Commands::Plan { whitelist } => cmd_run(RunMode::DryRun, whitelist, &config).await,
        Commands::Auth { auth_command } => cmd_auth(auth_command, &config).await,
        Commands::Init { path, force } => cmd_init(path, force, &config),
    }
}

/// Initialize logging based on verbosity level; logs go to stderr, the report to stdout
fn init_logging(verbose: bool, default_level: &str) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

fn github_client(config: &Config) -> Result<GitHubClient> {
    let credential = Credential::from_env(&config.github.token_env)?;
    Ok(GitHubClient::new(&config.github, credential)?)
}

/// Reconcile owned repositories against the whitelist and delete the rest
async fn cmd_run(mode: RunMode, whitelist: Option<PathBuf>, config: &Config) -> Result<()> {
    let client = github_client(config)?;
    let options = RunOptions {
        mode,
        whitelist_path: whitelist.unwrap_or_else(|| config.whitelist_path()),
    };

    let sweeper = Sweeper::new(client, options);
    let mut reporter = ConsoleReporter::stdout();
    let summary = sweeper.run(&mut reporter).await?;

    info!(
        "Sweep for {} complete: {} kept, {} deleted, {} failed",
        summary.username,
        summary.partition.to_keep.len(),
        summary.report.succeeded(),
        summary.report.failed()
    );

    Ok(())
}

/// Handle authentication commands
async fn cmd_auth(auth_command: AuthCommands, config: &Config) -> Result<()> {
    match auth_command {
        AuthCommands::Status => {
            let client = github_client(config)?;
            let username = client.whoami().await?;
            println!("✅ Authentication successful");
            println!("   Username: {}", username);
            Ok(())
        }
    }
}

/// Write the whitelist template
fn cmd_init(path: Option<PathBuf>, force: bool, config: &Config) -> Result<()> {
    let path = path.unwrap_or_else(|| config.whitelist_path());

    if path.exists() && !force {
        bail!(
            "Whitelist already exists at {}. Use --force to overwrite it",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    std::fs::write(&path, Whitelist::template())
        .with_context(|| format!("Failed to write whitelist: {:?}", path))?;

    println!("✅ Whitelist written to {}", path.display());
    println!("   Replace the example entry with the repositories you want to keep,");
    println!("   then preview with 'reposweep plan'.");

    Ok(())
}
