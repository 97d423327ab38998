mod builtin;
mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use project_files::{DiskFileSystem, FallbackFetcher, ProjectLoader, SyncOptions};
use project_files_remote::{AutoDecoder, HttpFetcher};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::builtin::BuiltinFiles;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "project-files")]
#[command(about = "Populate a workspace with course project files")]
struct Cli {
    /// Primary archive location (overrides config)
    #[arg(long, global = true)]
    archive_url: Option<String>,
    /// Directory project paths are resolved under (overrides config)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Directory project files are written to, relative to the root
    #[arg(long, global = true)]
    base_path: Option<String>,
    /// Never try the fallback archive location
    #[arg(long, global = true)]
    no_fallback: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create project files that do not exist yet
    Create,
    /// Overwrite project files with fresh copies
    Reset {
        /// Project id to reset when falling back to built-in files (repeatable)
        #[arg(long = "project")]
        projects: Vec<String>,
    },
    /// Overwrite test files (.tst, .cmp) with built-in copies
    ResetTests {
        /// Project id to reset (repeatable)
        #[arg(long = "project")]
        projects: Vec<String>,
    },
    /// Synchronize from an archive file on disk
    Load {
        /// Path to a .zip or .tar.gz archive
        archive: PathBuf,
        /// Overwrite files that already exist
        #[arg(long)]
        overwrite: bool,
    },
    /// List the project ids in the archive
    Projects,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Apply command-line overrides on top of the loaded config.
fn apply_overrides(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(url) = &cli.archive_url {
        config.archive_url = url.clone();
    }
    if let Some(root) = &cli.root {
        config.root = Some(root.clone());
    }
    if let Some(base_path) = &cli.base_path {
        config.base_path = base_path.clone();
    }
    if cli.no_fallback {
        config.use_fallback = false;
    }
    config
}

fn build_loader(config: &AppConfig) -> Result<ProjectLoader<HttpFetcher, AutoDecoder>> {
    let http = match config.timeout() {
        Some(timeout) => HttpFetcher::with_timeout(timeout).context("failed to build HTTP client")?,
        None => HttpFetcher::new(),
    };
    let fetcher = FallbackFetcher::new(http, config.fallback_location());

    Ok(ProjectLoader::new(fetcher, AutoDecoder).with_archive_url(&config.archive_url))
}

fn sync_options(config: &AppConfig) -> SyncOptions {
    SyncOptions::default()
        .with_base_path(&config.base_path)
        .with_fallback(config.use_fallback)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = apply_overrides(config::load_config(), &cli);

    let loader = build_loader(&config)?;
    let fs = DiskFileSystem::new(config.root.clone().unwrap_or_else(|| PathBuf::from(".")));
    let builtin = BuiltinFiles::new(&config.base_path);

    match cli.command {
        Command::Create => {
            commands::create::run(&loader, &builtin, &fs, sync_options(&config)).await
        }
        Command::Reset { projects } => {
            commands::reset::run(&loader, &builtin, &fs, &projects, sync_options(&config)).await
        }
        Command::ResetTests { projects } => {
            commands::reset_tests::run(&builtin, &fs, &projects).await
        }
        Command::Load { archive, overwrite } => {
            commands::load::run(&loader, &fs, &archive, overwrite, sync_options(&config)).await
        }
        Command::Projects => commands::projects::run(&loader).await,
    }
}
