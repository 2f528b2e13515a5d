//! catalog-sync
//!
//! Publishes Terra workspace and TDR snapshot metadata to the data catalog
//! and maintains the catalog's test and collection entries.

#![forbid(unsafe_code)]

mod auth;
mod clients;
mod commands;
mod http;
mod output;

use anyhow::Result;
use catalog_sync_common::types::Environment;
use catalog_sync_common::{CliOverrides, LogConfig, SyncConfig, init_logging};
use clap::{Parser, Subcommand};
use commands::Context;
use commands::config_cmd::ConfigAction;
use commands::datasets::DatasetsAction;
use commands::ingest::IngestArgs;
use commands::publish::PublishArgs;
use commands::refresh::RefreshArgs;
use commands::snapshot::SnapshotArgs;
use commands::validate::ValidateArgs;
use commands::workspace::WorkspaceArgs;
use output::{OutputFormat, render_error};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(author, version, about = "Sync Terra workspace and TDR snapshot metadata into the data catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Target environment (prod, dev, alpha, staging, perf)
    #[arg(long, global = true)]
    environment: Option<Environment>,

    /// gcloud account to run as for this invocation
    #[arg(long, global = true)]
    user: Option<String>,

    /// Output format for command results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to CATALOG_SYNC_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a catalog dataset from a metadata file
    Publish(PublishArgs),

    /// Convert a Rawls workspace into a catalog dataset
    Workspace(WorkspaceArgs),

    /// Convert a TDR snapshot into a catalog dataset
    Snapshot(SnapshotArgs),

    /// Overwrite catalog datasets with test metadata keyed by title
    RefreshTestMetadata(RefreshArgs),

    /// Publish every snapshot entry of a collection file
    IngestCollection(IngestArgs),

    /// Inspect catalog datasets
    Datasets {
        #[command(subcommand)]
        action: DatasetsAction,
    },

    /// Check catalog entries locally
    Validate(ValidateArgs),

    /// Inspect the resolved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env("info").with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    let _logging_guards = match init_logging(&log_config) {
        Ok(guards) => guards,
        Err(err) => {
            eprint!("{}", render_error(&err.into()));
            return ExitCode::FAILURE;
        }
    };

    if !std::io::stderr().is_terminal() || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", render_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = SyncConfig::resolve(&CliOverrides {
        environment: cli.environment,
        user: cli.user,
        config_path: cli.config,
    })?;
    debug!(
        environment = %config.environment.value,
        catalog_url = %config.catalog_url.value,
        "resolved configuration"
    );
    let ctx = Context::new(config, cli.format);

    match &cli.command {
        Commands::Publish(args) => commands::publish::run(&ctx, args).await,
        Commands::Workspace(args) => commands::workspace::run(&ctx, args).await,
        Commands::Snapshot(args) => commands::snapshot::run(&ctx, args).await,
        Commands::RefreshTestMetadata(args) => commands::refresh::run(&ctx, args).await,
        Commands::IngestCollection(args) => commands::ingest::run(&ctx, args).await,
        Commands::Datasets { action } => commands::datasets::run(&ctx, action).await,
        Commands::Validate(args) => commands::validate::run(&ctx, args).await,
        Commands::Config { action } => commands::config_cmd::run(&ctx, action),
    }
}
