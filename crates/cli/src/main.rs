//! Storeloom CLI - bulk product import tools.
//!
//! # Usage
//!
//! ```bash
//! # Show what a file looks like to the importer
//! sl-cli import inspect products.csv
//!
//! # Validate a file and print the records as JSON
//! sl-cli import preview products.csv --pretty
//!
//! # Validate and submit to the product API
//! sl-cli import run products.csv
//!
//! # Validate and walk the submission loop without sending anything
//! sl-cli import run products.csv --dry-run
//! ```
//!
//! # Commands
//!
//! - `import inspect` - Headers, detected format and inferred mapping
//! - `import preview` - Import report as JSON
//! - `import run` - Submit every record; exits non-zero if any failed

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod repository;

use commands::import::PrepareArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(author, version, about = "Storeloom CLI tools")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bulk product import
    Import {
        #[command(subcommand)]
        action: ImportAction,
    },
}

#[derive(Subcommand)]
enum ImportAction {
    /// Show headers, detected format and inferred column mapping
    Inspect {
        /// CSV file to inspect
        file: PathBuf,
    },
    /// Validate a file and print the import report as JSON
    Preview {
        #[command(flatten)]
        args: PrepareArgs,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a file and create every product through the product API
    Run {
        #[command(flatten)]
        args: PrepareArgs,

        /// Go through the submission loop without sending anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays clean for reports.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Import { action } => match action {
            ImportAction::Inspect { file } => commands::import::inspect(&file).await?,
            ImportAction::Preview { args, pretty } => {
                commands::import::preview(&args, pretty).await?;
            }
            ImportAction::Run { args, dry_run } => commands::import::run(&args, dry_run).await?,
        },
    }
    Ok(())
}
