//! Sparksonic CLI - Store bootstrap and seeding tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the documents table and unique indexes
//! sparksonic-cli db init
//!
//! # Load portfolio entries
//! sparksonic-cli seed projects crates/cli/fixtures/projects.yaml
//!
//! # Write a synthetic review fixture
//! sparksonic-cli seed reviews --count 54 --output reviews.json
//! ```
//!
//! # Commands
//!
//! - `db init` - Create the store schema (idempotent)
//! - `seed projects` - Insert portfolio entries from YAML
//! - `seed reviews` - Generate review fixtures as JSON

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sparksonic_api::services::reviews::fixtures::DEFAULT_REVIEW_COUNT;

mod commands;

#[derive(Parser)]
#[command(name = "sparksonic-cli")]
#[command(author, version, about = "Sparksonic CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the document store
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    /// Seed content and fixtures
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Create the documents table and indexes
    Init,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert portfolio projects from a YAML file
    Projects {
        /// Path to the YAML file
        file: PathBuf,
    },
    /// Generate synthetic reviews and write them as JSON
    Reviews {
        /// Number of reviews to generate
        #[arg(short, long, default_value_t = DEFAULT_REVIEW_COUNT)]
        count: usize,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Db { action } => match action {
            DbAction::Init => commands::db::init().await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Projects { file } => commands::seed::projects(&file).await?,
            SeedTarget::Reviews {
                count,
                output,
                seed,
            } => commands::seed::reviews(count, output.as_deref(), seed).await?,
        },
    }
    Ok(())
}
