//! Trailforge CLI - Database migrations and catalog maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema and session table)
//! tf-cli migrate
//!
//! # Create products from a YAML file
//! tf-cli seed crates/cli/seed/products.yaml
//!
//! # Rewrite display order to 0..n-1
//! tf-cli products renumber
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tf-cli")]
#[command(author, version, about = "Trailforge CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Create products from a YAML file
    Seed {
        /// Path to the YAML file
        file: PathBuf,

        /// Validate the file without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Product maintenance
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Rewrite display order to a dense 0..n-1 sequence
    Renumber,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tf_cli=info,trailforge_server=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { file, dry_run } => commands::seed::products(&file, dry_run).await,
        Commands::Products { action } => match action {
            ProductAction::Renumber => commands::products::renumber().await,
        },
    }
}
