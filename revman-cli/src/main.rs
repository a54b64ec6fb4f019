//! Revman CLI - Command line interface for the review manager
//!
//! Creates teams and pull requests, assigns and reassigns reviewers, and
//! merges pull requests against a local SQLite database.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use revman_core::{AssignmentEngine, Config, Error};
use revman_db::Database;
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PrArgs, TeamArgs, UserArgs};

/// Revman: reviewer assignment for pull requests
#[derive(Parser, Debug)]
#[command(name = "revman")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides config and env)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Seed for reviewer selection (overrides config and env)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "REVMAN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage teams
    #[command(visible_alias = "t")]
    Team(TeamArgs),

    /// Manage users
    #[command(visible_alias = "u")]
    User(UserArgs),

    /// Create, merge and reassign pull requests
    Pr(PrArgs),

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for results
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(err) = run(cli).await {
        let (code, message, status) = match err.downcast_ref::<Error>() {
            Some(e) => (e.code(), e.public_message(), e.exit_code()),
            None => ("INTERNAL_ERROR", "internal error".to_string(), 1),
        };
        if status == 1 {
            tracing::error!(error = %err, "Command failed");
        } else {
            tracing::debug!(error = %err, "Command rejected");
        }
        eprintln!("{}", json!({ "code": code, "message": message }));
        std::process::exit(status);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.config.as_deref(), cli.db, cli.seed)?;

    if cli.verbose {
        tracing::info!(
            db_path = %config.database.path.display(),
            seed = ?config.engine.seed,
            "Configuration loaded"
        );
    }

    match cli.command {
        Commands::Version => {
            println!("revman {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Config => {
            let config_file = cli.config.or_else(Config::default_config_path);
            let output = json!({
                "config_file": config_file.as_ref().map(|p| p.display().to_string()),
                "config_file_exists": config_file.as_ref().is_some_and(|p| p.exists()),
                "config": config,
            });
            commands::print_json(&output)
        }
        command => {
            let db = Database::connect(&config.database)
                .await
                .map_err(Error::from)?;
            let engine = AssignmentEngine::from_config(db.transactions(), &config.engine);

            let result = match command {
                Commands::Team(args) => args.execute(&engine).await,
                Commands::User(args) => args.execute(&engine).await,
                Commands::Pr(args) => args.execute(&engine).await,
                Commands::Config | Commands::Version => Ok(()),
            };

            db.close().await;
            result
        }
    }
}
