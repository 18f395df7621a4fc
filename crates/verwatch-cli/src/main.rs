//! verwatch CLI
//!
//! Watches a version catalog and announces changes to webhooks

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "verwatch")]
#[command(about = "verwatch - Version catalog change announcer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll the catalog and announce changes until interrupted
    Run(commands::run::RunArgs),
    /// Compare two entries of the current catalog
    Compare(commands::compare::CompareArgs),
    /// Validate a configuration file
    CheckConfig(commands::check_config::CheckConfigArgs),
}

#[tokio::main]
async fn main() {
    // a missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Compare(args) => commands::compare::execute(args).await,
        Commands::CheckConfig(args) => commands::check_config::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
