//! DataAccess CLI
//!
//! Command-line entry point for the SQLite record mapper

use clap::{Parser, Subcommand};
use dataaccess_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "dataaccess")]
#[command(about = "DataAccess - SQLite record mapper", long_about = None)]
struct Cli {
    /// Logging profile: development, production or test
    #[arg(long, global = true, env = "DATAACCESS_LOG", default_value = "development")]
    log_profile: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the create / read / update / count / get / delete scenario
    Smoke(commands::smoke::SmokeArgs),
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.log_profile);

    let result = match cli.command {
        Commands::Smoke(args) => commands::smoke::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
