//! Shardgate, main entrypoint.

use clap::Parser;
use shardgate::cli::{self, Cli, Commands};
use shardgate::config;
use std::process::exit;
use tracing::error;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    // Before loading, so config warnings are visible. The log format
    // comes from SHARDGATE_LOG_FORMAT at this point.
    shardgate::logger();

    let config = config::load(&args.config)?;

    match args.command {
        Commands::Configcheck => {
            if let Err(err) = cli::config_check(&config) {
                error!("{}", err);
                exit(1);
            }
        }

        Commands::Route { statement, params } => {
            let output = cli::route(&config, &statement, params.as_deref())?;
            println!("{}", output);
        }

        Commands::Keygen { table, count } => {
            for key in cli::keygen(&config, table.as_deref(), count)? {
                println!("{}", key);
            }
        }
    }

    Ok(())
}
