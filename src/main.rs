//! Shiftwatch CLI entry point.

use clap::Parser;

use shiftwatch::cli::{Cli, Commands};
use shiftwatch::infrastructure::config::ConfigLoader;
use shiftwatch::infrastructure::logging::Logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging = ConfigLoader::load()
        .map(|config| config.logging)
        .unwrap_or_default();
    let _logger = Logger::init(&logging);

    let result = match cli.command {
        Commands::Init(args) => shiftwatch::cli::commands::init::execute(args, cli.json).await,
        Commands::Supervision(args) => {
            shiftwatch::cli::commands::supervision::execute(args, cli.json).await
        }
        Commands::Activity(args) => {
            shiftwatch::cli::commands::activity::execute(args, cli.json).await
        }
        Commands::Failure(args) => {
            shiftwatch::cli::commands::failure::execute(args, cli.json).await
        }
        Commands::Comment(args) => {
            shiftwatch::cli::commands::comment::execute(args, cli.json).await
        }
    };

    if let Err(err) = result {
        shiftwatch::cli::handle_error(err, cli.json);
    }
}
