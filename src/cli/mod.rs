//! Command-line interface.

pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};

pub use context::ServiceContext;

#[derive(Parser)]
#[command(name = "shiftwatch")]
#[command(about = "Supervision and work-activity tracking", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize configuration and database
    Init(commands::init::InitArgs),

    /// Supervision session commands
    Supervision(commands::supervision::SupervisionArgs),

    /// Activity record commands
    Activity(commands::activity::ActivityArgs),

    /// Failure window commands
    Failure(commands::failure::FailureArgs),

    /// Comment commands
    Comment(commands::comment::CommentArgs),
}

/// Prints a command error in the selected format and exits non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        eprintln!("{}", serde_json::json!({ "error": err.to_string() }));
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
