//! Failure CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::context::ServiceContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{format_duration, Failure};

#[derive(Args, Debug)]
pub struct FailureArgs {
    #[command(subcommand)]
    pub command: FailureCommands,
}

#[derive(Subcommand, Debug)]
pub enum FailureCommands {
    /// Open a failure window on the current record of an activity
    Start {
        /// Supervision ID
        supervision: Uuid,
        /// Catalog activity ID
        activity: Uuid,
    },
    /// Close the failure window reachable from the current record
    Finish {
        /// Supervision ID
        supervision: Uuid,
        /// Catalog activity ID
        activity: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct FailureOutput {
    pub id: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub duration: String,
}

impl From<&Failure> for FailureOutput {
    fn from(failure: &Failure) -> Self {
        Self {
            id: failure.id.to_string(),
            start_date: failure.start_date.to_rfc3339(),
            end_date: failure.end_date.map(|d| d.to_rfc3339()),
            duration: format_duration(failure.duration()),
        }
    }
}

impl CommandOutput for FailureOutput {
    fn to_human(&self) -> String {
        match &self.end_date {
            Some(end) => format!(
                "Failure {}\nStarted: {}\nEnded: {} ({})",
                self.id, self.start_date, end, self.duration
            ),
            None => format!("Failure {}\nStarted: {}\nStill open", self.id, self.start_date),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: FailureArgs, json: bool) -> Result<()> {
    let ctx = ServiceContext::init().await?;

    match args.command {
        FailureCommands::Start {
            supervision,
            activity,
        } => {
            let failure = ctx.failures.start_failure(supervision, activity).await?;
            output(&FailureOutput::from(&failure), json);
        }
        FailureCommands::Finish {
            supervision,
            activity,
        } => {
            let failure = ctx.failures.finish_failure(supervision, activity).await?;
            output(&FailureOutput::from(&failure), json);
        }
    }

    Ok(())
}
