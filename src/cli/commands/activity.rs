//! Activity CLI commands.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::context::ServiceContext;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{format_duration, ActivityStatistics};

#[derive(Args, Debug)]
pub struct ActivityArgs {
    #[command(subcommand)]
    pub command: ActivityCommands,
}

#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// Start an activity on a supervision; closes the previous one
    Start {
        /// Supervision ID
        supervision: Uuid,
        /// Catalog activity ID
        activity: Uuid,
        /// Acting supervisor
        #[arg(long)]
        actor: Uuid,
        /// Explicit start instant (RFC 3339); defaults to now
        #[arg(long)]
        start_date: Option<DateTime<Utc>>,
    },
    /// Finish an activity record
    Finish {
        /// Record ID
        id: Uuid,
    },
    /// Show one record
    Show {
        /// Record ID
        id: Uuid,
    },
    /// List all records of a supervision in execution order
    List {
        /// Supervision ID
        supervision: Uuid,
    },
    /// Mark a record as verified
    Verify {
        /// Record ID
        id: Uuid,
    },
    /// Clear the verification mark
    Unverify {
        /// Record ID
        id: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ActivityOutput {
    pub id: String,
    pub activity_id: String,
    pub sequence: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub duration: String,
    pub failure_id: Option<String>,
    pub verified: bool,
}

impl From<&ActivityStatistics> for ActivityOutput {
    fn from(record: &ActivityStatistics) -> Self {
        Self {
            id: record.id.to_string(),
            activity_id: record.activity_id.to_string(),
            sequence: record.sequence,
            start_date: record.start_date.to_rfc3339(),
            end_date: record.end_date.map(|d| d.to_rfc3339()),
            duration: format_duration(record.duration()),
            failure_id: record.failure_id.map(|id| id.to_string()),
            verified: record.verified,
        }
    }
}

impl CommandOutput for ActivityOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Record: {}", self.id),
            format!("Activity: {}", self.activity_id),
            format!("Position: {}", self.sequence),
            format!("Started: {}", self.start_date),
        ];
        match &self.end_date {
            Some(end) => lines.push(format!("Finished: {} ({})", end, self.duration)),
            None => lines.push("Finished: running".to_string()),
        }
        if let Some(failure) = &self.failure_id {
            lines.push(format!("Failure: {failure}"));
        }
        lines.push(format!("Verified: {}", if self.verified { "yes" } else { "no" }));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ActivityListOutput {
    pub records: Vec<ActivityOutput>,
    pub total: usize,
}

impl CommandOutput for ActivityListOutput {
    fn to_human(&self) -> String {
        if self.records.is_empty() {
            return "No activity records found.".to_string();
        }

        let mut lines = vec![format!("Found {} record(s):\n", self.total)];
        lines.push(format!(
            "{:<4} {:<36} {:<8} {:<10}",
            "#", "ACTIVITY", "LENGTH", "FAILURE"
        ));
        lines.push("-".repeat(62));

        for record in &self.records {
            lines.push(format!(
                "{:<4} {:<36} {:<8} {:<10}",
                record.sequence,
                record.activity_id,
                record.duration,
                record
                    .failure_id
                    .as_deref()
                    .map_or_else(|| "-".to_string(), |id| truncate(id, 8)),
            ));
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ActivityArgs, json: bool) -> Result<()> {
    let ctx = ServiceContext::init().await?;

    match args.command {
        ActivityCommands::Start {
            supervision,
            activity,
            actor,
            start_date,
        } => {
            let record = ctx
                .activities
                .start_activity(supervision, activity, actor, start_date)
                .await?;
            output(&ActivityOutput::from(&record), json);
        }
        ActivityCommands::Finish { id } => {
            ctx.activities.finish_activity(id).await?;
            let record = ctx.activities.get(id).await?;
            output(&ActivityOutput::from(&record), json);
        }
        ActivityCommands::Show { id } => {
            let record = ctx.activities.get(id).await?;
            output(&ActivityOutput::from(&record), json);
        }
        ActivityCommands::List { supervision } => {
            let records = ctx.activities.list(supervision).await?;
            let outputs: Vec<ActivityOutput> = records.iter().map(ActivityOutput::from).collect();
            output(
                &ActivityListOutput {
                    total: outputs.len(),
                    records: outputs,
                },
                json,
            );
        }
        ActivityCommands::Verify { id } => {
            let record = ctx.activities.verify(id).await?;
            output(&ActivityOutput::from(&record), json);
        }
        ActivityCommands::Unverify { id } => {
            let record = ctx.activities.clear_verification(id).await?;
            output(&ActivityOutput::from(&record), json);
        }
    }

    Ok(())
}
