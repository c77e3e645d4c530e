//! Supervision CLI commands.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::context::ServiceContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{format_duration, Supervision};
use crate::domain::ports::SupervisionFilter;

#[derive(Args, Debug)]
pub struct SupervisionArgs {
    #[command(subcommand)]
    pub command: SupervisionCommands,
}

#[derive(Subcommand, Debug)]
pub enum SupervisionCommands {
    /// Start a new supervision session
    Start {
        /// Worker being observed
        worker: Uuid,
        /// Organization the session is scoped to
        #[arg(short, long)]
        organization: Uuid,
        /// Acting supervisor
        #[arg(short, long)]
        supervisor: Uuid,
    },
    /// Finish a session, closing whatever is still open underneath
    Finish {
        /// Supervision ID
        id: Uuid,
    },
    /// Show session details
    Show {
        /// Supervision ID
        id: Uuid,
    },
    /// List sessions
    List {
        /// Only sessions active on this day / starting this range
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// End of the range
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Filter by supervisor
        #[arg(long)]
        supervisor: Option<Uuid>,
        /// Filter by worker
        #[arg(long)]
        worker: Option<Uuid>,
    },
    /// Mark a session as verified
    Verify {
        /// Supervision ID
        id: Uuid,
    },
    /// Clear the verification mark
    Unverify {
        /// Supervision ID
        id: Uuid,
    },
    /// Delete every unverified session
    Cleanup,
}

#[derive(Debug, serde::Serialize)]
pub struct SupervisionOutput {
    pub id: String,
    pub worker_id: String,
    pub supervisor_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub duration: String,
    pub validity: bool,
    pub verified: bool,
}

impl From<&Supervision> for SupervisionOutput {
    fn from(supervision: &Supervision) -> Self {
        Self {
            id: supervision.id.to_string(),
            worker_id: supervision.worker_id.to_string(),
            supervisor_id: supervision.supervisor_id.to_string(),
            start_date: supervision.start_date.to_rfc3339(),
            end_date: supervision.end_date.map(|d| d.to_rfc3339()),
            duration: format_duration(supervision.duration()),
            validity: supervision.validity,
            verified: supervision.verified,
        }
    }
}

impl CommandOutput for SupervisionOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Supervision: {}", self.id),
            format!("Worker: {}", self.worker_id),
            format!("Supervisor: {}", self.supervisor_id),
            format!("Started: {}", self.start_date),
        ];
        match &self.end_date {
            Some(end) => lines.push(format!("Finished: {} ({})", end, self.duration)),
            None => lines.push("Finished: ongoing".to_string()),
        }
        lines.push(format!("Valid: {}", if self.validity { "yes" } else { "no" }));
        lines.push(format!("Verified: {}", if self.verified { "yes" } else { "no" }));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct SupervisionListOutput {
    pub supervisions: Vec<SupervisionOutput>,
    pub total: usize,
}

impl CommandOutput for SupervisionListOutput {
    fn to_human(&self) -> String {
        if self.supervisions.is_empty() {
            return "No supervisions found.".to_string();
        }

        let mut lines = vec![format!("Found {} supervision(s):\n", self.total)];
        lines.push(format!(
            "{:<36} {:<25} {:<8} {:<6} {:<8}",
            "ID", "STARTED", "LENGTH", "VALID", "VERIFIED"
        ));
        lines.push("-".repeat(88));

        for supervision in &self.supervisions {
            lines.push(format!(
                "{:<36} {:<25} {:<8} {:<6} {:<8}",
                supervision.id,
                supervision.start_date,
                supervision.duration,
                if supervision.validity { "yes" } else { "no" },
                if supervision.verified { "yes" } else { "no" },
            ));
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CleanupOutput {
    pub deleted: u64,
}

impl CommandOutput for CleanupOutput {
    fn to_human(&self) -> String {
        format!("Deleted {} unverified supervision(s).", self.deleted)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SupervisionArgs, json: bool) -> Result<()> {
    let ctx = ServiceContext::init().await?;

    match args.command {
        SupervisionCommands::Start {
            worker,
            organization,
            supervisor,
        } => {
            let supervision = ctx.supervisions.create(worker, organization, supervisor).await?;
            output(&SupervisionOutput::from(&supervision), json);
        }
        SupervisionCommands::Finish { id } => {
            let supervision = ctx.supervisions.finish(id).await?;
            output(&SupervisionOutput::from(&supervision), json);
        }
        SupervisionCommands::Show { id } => {
            let supervision = ctx.supervisions.get(id).await?;
            output(&SupervisionOutput::from(&supervision), json);
        }
        SupervisionCommands::List {
            start_date,
            end_date,
            supervisor,
            worker,
        } => {
            let supervisions = ctx
                .supervisions
                .list(SupervisionFilter {
                    supervisor_id: supervisor,
                    worker_id: worker,
                    start_date,
                    end_date,
                })
                .await?;
            let outputs: Vec<SupervisionOutput> =
                supervisions.iter().map(SupervisionOutput::from).collect();
            output(
                &SupervisionListOutput {
                    total: outputs.len(),
                    supervisions: outputs,
                },
                json,
            );
        }
        SupervisionCommands::Verify { id } => {
            let supervision = ctx.supervisions.verify(id).await?;
            output(&SupervisionOutput::from(&supervision), json);
        }
        SupervisionCommands::Unverify { id } => {
            let supervision = ctx.supervisions.clear_verification(id).await?;
            output(&SupervisionOutput::from(&supervision), json);
        }
        SupervisionCommands::Cleanup => {
            let deleted = ctx.supervisions.delete_unverified().await?;
            output(&CleanupOutput { deleted }, json);
        }
    }

    Ok(())
}
