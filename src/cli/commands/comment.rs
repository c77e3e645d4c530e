//! Comment CLI commands.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::context::ServiceContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Comment;

#[derive(Args, Debug)]
pub struct CommentArgs {
    #[command(subcommand)]
    pub command: CommentCommands,
}

#[derive(Subcommand, Debug)]
pub enum CommentCommands {
    /// Attach a comment to an activity record
    Add {
        /// Activity record ID
        record: Uuid,
        /// Acting user
        #[arg(long)]
        actor: Uuid,
        /// Comment text
        #[arg(short, long)]
        text: Option<String>,
        /// Latitude of the geo tag
        #[arg(long, requires = "longitude")]
        latitude: Option<f64>,
        /// Longitude of the geo tag
        #[arg(long, requires = "latitude")]
        longitude: Option<f64>,
        /// Attached file paths
        #[arg(short, long)]
        file: Vec<String>,
    },
    /// List comments of an activity record
    List {
        /// Activity record ID
        record: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct CommentOutput {
    pub id: String,
    pub text: Option<String>,
    pub map_url: Option<String>,
    pub created_at: String,
}

impl From<&Comment> for CommentOutput {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            text: comment.text.clone(),
            map_url: comment.map_url(),
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

impl CommandOutput for CommentOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Comment {}", self.id)];
        if let Some(text) = &self.text {
            lines.push(text.clone());
        }
        if let Some(url) = &self.map_url {
            lines.push(format!("Location: {url}"));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CommentListOutput {
    pub comments: Vec<CommentOutput>,
    pub total: usize,
}

impl CommandOutput for CommentListOutput {
    fn to_human(&self) -> String {
        if self.comments.is_empty() {
            return "No comments.".to_string();
        }
        self.comments
            .iter()
            .map(|c| format!("[{}] {}", c.created_at, c.text.as_deref().unwrap_or("<files>")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: CommentArgs, json: bool) -> Result<()> {
    let ctx = ServiceContext::init().await?;

    match args.command {
        CommentCommands::Add {
            record,
            actor,
            text,
            latitude,
            longitude,
            file,
        } => {
            let coordinates = match (latitude, longitude) {
                (Some(lat), Some(lon)) => Some((lat, lon)),
                (None, None) => None,
                _ => bail!("latitude and longitude must be given together"),
            };
            let comment = ctx
                .comments
                .create(record, actor, text, coordinates, file)
                .await?;
            output(&CommentOutput::from(&comment), json);
        }
        CommentCommands::List { record } => {
            let comments = ctx.comments.list_for_statistics(record).await?;
            let outputs: Vec<CommentOutput> = comments.iter().map(CommentOutput::from).collect();
            output(
                &CommentListOutput {
                    total: outputs.len(),
                    comments: outputs,
                },
                json,
            );
        }
    }

    Ok(())
}
