//! Init CLI command: opens the configured database and applies migrations.

use anyhow::{Context as _, Result};
use clap::Args;

use crate::adapters::sqlite::{init_database, Migrator};
use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct InitArgs {}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub database: String,
    pub schema_version: i64,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        format!(
            "Database ready at {} (schema version {}).",
            self.database, self.schema_version
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(_args: InitArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    let pool = init_database(&config.database).await?;

    let version = Migrator::new(pool)
        .get_current_version()
        .await
        .context("failed to read schema version")?;

    output(
        &InitOutput {
            database: config.database.path,
            schema_version: version,
        },
        json,
    );
    Ok(())
}
