//! Status command implementation

use anyhow::{Context, Result};
use dm_core::migration::TIMESTAMP_FORMAT;
use dm_ledger::{AppliedState, Runner, StatusEntry};
use serde::Serialize;

use crate::cli::{GlobalArgs, MigrationSettings, StatusArgs};
use crate::commands::common::{close_database, load_catalog, open_database, resolve_config};

/// One row of `status --json` output.
#[derive(Debug, Serialize)]
struct StatusRow {
    name: String,
    timestamp: String,
    file: String,
    state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    recorded_checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_checksum: Option<String>,
}

impl From<&StatusEntry> for StatusRow {
    fn from(entry: &StatusEntry) -> Self {
        let (recorded_checksum, current_checksum) = match &entry.state {
            AppliedState::AppliedMismatched { recorded, current } => {
                (Some(recorded.clone()), Some(current.clone()))
            }
            _ => (None, None),
        };
        Self {
            name: entry.migration.name.clone(),
            timestamp: entry
                .migration
                .timestamp
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            file: entry.migration.filename(),
            state: entry.state.to_string(),
            recorded_checksum,
            current_checksum,
        }
    }
}

/// Execute the status command
pub async fn execute(
    args: &StatusArgs,
    settings: &MigrationSettings,
    global: &GlobalArgs,
) -> Result<()> {
    let config = resolve_config(global, settings)?;
    let catalog = load_catalog(&config)?;
    let db = open_database(global)?;

    let outcome = Runner::new(&db, &config).status(&catalog).await;
    close_database(&db).await;
    let entries = outcome.context("Failed to read migration status")?;

    let rows: Vec<StatusRow> = entries.iter().map(StatusRow::from).collect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No migrations found in {}", config.directory.display());
        return Ok(());
    }

    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);
    println!("{:<8}  {:<19}  {:<width$}", "STATE", "TIMESTAMP", "NAME");
    for row in &rows {
        println!("{:<8}  {:<19}  {:<width$}", row.state, row.timestamp, row.name);
    }

    let pending = entries
        .iter()
        .filter(|e| e.state == AppliedState::NotApplied)
        .count();
    println!();
    println!("{} migration(s), {} pending", rows.len(), pending);
    Ok(())
}
