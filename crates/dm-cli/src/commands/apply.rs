//! Apply command implementation

use anyhow::{Context, Result};
use dm_ledger::Runner;

use crate::cli::{GlobalArgs, MigrationSettings};
use crate::commands::common::{close_database, load_catalog, open_database, resolve_config};

/// Execute the apply command
pub async fn execute(settings: &MigrationSettings, global: &GlobalArgs) -> Result<()> {
    let config = resolve_config(global, settings)?;
    let catalog = load_catalog(&config)?;
    let db = open_database(global)?;

    let outcome = Runner::new(&db, &config).apply(&catalog).await;
    close_database(&db).await;
    let report = outcome.context("Migration apply failed")?;

    for migration in &report.skipped {
        println!("Migration {} is already applied", migration.path.display());
    }
    for migration in &report.applied {
        println!("Applied migration {}", migration.path.display());
    }

    println!();
    println!(
        "Applied {} migration{} ({} statement{}), {} already applied",
        report.applied.len(),
        if report.applied.len() == 1 { "" } else { "s" },
        report.statements_executed,
        if report.statements_executed == 1 { "" } else { "s" },
        report.skipped.len()
    );
    Ok(())
}
