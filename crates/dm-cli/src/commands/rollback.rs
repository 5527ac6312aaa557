//! Rollback command implementation

use anyhow::{Context, Result};
use dm_ledger::Runner;

use crate::cli::{GlobalArgs, MigrationSettings, RollbackArgs};
use crate::commands::common::{close_database, load_catalog, open_database, resolve_config};

/// Execute the rollback command
pub async fn execute(
    args: &RollbackArgs,
    settings: &MigrationSettings,
    global: &GlobalArgs,
) -> Result<()> {
    let config = resolve_config(global, settings)?;
    let catalog = load_catalog(&config)?;
    let db = open_database(global)?;

    let outcome = Runner::new(&db, &config).rollback(&catalog, &args.name).await;
    close_database(&db).await;
    let report = outcome.with_context(|| format!("Failed to roll back '{}'", args.name))?;

    println!(
        "Rolled back {} using {} ({} statement{})",
        report.migration,
        report.down.path.display(),
        report.statements_executed,
        if report.statements_executed == 1 { "" } else { "s" }
    );
    Ok(())
}
