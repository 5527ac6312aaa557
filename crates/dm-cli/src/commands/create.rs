//! Create command implementation

use anyhow::{Context, Result};
use chrono::Utc;
use dm_core::create_migration;

use crate::cli::{CreateArgs, GlobalArgs, MigrationSettings};
use crate::commands::common::resolve_config;

/// Execute the create command
pub async fn execute(
    args: &CreateArgs,
    settings: &MigrationSettings,
    global: &GlobalArgs,
) -> Result<()> {
    let config = resolve_config(global, settings)?;

    let (up, down) = create_migration(&config.directory, &args.name, Utc::now().naive_utc())
        .with_context(|| format!("Failed to create migration '{}'", args.name))?;

    println!("Created {}", up.path.display());
    println!("Created {}", down.path.display());
    Ok(())
}
