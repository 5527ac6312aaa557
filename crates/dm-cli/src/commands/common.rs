//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use dm_core::{Catalog, MigrationConfig};
use dm_db::{DuckDbBackend, Executor};
use std::path::{Path, PathBuf};

use crate::cli::{GlobalArgs, MigrationSettings};

/// Resolve the effective migration config: config file (explicit `--config`,
/// else `./duckmig.yml` when present, else defaults), then flag and env
/// overrides, then validation.
pub(crate) fn resolve_config(
    global: &GlobalArgs,
    settings: &MigrationSettings,
) -> Result<MigrationConfig> {
    let mut config = match &global.config {
        Some(path) => MigrationConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => MigrationConfig::load_from_dir(Path::new("."))
            .context("Failed to load duckmig config")?
            .unwrap_or_default(),
    };

    if let Some(directory) = &settings.migrations_directory {
        config.directory = PathBuf::from(directory);
    }
    if let Some(database) = &settings.migrations_database {
        config.database = database.clone();
    }
    if let Some(table) = &settings.migrations_table {
        config.table = table.clone();
    }
    if let Some(identifier) = &settings.identifier {
        config.identifier = Some(identifier.clone());
    }
    if let Some(policy) = &settings.storage_policy {
        config.storage_policy = Some(policy.clone());
    }

    config.validate().context("Invalid migration settings")?;
    log::debug!(
        "Using migrations in {} with ledger {}",
        config.directory.display(),
        config.qualified_table()
    );
    Ok(config)
}

/// Load the catalog for the configured directory and scope.
pub(crate) fn load_catalog(config: &MigrationConfig) -> Result<Catalog> {
    Catalog::load(&config.directory, config.scope()).with_context(|| {
        format!(
            "Failed to load migrations from {}",
            config.directory.display()
        )
    })
}

/// Open the DuckDB database named by `--database-path`.
pub(crate) fn open_database(global: &GlobalArgs) -> Result<DuckDbBackend> {
    DuckDbBackend::new(&global.database_path)
        .with_context(|| format!("Failed to open database {}", global.database_path))
}

/// Close the connection, logging rather than failing so the command's own
/// outcome is the one reported.
pub(crate) async fn close_database(db: &DuckDbBackend) {
    if let Err(e) = db.close().await {
        log::warn!("Failed to close database: {}", e);
    }
}
