//! Persisted ledger of applied migrations.
//!
//! One row per applied Up migration, keyed by `(datetime, name, identifier)`
//! and carrying the checksum of the content that ran. Several scopes may
//! share one table; every lookup filters on the scope identifier.

use crate::error::{LedgerError, LedgerResult};
use crate::state::{AppliedState, LedgerEntry};
use chrono::NaiveDateTime;
use dm_core::migration::format_filename;
use dm_core::{checksum_file, Direction, MigrationConfig, MigrationDescriptor};
use dm_db::{Executor, Row, SqlParam};

/// Text format the ledger reads timestamps back in.
const ROW_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ledger table access through an [`Executor`].
pub struct LedgerStore<'a> {
    executor: &'a dyn Executor,
    database: String,
    table: String,
    storage_policy: Option<String>,
}

impl<'a> LedgerStore<'a> {
    /// Bind the ledger described by `config` to `executor`.
    ///
    /// `config` is expected to have passed [`MigrationConfig::validate`].
    pub fn new(executor: &'a dyn Executor, config: &MigrationConfig) -> Self {
        Self {
            executor,
            database: config.database.clone(),
            table: config.table.clone(),
            storage_policy: config.storage_policy.clone(),
        }
    }

    /// `database.table`
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }

    /// Create the ledger schema and table if absent.
    ///
    /// Safe to call on every run. The storage policy, when configured, is
    /// recorded as a table comment since DuckDB has no storage policies.
    pub async fn ensure_schema(&self) -> LedgerResult<()> {
        let table = self.qualified_table();
        self.executor
            .execute(
                &format!("CREATE SCHEMA IF NOT EXISTS {}", self.database),
                &[],
            )
            .await
            .map_err(|e| LedgerError::query("schema creation", e))?;

        self.executor
            .execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                         \"datetime\" TIMESTAMP NOT NULL,
                         name         VARCHAR   NOT NULL,
                         identifier   VARCHAR   NOT NULL,
                         checksum     VARCHAR   NOT NULL,
                         PRIMARY KEY (\"datetime\", name, identifier)
                     )"
                ),
                &[],
            )
            .await
            .map_err(|e| LedgerError::query("table creation", e))?;

        if let Some(policy) = &self.storage_policy {
            self.executor
                .execute(
                    &format!("COMMENT ON TABLE {table} IS 'storage_policy={policy}'"),
                    &[],
                )
                .await
                .map_err(|e| LedgerError::query("storage policy comment", e))?;
        }

        log::debug!("Ledger table {table} is ready");
        Ok(())
    }

    /// Fetch the ledger row for `migration`'s identity, if any.
    pub async fn lookup(&self, migration: &MigrationDescriptor) -> LedgerResult<Option<LedgerEntry>> {
        let rows = self
            .executor
            .query(
                &format!(
                    "{} WHERE name = ? AND \"datetime\" = ? AND identifier = ?",
                    self.select_sql()
                ),
                &identity_params(migration),
            )
            .await
            .map_err(|e| LedgerError::query("lookup", e))?;

        rows.first().map(decode_row).transpose()
    }

    /// Three-way applied check. The file checksum is only computed when a
    /// ledger row exists.
    pub async fn check(&self, migration: &MigrationDescriptor) -> LedgerResult<AppliedState> {
        let Some(entry) = self.lookup(migration).await? else {
            return Ok(AppliedState::NotApplied);
        };
        let current = checksum_file(&migration.path)?;
        Ok(AppliedState::compare(&entry.checksum, current))
    }

    /// Whether `migration` is applied; drift is an error, never a `false`.
    pub async fn is_applied(&self, migration: &MigrationDescriptor) -> LedgerResult<bool> {
        match self.check(migration).await? {
            AppliedState::NotApplied => Ok(false),
            AppliedState::AppliedMatching => Ok(true),
            AppliedState::AppliedMismatched { recorded, current } => {
                Err(LedgerError::ChecksumMismatch {
                    migration: migration.filename(),
                    recorded,
                    current,
                })
            }
        }
    }

    /// Insert a ledger row. Call only after the migration's statements ran.
    pub async fn record(&self, entry: &LedgerEntry) -> LedgerResult<()> {
        self.executor
            .execute(
                &format!(
                    "INSERT INTO {} (\"datetime\", name, identifier, checksum) VALUES (?, ?, ?, ?)",
                    self.qualified_table()
                ),
                &[
                    SqlParam::Timestamp(entry.timestamp),
                    SqlParam::from(entry.name.as_str()),
                    SqlParam::from(entry.scope.as_str()),
                    SqlParam::from(entry.checksum.as_str()),
                ],
            )
            .await
            .map_err(|source| LedgerError::LedgerWrite {
                migration: format_filename(entry.timestamp, &entry.name, Direction::Up),
                source,
            })?;
        Ok(())
    }

    /// Delete the ledger row for `migration`.
    ///
    /// Fails with [`LedgerError::NotApplied`] when no row exists.
    pub async fn remove(&self, migration: &MigrationDescriptor) -> LedgerResult<()> {
        if self.lookup(migration).await?.is_none() {
            return Err(LedgerError::NotApplied {
                migration: migration.filename(),
            });
        }

        self.executor
            .execute(
                &format!(
                    "DELETE FROM {} WHERE name = ? AND \"datetime\" = ? AND identifier = ?",
                    self.qualified_table()
                ),
                &identity_params(migration),
            )
            .await
            .map_err(|source| LedgerError::LedgerWrite {
                migration: migration.filename(),
                source,
            })?;
        Ok(())
    }

    /// All rows for `scope` (`None` is the unscoped stream), oldest first.
    pub async fn entries(&self, scope: Option<&str>) -> LedgerResult<Vec<LedgerEntry>> {
        let rows = self
            .executor
            .query(
                &format!(
                    "{} WHERE identifier = ? ORDER BY \"datetime\", name",
                    self.select_sql()
                ),
                &[SqlParam::from(scope.unwrap_or(""))],
            )
            .await
            .map_err(|e| LedgerError::query("listing", e))?;

        rows.iter().map(decode_row).collect()
    }

    fn select_sql(&self) -> String {
        format!(
            "SELECT strftime(\"datetime\", '{ROW_TIMESTAMP_FORMAT}') AS applied_datetime, name, identifier, checksum FROM {}",
            self.qualified_table()
        )
    }
}

fn identity_params(migration: &MigrationDescriptor) -> [SqlParam; 3] {
    [
        SqlParam::from(migration.name.as_str()),
        SqlParam::Timestamp(migration.timestamp),
        SqlParam::from(migration.scope_str()),
    ]
}

fn decode_row(row: &Row) -> LedgerResult<LedgerEntry> {
    let column = |idx: usize, label: &str| {
        row.get(idx)
            .map(str::to_string)
            .ok_or_else(|| LedgerError::MalformedRow(format!("missing {label}")))
    };

    let raw_timestamp = column(0, "datetime")?;
    let timestamp = NaiveDateTime::parse_from_str(&raw_timestamp, ROW_TIMESTAMP_FORMAT)
        .map_err(|e| LedgerError::MalformedRow(format!("datetime '{raw_timestamp}': {e}")))?;

    Ok(LedgerEntry {
        timestamp,
        name: column(1, "name")?,
        scope: column(2, "identifier")?,
        checksum: column(3, "checksum")?,
    })
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
