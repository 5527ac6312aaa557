//! Error types for the migration ledger and runner.

use dm_core::CoreError;
use dm_db::DbError;
use thiserror::Error;

/// Ledger and runner errors.
///
/// Every variant is fatal to the run that produced it; nothing is retried.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Catalog, checksum, or file read failure from dm-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An applied migration's file changed since it was recorded (L001).
    #[error("[L001] Checksum mismatch for applied migration {migration}: recorded {recorded}, current {current}")]
    ChecksumMismatch {
        migration: String,
        recorded: String,
        current: String,
    },

    /// A migration statement failed; later statements and migrations were not run (L002).
    #[error("[L002] Migration {migration} failed on statement `{statement}`: {source}")]
    StatementExecution {
        migration: String,
        statement: String,
        #[source]
        source: DbError,
    },

    /// Ledger insert or delete failed after the migration's statements ran (L003).
    #[error("[L003] Failed to update ledger for {migration}: {source}")]
    LedgerWrite {
        migration: String,
        #[source]
        source: DbError,
    },

    /// Ledger bootstrap or lookup failed (L004).
    #[error("[L004] Ledger {action} failed: {source}")]
    LedgerQuery {
        action: String,
        #[source]
        source: DbError,
    },

    /// A ledger row could not be decoded (L005).
    #[error("[L005] Unreadable ledger row: {0}")]
    MalformedRow(String),

    /// Removal or rollback targeted a migration with no ledger row (L006).
    #[error("[L006] Migration {migration} is not applied")]
    NotApplied { migration: String },

    /// No Up migration with this name exists in the catalog (L007).
    #[error("[L007] No up migration named '{name}'")]
    UnknownMigration { name: String },

    /// The Up migration has no paired Down file (L008).
    #[error("[L008] No down migration paired with '{name}'")]
    MissingDownMigration { name: String },
}

impl LedgerError {
    pub(crate) fn query(action: impl Into<String>, source: DbError) -> Self {
        LedgerError::LedgerQuery {
            action: action.into(),
            source,
        }
    }
}

/// Result type alias for [`LedgerError`].
pub type LedgerResult<T> = Result<T, LedgerError>;
