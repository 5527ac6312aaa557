//! Ledger rows and the per-migration states the runner moves through.

use chrono::NaiveDateTime;
use dm_core::MigrationDescriptor;
use std::fmt;

/// Persisted record of one successfully applied Up migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub timestamp: NaiveDateTime,
    pub name: String,
    /// Scope identifier, `""` when unscoped
    pub scope: String,
    /// Hex SHA-256 of the file content at apply time
    pub checksum: String,
}

impl LedgerEntry {
    /// Entry recording `migration` with the checksum of the content that ran.
    pub fn for_migration(migration: &MigrationDescriptor, checksum: impl Into<String>) -> Self {
        Self {
            timestamp: migration.timestamp,
            name: migration.name.clone(),
            scope: migration.scope_str().to_string(),
            checksum: checksum.into(),
        }
    }
}

/// Outcome of looking a migration up in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedState {
    /// No ledger row for this identity
    NotApplied,
    /// A row exists and its checksum matches the current file
    AppliedMatching,
    /// A row exists but the file changed since it was applied
    AppliedMismatched { recorded: String, current: String },
}

impl AppliedState {
    /// Compare a recorded checksum with the one computed from the current file.
    pub fn compare(recorded: &str, current: String) -> Self {
        if current == recorded {
            AppliedState::AppliedMatching
        } else {
            AppliedState::AppliedMismatched {
                recorded: recorded.to_string(),
                current,
            }
        }
    }

    pub fn is_applied(&self) -> bool {
        !matches!(self, AppliedState::NotApplied)
    }
}

impl fmt::Display for AppliedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppliedState::NotApplied => f.write_str("pending"),
            AppliedState::AppliedMatching => f.write_str("applied"),
            AppliedState::AppliedMismatched { .. } => f.write_str("drifted"),
        }
    }
}

/// Position of one candidate in the apply state machine.
///
/// `Pending -> Checked -> {Skipped | Applying -> Applied | Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    Pending,
    Checked,
    Skipped,
    Applying,
    Applied,
    Failed,
}

impl CandidateState {
    /// Whether `self -> next` is an edge of the state machine.
    pub fn can_transition_to(self, next: CandidateState) -> bool {
        use CandidateState::*;
        matches!(
            (self, next),
            (Pending, Checked)
                | (Pending, Failed)
                | (Checked, Skipped)
                | (Checked, Applying)
                | (Checked, Failed)
                | (Applying, Applied)
                | (Applying, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CandidateState::Skipped | CandidateState::Applied | CandidateState::Failed
        )
    }
}
