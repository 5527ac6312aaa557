//! Migration runner.
//!
//! Walks the catalog's Up migrations in timestamp order, one at a time:
//! check the ledger, skip what is applied, otherwise execute the file's
//! statements and record it. The first error ends the run.
//!
//! Statement execution and the ledger insert are not wrapped in a
//! transaction. If the process dies between the two, the migration's effects
//! exist without a ledger row and the next run executes it again, so
//! statements must be safe to re-apply.

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::LedgerStore;
use crate::state::{AppliedState, CandidateState, LedgerEntry};
use dm_core::{
    compute_checksum, split_statements, Catalog, CoreError, Direction, MigrationConfig,
    MigrationDescriptor,
};
use dm_db::Executor;
use std::io;

/// What a successful `apply` did.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Migrations executed and recorded by this run, in order
    pub applied: Vec<MigrationDescriptor>,
    /// Migrations already recorded with a matching checksum
    pub skipped: Vec<MigrationDescriptor>,
    /// Statements executed across all applied migrations
    pub statements_executed: usize,
}

/// What a successful `rollback` did.
#[derive(Debug)]
pub struct RollbackReport {
    /// The Up migration whose ledger row was removed
    pub migration: MigrationDescriptor,
    /// The Down file that was executed
    pub down: MigrationDescriptor,
    pub statements_executed: usize,
}

/// Ledger state of one Up migration, as reported by `status`.
#[derive(Debug)]
pub struct StatusEntry {
    pub migration: MigrationDescriptor,
    pub state: AppliedState,
}

/// Sequential migration runner over one executor and one ledger.
pub struct Runner<'a> {
    executor: &'a dyn Executor,
    ledger: LedgerStore<'a>,
}

impl<'a> Runner<'a> {
    pub fn new(executor: &'a dyn Executor, config: &MigrationConfig) -> Self {
        Self {
            executor,
            ledger: LedgerStore::new(executor, config),
        }
    }

    /// The ledger this runner records into.
    pub fn ledger(&self) -> &LedgerStore<'a> {
        &self.ledger
    }

    /// Apply every pending Up migration in `catalog`.
    ///
    /// Aborts on the first checksum mismatch, statement failure, or ledger
    /// write failure. Migrations recorded before the failure stay recorded.
    pub async fn apply(&self, catalog: &Catalog) -> LedgerResult<ApplyReport> {
        self.ledger.ensure_schema().await?;

        let mut report = ApplyReport::default();
        for migration in catalog.pending_order() {
            let mut candidate = Candidate::new(migration);

            let state = match self.ledger.check(migration).await {
                Ok(state) => state,
                Err(e) => return Err(candidate.fail(e)),
            };
            candidate.advance(CandidateState::Checked);

            match state {
                AppliedState::AppliedMatching => {
                    candidate.advance(CandidateState::Skipped);
                    log::info!("Migration {} is already applied", migration.path.display());
                    report.skipped.push(migration.clone());
                    continue;
                }
                AppliedState::AppliedMismatched { recorded, current } => {
                    return Err(candidate.fail(LedgerError::ChecksumMismatch {
                        migration: migration.filename(),
                        recorded,
                        current,
                    }));
                }
                AppliedState::NotApplied => {}
            }

            candidate.advance(CandidateState::Applying);
            log::info!("Applying migration {}", migration.path.display());

            let executed = match self.apply_one(migration).await {
                Ok(executed) => executed,
                Err(e) => return Err(candidate.fail(e)),
            };
            candidate.advance(CandidateState::Applied);
            log::debug!(
                "Applied {} ({} statement{})",
                migration,
                executed,
                if executed == 1 { "" } else { "s" }
            );

            report.statements_executed += executed;
            report.applied.push(migration.clone());
        }

        Ok(report)
    }

    /// Execute one migration and record it. The checksum written to the
    /// ledger is taken from the same bytes that were executed.
    async fn apply_one(&self, migration: &MigrationDescriptor) -> LedgerResult<usize> {
        let (content, checksum) = read_migration(migration)?;
        let executed = self.run_statements(migration, &content).await?;
        self.ledger
            .record(&LedgerEntry::for_migration(migration, checksum))
            .await?;
        Ok(executed)
    }

    /// Revert the applied Up migration `name` by running its paired Down file
    /// and removing its ledger row.
    pub async fn rollback(&self, catalog: &Catalog, name: &str) -> LedgerResult<RollbackReport> {
        self.ledger.ensure_schema().await?;

        let migration = catalog
            .find(name, Direction::Up)
            .ok_or_else(|| LedgerError::UnknownMigration {
                name: name.to_string(),
            })?;

        match self.ledger.check(migration).await? {
            AppliedState::NotApplied => {
                return Err(LedgerError::NotApplied {
                    migration: migration.filename(),
                })
            }
            AppliedState::AppliedMismatched { recorded, current } => {
                return Err(LedgerError::ChecksumMismatch {
                    migration: migration.filename(),
                    recorded,
                    current,
                })
            }
            AppliedState::AppliedMatching => {}
        }

        let down = catalog
            .counterpart(migration)
            .ok_or_else(|| LedgerError::MissingDownMigration {
                name: name.to_string(),
            })?;

        log::info!("Rolling back migration {}", down.path.display());
        let (content, _) = read_migration(down)?;
        let executed = self.run_statements(down, &content).await?;
        self.ledger.remove(migration).await?;
        log::info!("Rolled back {migration} using {down}");

        Ok(RollbackReport {
            migration: migration.clone(),
            down: down.clone(),
            statements_executed: executed,
        })
    }

    /// Ledger state of every Up migration in apply order. Executes nothing;
    /// drift is reported, not raised.
    pub async fn status(&self, catalog: &Catalog) -> LedgerResult<Vec<StatusEntry>> {
        self.ledger.ensure_schema().await?;

        let mut entries = Vec::new();
        for migration in catalog.pending_order() {
            let state = self.ledger.check(migration).await?;
            if let AppliedState::AppliedMismatched { .. } = &state {
                log::warn!("Migration {migration} changed since it was applied");
            }
            entries.push(StatusEntry {
                migration: migration.clone(),
                state,
            });
        }
        Ok(entries)
    }

    /// Run each non-empty statement of `content` in order, stopping at the
    /// first failure.
    async fn run_statements(
        &self,
        migration: &MigrationDescriptor,
        content: &str,
    ) -> LedgerResult<usize> {
        let statements = split_statements(content);
        for statement in &statements {
            log::debug!("{migration}: {statement}");
            self.executor
                .execute(statement, &[])
                .await
                .map_err(|source| LedgerError::StatementExecution {
                    migration: migration.filename(),
                    statement: statement.to_string(),
                    source,
                })?;
        }
        Ok(statements.len())
    }
}

/// Read a migration file as UTF-8 text along with its checksum.
fn read_migration(migration: &MigrationDescriptor) -> LedgerResult<(String, String)> {
    let path = &migration.path;
    let bytes = std::fs::read(path).map_err(|source| CoreError::IoWithPath {
        path: path.display().to_string(),
        source,
    })?;
    let checksum = compute_checksum(&bytes);
    let content = String::from_utf8(bytes).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: io::Error::new(io::ErrorKind::InvalidData, e),
    })?;
    Ok((content, checksum))
}

/// Tracks one migration through the apply state machine.
struct Candidate<'m> {
    migration: &'m MigrationDescriptor,
    state: CandidateState,
}

impl<'m> Candidate<'m> {
    fn new(migration: &'m MigrationDescriptor) -> Self {
        Self {
            migration,
            state: CandidateState::Pending,
        }
    }

    fn advance(&mut self, next: CandidateState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        log::debug!("{}: {:?} -> {:?}", self.migration, self.state, next);
        self.state = next;
    }

    fn fail(&mut self, err: LedgerError) -> LedgerError {
        self.advance(CandidateState::Failed);
        err
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
