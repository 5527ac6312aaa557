//! Migration ledger and runner for duckmig.
//!
//! The ledger records which Up migrations have run, keyed by
//! `(datetime, name, identifier)` and guarded by a content checksum. The
//! runner applies pending migrations in timestamp order, at most once each,
//! and stops at the first failure.

pub mod error;
pub mod ledger;
pub mod runner;
pub mod state;

pub use error::{LedgerError, LedgerResult};
pub use ledger::LedgerStore;
pub use runner::{ApplyReport, RollbackReport, Runner, StatusEntry};
pub use state::{AppliedState, CandidateState, LedgerEntry};
