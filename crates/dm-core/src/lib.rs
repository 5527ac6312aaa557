//! dm-core - Core library for duckmig
//!
//! This crate provides migration filename parsing, directory catalog loading,
//! content checksums, statement splitting, and configuration shared by the
//! ledger and CLI crates.

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod create;
pub mod error;
pub mod migration;
pub mod statements;

pub use catalog::Catalog;
pub use checksum::{checksum_file, compute_checksum};
pub use config::MigrationConfig;
pub use create::create_migration;
pub use error::{CoreError, CoreResult};
pub use migration::{Direction, MigrationDescriptor};
pub use statements::split_statements;
