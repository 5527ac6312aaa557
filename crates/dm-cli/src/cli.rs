//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// duckmig - timestamped SQL migrations for DuckDB
#[derive(Parser, Debug)]
#[command(name = "dm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override config file path (default: ./duckmig.yml if present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// DuckDB database file, or ":memory:"
    #[arg(
        short = 'd',
        long,
        global = true,
        env = "DUCKMIG_DATABASE_PATH",
        default_value = "duckmig.duckdb"
    )]
    pub database_path: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, apply, inspect and roll back migrations
    Migrations(MigrationsArgs),
}

/// Arguments for the migrations command group
#[derive(Args, Debug)]
pub struct MigrationsArgs {
    #[command(flatten)]
    pub settings: MigrationSettings,

    #[command(subcommand)]
    pub command: MigrationsCommand,
}

/// Per-run overrides for the migration config file.
///
/// Every flag is optional; unset flags fall back to the config file, then to
/// built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct MigrationSettings {
    /// Directory holding the migration files
    #[arg(long, global = true, env = "DUCKMIG_MIGRATIONS_DIRECTORY")]
    pub migrations_directory: Option<String>,

    /// Database (schema) holding the ledger table
    #[arg(long, global = true, env = "DUCKMIG_MIGRATIONS_DATABASE")]
    pub migrations_database: Option<String>,

    /// Ledger table name
    #[arg(long, global = true, env = "DUCKMIG_MIGRATIONS_TABLE")]
    pub migrations_table: Option<String>,

    /// Scope identifier partitioning a shared ledger table
    #[arg(long, global = true, env = "DUCKMIG_IDENTIFIER")]
    pub identifier: Option<String>,

    /// Storage policy recorded on the ledger table
    #[arg(long, global = true, env = "DUCKMIG_STORAGE_POLICY")]
    pub storage_policy: Option<String>,
}

/// Migration subcommands
#[derive(Subcommand, Debug)]
pub enum MigrationsCommand {
    /// Create an empty up/down migration pair
    Create(CreateArgs),

    /// Apply every pending up migration in timestamp order
    Apply,

    /// Show the ledger state of every up migration
    Status(StatusArgs),

    /// Run the down migration for one applied migration
    Rollback(RollbackArgs),
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Migration name (no '.' or path separators)
    pub name: String,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the rollback command
#[derive(Args, Debug)]
pub struct RollbackArgs {
    /// Name of the applied migration to roll back
    pub name: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
