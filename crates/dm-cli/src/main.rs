//! duckmig CLI - timestamped SQL migrations for DuckDB

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands, MigrationsCommand};
use commands::{apply, create, rollback, status};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        Commands::Migrations(args) => match &args.command {
            MigrationsCommand::Create(create_args) => {
                create::execute(create_args, &args.settings, &cli.global).await
            }
            MigrationsCommand::Apply => apply::execute(&args.settings, &cli.global).await,
            MigrationsCommand::Status(status_args) => {
                status::execute(status_args, &args.settings, &cli.global).await
            }
            MigrationsCommand::Rollback(rollback_args) => {
                rollback::execute(rollback_args, &args.settings, &cli.global).await
            }
        },
    }
}

/// Log to stderr at `info` (`debug` with `--verbose`); `RUST_LOG` wins.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
