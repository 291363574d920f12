//! sqldump - MySQL dump generator
//!
//! Entry point for the CLI application. The dump goes to stdout unless
//! `--output` names a file; logs always go to stderr.

mod args;
mod settings;

use anyhow::{Context, Result};
use args::CliArgs;
use clap::Parser;
use settings::FileConfig;
use sqldump_driver_mysql::MySqlConnection;
use sqldump_engine::{Connection, DumpOptions, dump_to_file, dump_to_writer};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let config = FileConfig::discover(args.config.as_deref())
        .context("Invalid configuration")?
        .with_overrides(&args);

    let mut conn = MySqlConnection::connect(&config.connection)
        .with_context(|| format!("Failed to connect to {}", config.connection.display_url()))?;

    let outcome = write_dump(&mut conn, &config.dump, args.output.as_deref());

    // Close even when the dump failed; the dump error is the one reported.
    if let Err(e) = conn.close() {
        warn!("{}", e);
    }
    outcome
}

fn write_dump(conn: &mut MySqlConnection, options: &DumpOptions, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let written = dump_to_file(conn, options, path).context("Dump failed")?;
            info!(path = %written.display(), "dump saved");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            dump_to_writer(conn, options, &mut handle).context("Dump failed")?;
        }
    }
    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("sqldump=debug,sqldump_engine=debug,sqldump_driver_mysql=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sqldump=info,warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
