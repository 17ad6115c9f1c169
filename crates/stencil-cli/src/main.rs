//! Stencil CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use stencil_cli::{Args, error_adapter::render};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Stencil");
    debug!(args:?; "Parsed arguments");

    match stencil_cli::run(&args) {
        Ok(summary) if summary.is_success() => info!("Completed successfully"),
        Ok(summary) => {
            for (path, err) in summary.failed() {
                error!("{}\n{}", path.display(), render(err));
            }
            error!(failed = summary.failed().len(); "Some drawings could not be processed");
            process::exit(1);
        }
        Err(err) => {
            error!("{}", render(&err));
            process::exit(1);
        }
    }
}
