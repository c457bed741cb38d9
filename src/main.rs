//! piper entry point
//!
//! Parses the command line, builds the configuration, and runs the pipeline.
//! This is the only place that decides the exit status.

use clap::error::ErrorKind;
use clap::Parser;
use log::{debug, error, info};
use piper_cli::cli::Cli;
use piper_cli::config::{Config, Environment};
use piper_cli::pipeline;
use std::fs::OpenOptions;
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout with status 0; usage errors exit 1
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(1),
            }
        }
    };

    init_logger(&cli);
    info!("piper {} starting", piper_cli::VERSION);

    let config = match Config::from_cli(&cli, &Environment::from_process()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for more information.");
            process::exit(e.exit_code());
        }
    };
    debug!("Configuration: {:?}", config);

    match pipeline::run(&config) {
        Ok(outcome) => {
            // Everything was spoken; a failed drain is reported but not fatal
            if let Some(e) = outcome.finish_error {
                eprintln!("Error: {}", e);
            }
        }
        Err(e) => {
            error!("Fatal error: {}", e);
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

/// Initialize logging on stderr, or on a file with --log-file
///
/// stdout is never used because it may carry audio.
fn init_logger(cli: &Cli) {
    let level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);

    if let Some(path) = &cli.log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(log_file) => {
                builder.target(env_logger::Target::Pipe(Box::new(log_file)));
            }
            Err(e) => {
                eprintln!(
                    "Warning: Failed to open {} for logging: {}",
                    path.display(),
                    e
                );
                eprintln!("Continuing with logging to stderr...");
            }
        }
    }

    builder.init();
}
