//! Console entry point for the bookshelf library.
//!
//! Reads configuration from `BOOKSHELF_*` environment variables, then runs
//! the interactive menu on stdin/stdout.

mod console;

use bookshelf_core::{init_logging, AppConfig, LibraryService};
use console::Console;
use log::error;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("logging disabled: {err}");
    }

    let service = match LibraryService::open(&config) {
        Ok(service) => Arc::new(service),
        Err(err) => {
            error!("event=cli_start module=cli status=error error={err}");
            eprintln!("cannot open library {}: {err}", config.data_file.display());
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let mut console = Console::new(service.clone(), stdin.lock(), io::stdout());
    if let Err(err) = console.run().await {
        error!("event=cli_run module=cli status=error error={err}");
        return ExitCode::FAILURE;
    }
    match service.flush().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("failed to save library: {err}");
            ExitCode::FAILURE
        }
    }
}
