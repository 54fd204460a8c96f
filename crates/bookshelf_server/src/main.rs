//! Server entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the library once.
//! - Serve until Ctrl-C, then flush the library to disk.

use bookshelf_core::{init_logging, LibraryService};
use bookshelf_server::{build_router, AppState, ServerConfig};
use log::{error, info};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("bookshelf_server: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.app.log_level, &config.app.log_dir) {
        eprintln!("bookshelf_server: logging unavailable: {err}");
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            eprintln!("bookshelf_server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn Error>> {
    // Corrupt storage is fatal here; the server never starts on a partial load.
    let service = Arc::new(LibraryService::open(&config.app)?);
    let app = build_router(AppState::new(Arc::clone(&service)));

    let listener = TcpListener::bind(config.bind).await?;
    info!(
        "event=server_start module=server status=ok bind={} data_file={}",
        listener.local_addr()?,
        config.app.data_file.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.flush().await?;
    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
    info!("event=shutdown_signal module=server status=ok");
}
