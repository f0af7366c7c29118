//! Readiness check binary

use readiness_check::{Config, EXIT_CONFIG, exit_code, run};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let path = std::env::args_os().nth(1).map(PathBuf::from);

    // Can't use tracing yet - the logging section is part of the config
    let config = match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    if let Err(e) = common::logging::init(&config.logging.level, config.logging.format) {
        eprintln!("{}", e);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling readiness check");
            on_interrupt.cancel();
        }
    });

    match run(&config, cancel).await {
        Ok(outcome) => ExitCode::from(exit_code(&outcome)),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check could not start");
            ExitCode::from(EXIT_CONFIG)
        }
    }
}
