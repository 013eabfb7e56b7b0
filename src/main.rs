use std::process::ExitCode;

use pr_reviewer_lib::config::Config;
use pr_reviewer_lib::services::server::start_server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Also captures `log` records from the library.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = match pr_reviewer_lib::build_state(&config).await {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to initialize storage: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let handle = match start_server(config.listen_addr(), state).await {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("Failed to bind {}: {}", config.listen_addr(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }

    handle.shutdown().await;
    ExitCode::SUCCESS
}
