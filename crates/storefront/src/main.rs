use anyhow::{Context, Result};
use dotenv::dotenv;
use shared::utils::{Telemetry, init_logger};
use storefront::{config::myconfig::Config, handler::AppRouter, state::AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let mut telemetry = Telemetry::new("storefront", config.otel_endpoint.clone());

    let logger_provider = telemetry.init_logger()?;
    let _meter_provider = telemetry.init_meter()?;
    let _tracer_provider = telemetry.init_tracer()?;

    let _log_guard = init_logger(
        logger_provider,
        "storefront",
        config.dev_mode,
        config.enable_file_log,
    );

    let state = AppState::new(&config)
        .await
        .context("Failed to create AppState")?;

    info!(
        "🚀 Storefront starting with the {:?} store",
        config.store_backend
    );

    AppRouter::serve(config.port, state)
        .await
        .context("Failed to start server")?;

    info!("Shutting down servers...");

    telemetry.shutdown().await?;

    Ok(())
}
