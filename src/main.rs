use omnidesk::bootstrap;
use omnidesk::config::Config;
use omnidesk::infrastructure::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    let _guard = observability::init(&config)?;
    tracing::info!("Configuration loaded");

    let state = bootstrap::build_app_state(&config).await?;

    state.orchestrator.start().await?;
    bootstrap::apply_initial_settings(&state, &config);
    tracing::info!("{} running", config.service_name);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    state.orchestrator.shutdown().await;
    Ok(())
}
