use financial_prediction_orchestrator::{
    api::start_server, config::Config, orchestrator::PredictionOrchestrator,
    registry::ModelRegistry,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::from_env();

    info!("Financial Prediction Orchestrator - API Server");
    info!("Port: {}", config.port);
    info!("Models: {}", config.models_dir.display());

    // A model that fails to load aborts startup; it is never deferred
    // to request time.
    let registry = Arc::new(ModelRegistry::load(&config.models_dir)?);
    let orchestrator = Arc::new(PredictionOrchestrator::with_budget(
        registry,
        config.adapter_budget,
    ));

    info!("Registry initialized, starting API server");

    start_server(orchestrator, config.port).await?;

    Ok(())
}
