use financial_prediction_orchestrator::{
    config::Config, models::RawFinancialProfile, orchestrator::PredictionOrchestrator,
    registry::ModelRegistry,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    dotenv::dotenv().ok();

    info!("Financial Prediction Orchestrator starting");

    let config = Config::from_env();
    let registry = Arc::new(ModelRegistry::load(&config.models_dir)?);
    let orchestrator = PredictionOrchestrator::with_budget(registry, config.adapter_budget);

    // Sample monthly profile
    let profile = RawFinancialProfile {
        income: 50000.0,
        rent: 15000.0,
        loan_repayment: 5000.0,
        insurance: 2000.0,
        groceries: 8000.0,
        transport: 3000.0,
        eating_out: 4000.0,
        entertainment: 3000.0,
        utilities: 2000.0,
        healthcare: 2000.0,
        education: 3000.0,
        miscellaneous: 2000.0,
        age: 31,
        dependents: 2,
        occupation: "Salaried".to_string(),
        city_tier: 2,
        desired_savings_percentage: 20.0,
    };

    info!(income = profile.income, "Running unified prediction");

    match orchestrator.run(&profile, 1).await {
        Ok(result) => {
            println!("\n=== UNIFIED PREDICTION RESULT ===");
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Prediction run failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
