//! REST API for the prediction orchestrator
//!
//! Thin (de)serialization layer over `PredictionOrchestrator::run`; all
//! logic lives below this surface.

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::PredictionError;
use crate::models::RawFinancialProfile;
use crate::orchestrator::PredictionOrchestrator;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    #[serde(flatten)]
    pub profile: RawFinancialProfile,
    /// Assigned by the external segmentation step; defaults to 1 when
    /// the caller has no assignment yet.
    #[serde(rename = "Cluster_Label", default = "default_cluster_label")]
    pub cluster_label: u32,
}

fn default_cluster_label() -> u32 {
    1
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<PredictionOrchestrator>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Unified Prediction Endpoint
/// =============================

async fn unified_prediction(
    State(state): State<ApiState>,
    Json(req): Json<PredictionRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    info!(cluster_label = req.cluster_label, "received prediction request");

    match state.orchestrator.run(&req.profile, req.cluster_label).await {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(body) => (StatusCode::OK, Json(body)),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": format!("serialization failed: {e}") })),
            ),
        },
        Err(e @ (PredictionError::Input(_) | PredictionError::Schema { .. })) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(orchestrator: Arc<PredictionOrchestrator>) -> Router {
    let state = ApiState { orchestrator };

    Router::new()
        .route("/health", get(health))
        .route("/api/predict", post(unified_prediction))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    orchestrator: Arc<PredictionOrchestrator>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_cluster_label_to_one() {
        let json = serde_json::json!({
            "Income": 50000.0,
            "Rent": 15000.0,
            "Loan_Repayment": 5000.0,
            "Insurance": 2000.0,
            "Groceries": 8000.0,
            "Transport": 3000.0,
            "Eating_Out": 4000.0,
            "Entertainment": 3000.0,
            "Utilities": 2000.0,
            "Healthcare": 2000.0,
            "Education": 3000.0,
            "Miscellaneous": 2000.0,
            "Age": 31,
            "Dependents": 2,
            "Occupation": "Salaried",
            "City_Tier": 2,
            "Desired_Savings_Percentage": 20.0
        });

        let request: PredictionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.cluster_label, 1);
        assert_eq!(request.profile.income, 50000.0);
    }

    #[test]
    fn test_request_accepts_explicit_cluster_label() {
        let mut json = serde_json::json!({
            "Income": 1.0, "Rent": 0.0, "Loan_Repayment": 0.0, "Insurance": 0.0,
            "Groceries": 0.0, "Transport": 0.0, "Eating_Out": 0.0, "Entertainment": 0.0,
            "Utilities": 0.0, "Healthcare": 0.0, "Education": 0.0, "Miscellaneous": 0.0,
            "Age": 20, "Dependents": 0, "Occupation": "Student", "City_Tier": 1,
            "Desired_Savings_Percentage": 10.0
        });
        json["Cluster_Label"] = serde_json::json!(2);

        let request: PredictionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.cluster_label, 2);
    }
}
