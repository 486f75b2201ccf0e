//! Model registry
//!
//! All six pretrained artifacts are loaded exactly once at process start
//! and are immutable for the process lifetime. Any load or contract
//! problem is fatal to startup, never deferred to request time: an
//! artifact whose declared feature columns disagree with the code's view
//! schema is a version mismatch between code and model.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::adapters::{
    AnomalyAdapter, ExpenseAdapter, FinancialHealthAdapter, OverspendingAdapter,
    RecommendationAdapter, SavingsTargetAdapter,
};
use crate::artifacts::{ArtifactFile, ModelArtifact};
use crate::error::PredictionError;
use crate::views::{
    AnomalyFeatures, ExpenseFeatures, HealthScoreFeatures, OverspendingFeatures,
    RecommendationFeatures, SavingsTargetFeatures,
};
use crate::Result;

const EXPENSE_FILE: &str = "expense_prediction.json";
const OVERSPENDING_FILE: &str = "overspending_alert.json";
const ANOMALY_FILE: &str = "anomaly_detection.json";
const SAVINGS_TARGET_FILE: &str = "savings_target.json";
const HEALTH_FILE: &str = "financial_health.json";
const RECOMMENDER_FILE: &str = "personalized_recommender.json";

/// Constructed-once holder for the six adapters. Passed into the
/// orchestrator by reference, never mutated after construction.
#[derive(Debug)]
pub struct ModelRegistry {
    pub expense: ExpenseAdapter,
    pub overspending: OverspendingAdapter,
    pub anomaly: AnomalyAdapter,
    pub savings_target: SavingsTargetAdapter,
    pub health: FinancialHealthAdapter,
    pub recommendation: RecommendationAdapter,
}

impl ModelRegistry {
    pub fn new(
        expense: ExpenseAdapter,
        overspending: OverspendingAdapter,
        anomaly: AnomalyAdapter,
        savings_target: SavingsTargetAdapter,
        health: FinancialHealthAdapter,
        recommendation: RecommendationAdapter,
    ) -> Self {
        Self {
            expense,
            overspending,
            anomaly,
            savings_target,
            health,
            recommendation,
        }
    }

    /// Load all six artifacts from `dir`, validating each against the
    /// contract its adapter expects.
    pub fn load(dir: &Path) -> Result<Self> {
        let expense = match load_artifact(dir, EXPENSE_FILE, ExpenseFeatures::FEATURE_NAMES)?.model
        {
            ModelArtifact::Forest(model) => ExpenseAdapter::new(model),
            other => return Err(kind_mismatch(EXPENSE_FILE, "forest", &other)),
        };

        let overspending =
            match load_artifact(dir, OVERSPENDING_FILE, OverspendingFeatures::FEATURE_NAMES)?.model
            {
                ModelArtifact::Boosted(model) => OverspendingAdapter::new(model),
                other => return Err(kind_mismatch(OVERSPENDING_FILE, "boosted", &other)),
            };

        let anomaly = match load_artifact(dir, ANOMALY_FILE, AnomalyFeatures::FEATURE_NAMES)?.model
        {
            ModelArtifact::IsolationForest(model) => AnomalyAdapter::new(model),
            other => return Err(kind_mismatch(ANOMALY_FILE, "isolation_forest", &other)),
        };

        let savings_target =
            match load_artifact(dir, SAVINGS_TARGET_FILE, SavingsTargetFeatures::FEATURE_NAMES)?
                .model
            {
                ModelArtifact::Tree(model) => SavingsTargetAdapter::new(model),
                other => return Err(kind_mismatch(SAVINGS_TARGET_FILE, "tree", &other)),
            };

        let health = match load_artifact(dir, HEALTH_FILE, HealthScoreFeatures::FEATURE_NAMES)?
            .model
        {
            ModelArtifact::Boosted(model) => FinancialHealthAdapter::new(model),
            other => return Err(kind_mismatch(HEALTH_FILE, "boosted", &other)),
        };

        let recommendation =
            match load_artifact(dir, RECOMMENDER_FILE, RecommendationFeatures::FEATURE_NAMES)?.model
            {
                ModelArtifact::Linear(model) => RecommendationAdapter::new(model),
                other => return Err(kind_mismatch(RECOMMENDER_FILE, "linear", &other)),
            };

        info!(models_dir = %dir.display(), "model registry loaded");

        Ok(Self::new(
            expense,
            overspending,
            anomaly,
            savings_target,
            health,
            recommendation,
        ))
    }
}

fn load_artifact(dir: &Path, file: &str, expected_features: &[&str]) -> Result<ArtifactFile> {
    let path = dir.join(file);

    let contents = fs::read_to_string(&path).map_err(|e| {
        PredictionError::Startup(format!("failed to read {}: {e}", path.display()))
    })?;

    let artifact: ArtifactFile = serde_json::from_str(&contents).map_err(|e| {
        PredictionError::Startup(format!("failed to parse {}: {e}", path.display()))
    })?;

    if artifact.feature_names != expected_features {
        return Err(PredictionError::Startup(format!(
            "{}: feature schema mismatch, artifact trained on {:?}, code expects {:?}",
            path.display(),
            artifact.feature_names,
            expected_features
        )));
    }

    info!(
        artifact = %artifact.name,
        features = artifact.feature_names.len(),
        trained_at = ?artifact.trained_at,
        "artifact loaded"
    );

    Ok(artifact)
}

fn kind_mismatch(file: &str, expected: &str, got: &ModelArtifact) -> PredictionError {
    PredictionError::Startup(format!(
        "{file}: expected a {expected} model, artifact holds {}",
        got.kind_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn shipped_models_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models")
    }

    #[test]
    fn test_shipped_artifacts_load() {
        let registry = ModelRegistry::load(&shipped_models_dir());
        assert!(registry.is_ok(), "default models must load: {:?}", registry.err());
    }

    #[test]
    fn test_missing_directory_is_a_startup_error() {
        let err = ModelRegistry::load(Path::new("/nonexistent/models")).unwrap_err();
        assert!(matches!(err, PredictionError::Startup(_)));
    }

    #[test]
    fn test_schema_mismatch_is_a_startup_error() {
        // Loading the expense artifact against a different schema must fail.
        let err =
            load_artifact(&shipped_models_dir(), EXPENSE_FILE, &["Income", "Rent"]).unwrap_err();
        match err {
            PredictionError::Startup(msg) => assert!(msg.contains("feature schema mismatch")),
            other => panic!("expected StartupError, got {other:?}"),
        }
    }
}
