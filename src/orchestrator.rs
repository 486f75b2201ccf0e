//! Prediction orchestrator
//!
//! One run: derive features, build the six views, fan out to the six
//! adapters, gather the aggregate. Derivation and view building are
//! request-fatal; each adapter invocation is independent and a failure
//! there is recorded in place without touching the other five.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::features::FinancialRatioEngine;
use crate::models::{Outcome, RawFinancialProfile, UnifiedPredictionResult};
use crate::registry::ModelRegistry;
use crate::views::FeatureViewBuilder;
use crate::Result;

/// Per-adapter wall-clock budget. An adapter exceeding it is treated
/// like any other adapter failure.
pub const DEFAULT_ADAPTER_BUDGET: Duration = Duration::from_millis(2000);

pub struct PredictionOrchestrator {
    registry: Arc<ModelRegistry>,
    adapter_budget: Duration,
}

impl PredictionOrchestrator {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self::with_budget(registry, DEFAULT_ADAPTER_BUDGET)
    }

    pub fn with_budget(registry: Arc<ModelRegistry>, adapter_budget: Duration) -> Self {
        Self {
            registry,
            adapter_budget,
        }
    }

    /// Run all six predictions for one profile.
    ///
    /// `cluster_label` is assigned by an external segmentation step and
    /// passed through to the recommendation path.
    pub async fn run(
        &self,
        raw: &RawFinancialProfile,
        cluster_label: u32,
    ) -> Result<UnifiedPredictionResult> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let derived = FinancialRatioEngine::derive(raw, cluster_label)?;
        let views = FeatureViewBuilder::build_views(raw, &derived)?;

        debug!(%run_id, cluster_label, "feature views built");

        // The six invocations have no data dependency on each other;
        // inference is CPU-bound, so each runs on the blocking pool.
        let (expense, overspending, anomaly, savings_target, health, recommendation) = tokio::join!(
            self.dispatch("expense_prediction", {
                let registry = Arc::clone(&self.registry);
                let view = views.expense.clone();
                move || registry.expense.predict(&view)
            }),
            self.dispatch("overspending_alert", {
                let registry = Arc::clone(&self.registry);
                let view = views.overspending.clone();
                move || registry.overspending.predict(&view)
            }),
            self.dispatch("anomaly_detection", {
                let registry = Arc::clone(&self.registry);
                let view = views.anomaly.clone();
                move || registry.anomaly.predict(&view)
            }),
            self.dispatch("savings_target", {
                let registry = Arc::clone(&self.registry);
                let view = views.savings_target.clone();
                move || registry.savings_target.predict(&view)
            }),
            self.dispatch("financial_health", {
                let registry = Arc::clone(&self.registry);
                let view = views.health.clone();
                move || registry.health.predict(&view)
            }),
            self.dispatch("personalized_recommender", {
                let registry = Arc::clone(&self.registry);
                let view = views.recommendation.clone();
                move || registry.recommendation.predict(&view)
            }),
        );

        let result = UnifiedPredictionResult {
            expense_prediction: expense,
            overspending_alert: overspending,
            anomaly_detection: anomaly,
            savings_target_result: savings_target,
            financial_health_score: health,
            personalized_recommendations: recommendation,
        };

        let successes = [
            result.expense_prediction.is_success(),
            result.overspending_alert.is_success(),
            result.anomaly_detection.is_success(),
            result.savings_target_result.is_success(),
            result.financial_health_score.is_success(),
            result.personalized_recommendations.is_success(),
        ]
        .iter()
        .filter(|ok| **ok)
        .count();

        info!(
            %run_id,
            successes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "orchestration complete"
        );

        Ok(result)
    }

    /// Invoke one adapter on the blocking pool under the configured
    /// budget. A panic or a timeout degrades to a labeled failure.
    async fn dispatch<T, F>(&self, name: &'static str, invoke: F) -> Outcome<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Outcome<T> + Send + 'static,
    {
        match timeout(self.adapter_budget, task::spawn_blocking(invoke)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => {
                warn!(adapter = name, error = %join_err, "adapter task aborted");
                Outcome::failure(format!("{name}: adapter task aborted: {join_err}"))
            }
            Err(_) => {
                warn!(
                    adapter = name,
                    budget_ms = self.adapter_budget.as_millis() as u64,
                    "adapter timed out"
                );
                Outcome::failure(format!(
                    "{name}: adapter timed out after {}ms",
                    self.adapter_budget.as_millis()
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        AnomalyAdapter, ExpenseAdapter, FinancialHealthAdapter, OverspendingAdapter,
        RecommendationAdapter, SavingsTargetAdapter,
    };
    use crate::artifacts::{
        BoostedModel, DecisionTree, ForestModel, IsolationForestModel, Link, LinearModel,
        StandardScaler, TreeModel, TreeNode,
    };
    use crate::error::PredictionError;

    fn constant_tree(value: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![TreeNode::Leaf { value }],
        }
    }

    fn working_expense_adapter() -> ExpenseAdapter {
        ExpenseAdapter::new(ForestModel {
            scaler: None,
            trees: vec![constant_tree(5000.0)],
        })
    }

    /// A model whose scaler width disagrees with every view, so every
    /// invocation fails at the artifact boundary.
    fn poisoned_expense_adapter() -> ExpenseAdapter {
        ExpenseAdapter::new(ForestModel {
            scaler: Some(StandardScaler {
                mean: vec![0.0],
                scale: vec![1.0],
            }),
            trees: vec![constant_tree(5000.0)],
        })
    }

    fn test_registry(expense: ExpenseAdapter) -> Arc<ModelRegistry> {
        Arc::new(ModelRegistry::new(
            expense,
            OverspendingAdapter::new(BoostedModel {
                base_score: 1.0,
                link: Link::Logistic,
                trees: vec![],
            }),
            AnomalyAdapter::new(IsolationForestModel {
                trees: vec![constant_tree(12.0)],
                normalizer: 6.0,
                score_threshold: 0.6,
            }),
            SavingsTargetAdapter::new(TreeModel {
                tree: constant_tree(1.0),
            }),
            FinancialHealthAdapter::new(BoostedModel {
                base_score: 70.0,
                link: Link::Identity,
                trees: vec![],
            }),
            RecommendationAdapter::new(LinearModel {
                intercept: 12.0,
                coefficients: vec![0.0; 5],
                scaler: None,
            }),
        ))
    }

    fn sample_profile() -> RawFinancialProfile {
        RawFinancialProfile {
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
        }
    }

    #[tokio::test]
    async fn test_full_run_succeeds_on_all_six() {
        let orchestrator = PredictionOrchestrator::new(test_registry(working_expense_adapter()));
        let result = orchestrator.run(&sample_profile(), 1).await.unwrap();

        assert!(result.expense_prediction.is_success());
        assert_eq!(result.overspending_alert, Outcome::Success(true));
        assert_eq!(result.anomaly_detection, Outcome::Success(false));
        assert_eq!(result.savings_target_result, Outcome::Success(true));
        assert_eq!(result.financial_health_score, Outcome::Success(70.0));
        assert!(result.personalized_recommendations.is_success());
    }

    #[tokio::test]
    async fn test_one_failing_adapter_does_not_deny_the_other_five() {
        let orchestrator = PredictionOrchestrator::new(test_registry(poisoned_expense_adapter()));
        let result = orchestrator.run(&sample_profile(), 1).await.unwrap();

        match &result.expense_prediction {
            Outcome::Failure { error } => assert!(error.contains("expense_prediction")),
            Outcome::Success(_) => panic!("poisoned adapter must fail"),
        }
        assert!(result.overspending_alert.is_success());
        assert!(result.anomaly_detection.is_success());
        assert!(result.savings_target_result.is_success());
        assert!(result.financial_health_score.is_success());
        assert!(result.personalized_recommendations.is_success());
    }

    #[tokio::test]
    async fn test_exhausted_budget_degrades_to_timeout_failures() {
        // A budget no adapter can meet: every slot must degrade to a
        // labeled timeout failure, and the run itself must still succeed.
        let orchestrator = PredictionOrchestrator::with_budget(
            test_registry(working_expense_adapter()),
            Duration::from_nanos(1),
        );

        let result = orchestrator.run(&sample_profile(), 1).await.unwrap();

        fn assert_timed_out<T: std::fmt::Debug>(outcome: &Outcome<T>) {
            match outcome {
                Outcome::Failure { error } => {
                    assert!(error.contains("timed out"), "unexpected reason: {error}")
                }
                Outcome::Success(value) => panic!("expected timeout, got {value:?}"),
            }
        }

        assert_timed_out(&result.expense_prediction);
        assert_timed_out(&result.overspending_alert);
        assert_timed_out(&result.anomaly_detection);
        assert_timed_out(&result.savings_target_result);
        assert_timed_out(&result.financial_health_score);
        assert_timed_out(&result.personalized_recommendations);
    }

    #[tokio::test]
    async fn test_invalid_profile_aborts_before_any_model() {
        let orchestrator = PredictionOrchestrator::new(test_registry(working_expense_adapter()));

        let mut profile = sample_profile();
        profile.income = -1.0;

        let err = orchestrator.run(&profile, 1).await.unwrap_err();
        assert!(matches!(err, PredictionError::Input(_)));
    }

    #[tokio::test]
    async fn test_zero_income_profile_still_runs_end_to_end() {
        let orchestrator = PredictionOrchestrator::new(test_registry(working_expense_adapter()));

        let mut profile = sample_profile();
        profile.income = 0.0;
        profile.desired_savings_percentage = 0.0;

        let result = orchestrator.run(&profile, 1).await.unwrap();
        assert!(result.overspending_alert.is_success());
        assert!(result.financial_health_score.is_success());
    }

    #[tokio::test]
    async fn test_cluster_label_reaches_the_allocation_table() {
        let orchestrator = PredictionOrchestrator::new(test_registry(working_expense_adapter()));

        let mut profile = sample_profile();
        profile.income = 40000.0;

        let result = orchestrator.run(&profile, 2).await.unwrap();
        match result.personalized_recommendations {
            Outcome::Success(allocation) => {
                // "other" row: 30% rent, 20% groceries, 15% discretionary
                assert_eq!(allocation.rent, 12000.0);
                assert_eq!(allocation.groceries, 8000.0);
                assert_eq!(allocation.discretionary, 6000.0);
                // intercept-only regressor predicts 12%
                assert_eq!(allocation.savings, 4800.0);
            }
            Outcome::Failure { error } => panic!("unexpected failure: {error}"),
        }
    }
}
