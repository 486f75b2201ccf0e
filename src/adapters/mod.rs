//! Model adapters
//!
//! One thin wrapper per pretrained artifact. Every adapter takes exactly
//! its matching feature view and maps the raw model output to the public
//! payload shape. Nothing here propagates an error upward: any artifact
//! failure becomes `Outcome::Failure` so the other five predictions are
//! unaffected.

use std::collections::BTreeMap;

use tracing::warn;

use crate::artifacts::{
    ArtifactError, BoostedModel, ForestModel, IsolationForestModel, LinearModel, TreeModel,
};
use crate::models::{round2, BudgetAllocation, ExpenseBreakdown, Outcome};
use crate::policy::RecommendationPolicy;
use crate::views::{
    AnomalyFeatures, ExpenseFeatures, HealthScoreFeatures, OverspendingFeatures,
    RecommendationFeatures, SavingsTargetFeatures,
};

/// Classifier decision boundary for models emitting {0,1} or probability
/// leaves.
const DECISION_THRESHOLD: f64 = 0.5;

fn fail<T>(adapter: &'static str, err: ArtifactError) -> Outcome<T> {
    warn!(adapter, error = %err, "model invocation failed");
    Outcome::failure(format!("{adapter}: {err}"))
}

//
// ================= Expense Prediction =================
//

/// Random-forest regressor predicting disposable income; the implied
/// expense total is redistributed across the user's existing category
/// split.
#[derive(Debug)]
pub struct ExpenseAdapter {
    model: ForestModel,
}

impl ExpenseAdapter {
    pub fn new(model: ForestModel) -> Self {
        Self { model }
    }

    pub fn predict(&self, view: &ExpenseFeatures) -> Outcome<ExpenseBreakdown> {
        let disposable_income = match self.model.predict(&view.to_vector()) {
            Ok(value) => value,
            Err(err) => return fail("expense_prediction", err),
        };

        let total_expenses = view.income - disposable_income;

        // Category ratios come from the *input* amounts: the predicted
        // total is split proportionally to the user's current spending.
        let raw = [
            ("Rent", view.rent),
            ("Groceries", view.groceries),
            ("Transport", view.transport),
            ("Eating_Out", view.eating_out),
            ("Entertainment", view.entertainment),
            ("Utilities", view.utilities),
            ("Healthcare", view.healthcare),
            ("Education", view.education),
            ("Miscellaneous", view.miscellaneous),
        ];
        let raw_total: f64 = raw.iter().map(|(_, amount)| amount).sum();

        let category_expenses: BTreeMap<String, f64> = raw
            .iter()
            .map(|(category, amount)| {
                let share = if raw_total == 0.0 { 0.0 } else { amount / raw_total };
                (category.to_string(), round2(total_expenses * share))
            })
            .collect();

        Outcome::Success(ExpenseBreakdown {
            disposable_income: round2(disposable_income),
            total_expenses: round2(total_expenses),
            category_expenses,
        })
    }
}

//
// ================= Overspending Alert =================
//

/// Boosted-tree classifier with a logistic link.
#[derive(Debug)]
pub struct OverspendingAdapter {
    model: BoostedModel,
}

impl OverspendingAdapter {
    pub fn new(model: BoostedModel) -> Self {
        Self { model }
    }

    pub fn predict(&self, view: &OverspendingFeatures) -> Outcome<bool> {
        match self.model.predict(&view.to_vector()) {
            Ok(probability) => Outcome::Success(probability >= DECISION_THRESHOLD),
            Err(err) => fail("overspending_alert", err),
        }
    }
}

//
// ================= Anomaly Detection =================
//

/// Isolation forest. The detector's raw -1/1 label convention is
/// translated so that `true` means anomalous.
#[derive(Debug)]
pub struct AnomalyAdapter {
    model: IsolationForestModel,
}

impl AnomalyAdapter {
    pub fn new(model: IsolationForestModel) -> Self {
        Self { model }
    }

    pub fn predict(&self, view: &AnomalyFeatures) -> Outcome<bool> {
        match self.model.predict_label(&view.to_vector()) {
            Ok(label) => Outcome::Success(label == -1),
            Err(err) => fail("anomaly_detection", err),
        }
    }
}

//
// ================= Savings Target =================
//

/// Single decision tree: was the desired savings target achieved.
#[derive(Debug)]
pub struct SavingsTargetAdapter {
    model: TreeModel,
}

impl SavingsTargetAdapter {
    pub fn new(model: TreeModel) -> Self {
        Self { model }
    }

    pub fn predict(&self, view: &SavingsTargetFeatures) -> Outcome<bool> {
        match self.model.predict(&view.to_vector()) {
            Ok(value) => Outcome::Success(value >= DECISION_THRESHOLD),
            Err(err) => fail("savings_target", err),
        }
    }
}

//
// ================= Financial Health Score =================
//

/// Boosted-tree regressor producing a 0-100 health score.
#[derive(Debug)]
pub struct FinancialHealthAdapter {
    model: BoostedModel,
}

impl FinancialHealthAdapter {
    pub fn new(model: BoostedModel) -> Self {
        Self { model }
    }

    pub fn predict(&self, view: &HealthScoreFeatures) -> Outcome<f64> {
        match self.model.predict(&view.to_vector()) {
            Ok(score) => Outcome::Success(round2(score)),
            Err(err) => fail("financial_health", err),
        }
    }
}

//
// ================= Personalized Recommendations =================
//

/// Linear regressor predicting a savings percentage, handed to the
/// cluster-keyed allocation policy.
#[derive(Debug)]
pub struct RecommendationAdapter {
    model: LinearModel,
}

impl RecommendationAdapter {
    pub fn new(model: LinearModel) -> Self {
        Self { model }
    }

    pub fn predict(&self, view: &RecommendationFeatures) -> Outcome<BudgetAllocation> {
        match self.model.predict(&view.to_vector()) {
            Ok(predicted_savings_pct) => Outcome::Success(RecommendationPolicy::allocate(
                predicted_savings_pct,
                view.income,
                view.cluster_label,
            )),
            Err(err) => fail("personalized_recommender", err),
        }
    }
}
