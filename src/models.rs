//! Core data models for the prediction pipeline
//!
//! Wire field names follow the training-data column names
//! (`Income`, `Loan_Repayment`, ...) so the HTTP layer can pass
//! request bodies through without remapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

//
// ================= Raw Profile =================
//

/// One user's monthly financial snapshot. Read-only to the core: one
/// profile drives exactly one orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawFinancialProfile {
    #[serde(rename = "Income")]
    pub income: f64,
    #[serde(rename = "Rent")]
    pub rent: f64,
    #[serde(rename = "Loan_Repayment")]
    pub loan_repayment: f64,
    #[serde(rename = "Insurance")]
    pub insurance: f64,
    #[serde(rename = "Groceries")]
    pub groceries: f64,
    #[serde(rename = "Transport")]
    pub transport: f64,
    #[serde(rename = "Eating_Out")]
    pub eating_out: f64,
    #[serde(rename = "Entertainment")]
    pub entertainment: f64,
    #[serde(rename = "Utilities")]
    pub utilities: f64,
    #[serde(rename = "Healthcare")]
    pub healthcare: f64,
    #[serde(rename = "Education")]
    pub education: f64,
    #[serde(rename = "Miscellaneous")]
    pub miscellaneous: f64,
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Dependents")]
    pub dependents: u32,
    #[serde(rename = "Occupation")]
    pub occupation: String,
    #[serde(rename = "City_Tier")]
    pub city_tier: u8,
    #[serde(rename = "Desired_Savings_Percentage")]
    pub desired_savings_percentage: f64,
}

impl RawFinancialProfile {
    /// All eleven expense categories, in training-column order.
    pub fn expense_amounts(&self) -> [(&'static str, f64); 11] {
        [
            ("Rent", self.rent),
            ("Loan_Repayment", self.loan_repayment),
            ("Insurance", self.insurance),
            ("Groceries", self.groceries),
            ("Transport", self.transport),
            ("Eating_Out", self.eating_out),
            ("Entertainment", self.entertainment),
            ("Utilities", self.utilities),
            ("Healthcare", self.healthcare),
            ("Education", self.education),
            ("Miscellaneous", self.miscellaneous),
        ]
    }
}

//
// ================= Derived Features =================
//

/// Fixed heuristic reduction rates used for potential-savings estimates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PotentialSavings {
    pub groceries: f64,
    pub transport: f64,
    pub eating_out: f64,
    pub entertainment: f64,
    pub utilities: f64,
    pub healthcare: f64,
    pub education: f64,
    pub miscellaneous: f64,
}

/// Scalars derived from one raw profile. Regenerated every run, never
/// persisted. Every income-normalized ratio is 0 when income is 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DerivedFeatureSet {
    pub total_expenses: f64,
    pub disposable_income: f64,
    pub desired_savings_amount: f64,
    pub savings_efficiency: f64,
    pub calculated_efficiency_pct: f64,
    pub rent_to_income_ratio: f64,
    pub groceries_to_income_ratio: f64,
    pub total_expenses_to_income_ratio: f64,
    pub essential_expenses: f64,
    pub non_essential_expenses: f64,
    pub discretionary_ratio: f64,
    pub debt_ratio: f64,
    pub potential_savings: PotentialSavings,
    /// Externally assigned segment, see `PredictionOrchestrator::run`.
    pub cluster_label: u32,
}

//
// ================= Outcomes =================
//

/// Result of one model invocation. Serializes as either the bare success
/// payload or `{"error": reason}`, matching the aggregate wire contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Outcome<T> {
    Success(T),
    Failure { error: String },
}

impl<T> Outcome<T> {
    pub fn failure(reason: impl Into<String>) -> Self {
        Outcome::Failure {
            error: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Expense model payload: predicted disposable income plus the predicted
/// total redistributed across the user's existing category split.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseBreakdown {
    #[serde(rename = "Disposable_Income")]
    pub disposable_income: f64,
    #[serde(rename = "Total_Expenses")]
    pub total_expenses: f64,
    #[serde(rename = "Category_Expenses")]
    pub category_expenses: BTreeMap<String, f64>,
}

/// Recommendation payload: category-level budget allocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetAllocation {
    #[serde(rename = "Rent")]
    pub rent: f64,
    #[serde(rename = "Groceries")]
    pub groceries: f64,
    #[serde(rename = "Savings")]
    pub savings: f64,
    #[serde(rename = "Discretionary")]
    pub discretionary: f64,
}

//
// ================= Aggregate Result =================
//

/// The unified result: one outcome per model, fixed shape, built once per
/// orchestration call. Mixing `Success` and `Failure` is expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedPredictionResult {
    #[serde(rename = "Expense_Prediction")]
    pub expense_prediction: Outcome<ExpenseBreakdown>,
    #[serde(rename = "Overspending_Alert")]
    pub overspending_alert: Outcome<bool>,
    #[serde(rename = "Anomaly_Detection")]
    pub anomaly_detection: Outcome<bool>,
    #[serde(rename = "Savings_Target_Result")]
    pub savings_target_result: Outcome<bool>,
    #[serde(rename = "Financial_Health_Score")]
    pub financial_health_score: Outcome<f64>,
    #[serde(rename = "Personalized_Recommendations")]
    pub personalized_recommendations: Outcome<BudgetAllocation>,
}

/// Round half-away-from-zero to 2 decimals, applied only at the output
/// step — intermediate math stays unrounded.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
