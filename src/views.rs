//! Model-specific feature views
//!
//! Each pretrained model was trained on a fixed column list; each view is
//! the typed rendition of that list, in training order. Views are built
//! once per run, validated before any model is invoked, and immutable
//! afterwards.

use crate::error::PredictionError;
use crate::models::{DerivedFeatureSet, RawFinancialProfile};
use crate::Result;

/// Denominator floor the discretionary-vs-essential ratio was trained
/// with; must match the training pipeline exactly.
const ESSENTIAL_FLOOR: f64 = 1e-5;

//
// ================= View Schemas =================
//

/// Input row for the expense regressor (random forest + scaler).
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFeatures {
    pub income: f64,
    pub rent: f64,
    pub loan_repayment: f64,
    pub groceries: f64,
    pub transport: f64,
    pub eating_out: f64,
    pub entertainment: f64,
    pub utilities: f64,
    pub healthcare: f64,
    pub education: f64,
    pub miscellaneous: f64,
    pub savings_efficiency: f64,
    pub rent_to_income_ratio: f64,
    pub groceries_to_income_ratio: f64,
    pub total_expenses_to_income_ratio: f64,
}

impl ExpenseFeatures {
    pub const NAME: &'static str = "expense_prediction";
    pub const FEATURE_NAMES: &'static [&'static str] = &[
        "Income",
        "Rent",
        "Loan_Repayment",
        "Groceries",
        "Transport",
        "Eating_Out",
        "Entertainment",
        "Utilities",
        "Healthcare",
        "Education",
        "Miscellaneous",
        "Savings_Efficiency",
        "Rent_to_Income_Ratio",
        "Groceries_to_Income_Ratio",
        "Total_Expenses_to_Income_Ratio",
    ];

    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.income,
            self.rent,
            self.loan_repayment,
            self.groceries,
            self.transport,
            self.eating_out,
            self.entertainment,
            self.utilities,
            self.healthcare,
            self.education,
            self.miscellaneous,
            self.savings_efficiency,
            self.rent_to_income_ratio,
            self.groceries_to_income_ratio,
            self.total_expenses_to_income_ratio,
        ]
    }
}

/// Input row for the overspending classifier (boosted trees, logistic).
#[derive(Debug, Clone, PartialEq)]
pub struct OverspendingFeatures {
    pub income: f64,
    pub total_expenses: f64,
    pub rent_to_income_ratio: f64,
    pub groceries_to_income_ratio: f64,
    pub total_expenses_to_income_ratio: f64,
    pub savings_efficiency: f64,
    pub essential_expenses: f64,
    pub non_essential_expenses: f64,
}

impl OverspendingFeatures {
    pub const NAME: &'static str = "overspending_alert";
    pub const FEATURE_NAMES: &'static [&'static str] = &[
        "Income",
        "Total_Expenses",
        "Rent_to_Income_Ratio",
        "Groceries_to_Income_Ratio",
        "Total_Expenses_to_Income_Ratio",
        "Savings_Efficiency",
        "Essential_Expenses",
        "Non_Essential_Expenses",
    ];

    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.income,
            self.total_expenses,
            self.rent_to_income_ratio,
            self.groceries_to_income_ratio,
            self.total_expenses_to_income_ratio,
            self.savings_efficiency,
            self.essential_expenses,
            self.non_essential_expenses,
        ]
    }
}

/// Input row for the anomaly detector (isolation forest).
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyFeatures {
    pub income: f64,
    pub total_expenses: f64,
    pub rent_to_income_ratio: f64,
    pub groceries_to_income_ratio: f64,
    pub total_expenses_to_income_ratio: f64,
    pub savings_efficiency: f64,
    pub discretionary_to_income_ratio: f64,
    pub savings_target_efficiency: f64,
}

impl AnomalyFeatures {
    pub const NAME: &'static str = "anomaly_detection";
    pub const FEATURE_NAMES: &'static [&'static str] = &[
        "Income",
        "Total_Expenses",
        "Rent_to_Income_Ratio",
        "Groceries_to_Income_Ratio",
        "Total_Expenses_to_Income_Ratio",
        "Savings_Efficiency",
        "Discretionary_to_Income_Ratio",
        "Savings_Target_Efficiency",
    ];

    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.income,
            self.total_expenses,
            self.rent_to_income_ratio,
            self.groceries_to_income_ratio,
            self.total_expenses_to_income_ratio,
            self.savings_efficiency,
            self.discretionary_to_income_ratio,
            self.savings_target_efficiency,
        ]
    }
}

/// Input row for the savings-target classifier (single decision tree).
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsTargetFeatures {
    pub income: f64,
    pub disposable_income: f64,
    pub essential_expenses: f64,
    pub non_essential_expenses: f64,
    pub total_expenses_to_income_ratio: f64,
    pub desired_savings_percentage: f64,
    pub calculated_savings_efficiency: f64,
    pub potential_savings_groceries: f64,
    pub potential_savings_transport: f64,
    pub potential_savings_eating_out: f64,
    pub potential_savings_entertainment: f64,
}

impl SavingsTargetFeatures {
    pub const NAME: &'static str = "savings_target";
    pub const FEATURE_NAMES: &'static [&'static str] = &[
        "Income",
        "Disposable_Income",
        "Essential_Expenses",
        "Non_Essential_Expenses",
        "Total_Expenses_to_Income_Ratio",
        "Desired_Savings_Percentage",
        "Calculated_Savings_Efficiency",
        "Potential_Savings_Groceries",
        "Potential_Savings_Transport",
        "Potential_Savings_Eating_Out",
        "Potential_Savings_Entertainment",
    ];

    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.income,
            self.disposable_income,
            self.essential_expenses,
            self.non_essential_expenses,
            self.total_expenses_to_income_ratio,
            self.desired_savings_percentage,
            self.calculated_savings_efficiency,
            self.potential_savings_groceries,
            self.potential_savings_transport,
            self.potential_savings_eating_out,
            self.potential_savings_entertainment,
        ]
    }
}

/// Input row for the financial health regressor (boosted trees).
#[derive(Debug, Clone, PartialEq)]
pub struct HealthScoreFeatures {
    pub income: f64,
    pub disposable_income: f64,
    pub essential_expenses: f64,
    pub non_essential_expenses: f64,
    pub total_expenses_to_income_ratio: f64,
    pub desired_savings_percentage: f64,
    pub savings_efficiency: f64,
    pub debt_to_income_ratio: f64,
}

impl HealthScoreFeatures {
    pub const NAME: &'static str = "financial_health";
    pub const FEATURE_NAMES: &'static [&'static str] = &[
        "Income",
        "Disposable_Income",
        "Essential_Expenses",
        "Non_Essential_Expenses",
        "Total_Expenses_to_Income_Ratio",
        "Desired_Savings_Percentage",
        "Savings_Efficiency",
        "Debt_to_Income_Ratio",
    ];

    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.income,
            self.disposable_income,
            self.essential_expenses,
            self.non_essential_expenses,
            self.total_expenses_to_income_ratio,
            self.desired_savings_percentage,
            self.savings_efficiency,
            self.debt_to_income_ratio,
        ]
    }
}

/// Input row for the savings-percentage regressor feeding the
/// recommendation policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationFeatures {
    pub income: f64,
    pub essential_expenses: f64,
    pub discretionary_vs_essential: f64,
    pub savings_gap: f64,
    pub cluster_label: u32,
}

impl RecommendationFeatures {
    pub const NAME: &'static str = "personalized_recommender";
    pub const FEATURE_NAMES: &'static [&'static str] = &[
        "Income",
        "Essential_Expenses",
        "Discretionary_vs_Essential",
        "Savings_Gap",
        "Cluster_Label",
    ];

    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.income,
            self.essential_expenses,
            self.discretionary_vs_essential,
            self.savings_gap,
            f64::from(self.cluster_label),
        ]
    }
}

//
// ================= Builder =================
//

/// All six views for one run, built together so a structural defect
/// fails the whole request before any model is invoked.
#[derive(Debug, Clone)]
pub struct FeatureViews {
    pub expense: ExpenseFeatures,
    pub overspending: OverspendingFeatures,
    pub anomaly: AnomalyFeatures,
    pub savings_target: SavingsTargetFeatures,
    pub health: HealthScoreFeatures,
    pub recommendation: RecommendationFeatures,
}

pub struct FeatureViewBuilder;

impl FeatureViewBuilder {
    pub fn build_views(
        raw: &RawFinancialProfile,
        derived: &DerivedFeatureSet,
    ) -> Result<FeatureViews> {
        let views = FeatureViews {
            expense: ExpenseFeatures {
                income: raw.income,
                rent: raw.rent,
                loan_repayment: raw.loan_repayment,
                groceries: raw.groceries,
                transport: raw.transport,
                eating_out: raw.eating_out,
                entertainment: raw.entertainment,
                utilities: raw.utilities,
                healthcare: raw.healthcare,
                education: raw.education,
                miscellaneous: raw.miscellaneous,
                savings_efficiency: derived.savings_efficiency,
                rent_to_income_ratio: derived.rent_to_income_ratio,
                groceries_to_income_ratio: derived.groceries_to_income_ratio,
                total_expenses_to_income_ratio: derived.total_expenses_to_income_ratio,
            },
            overspending: OverspendingFeatures {
                income: raw.income,
                total_expenses: derived.total_expenses,
                rent_to_income_ratio: derived.rent_to_income_ratio,
                groceries_to_income_ratio: derived.groceries_to_income_ratio,
                total_expenses_to_income_ratio: derived.total_expenses_to_income_ratio,
                savings_efficiency: derived.savings_efficiency,
                essential_expenses: derived.essential_expenses,
                non_essential_expenses: derived.non_essential_expenses,
            },
            anomaly: AnomalyFeatures {
                income: raw.income,
                total_expenses: derived.total_expenses,
                rent_to_income_ratio: derived.rent_to_income_ratio,
                groceries_to_income_ratio: derived.groceries_to_income_ratio,
                total_expenses_to_income_ratio: derived.total_expenses_to_income_ratio,
                savings_efficiency: derived.savings_efficiency,
                discretionary_to_income_ratio: derived.discretionary_ratio,
                savings_target_efficiency: derived.calculated_efficiency_pct,
            },
            savings_target: SavingsTargetFeatures {
                income: raw.income,
                disposable_income: derived.disposable_income,
                essential_expenses: derived.essential_expenses,
                non_essential_expenses: derived.non_essential_expenses,
                total_expenses_to_income_ratio: derived.total_expenses_to_income_ratio,
                desired_savings_percentage: raw.desired_savings_percentage,
                calculated_savings_efficiency: derived.calculated_efficiency_pct,
                potential_savings_groceries: derived.potential_savings.groceries,
                potential_savings_transport: derived.potential_savings.transport,
                potential_savings_eating_out: derived.potential_savings.eating_out,
                potential_savings_entertainment: derived.potential_savings.entertainment,
            },
            health: HealthScoreFeatures {
                income: raw.income,
                disposable_income: derived.disposable_income,
                essential_expenses: derived.essential_expenses,
                non_essential_expenses: derived.non_essential_expenses,
                total_expenses_to_income_ratio: derived.total_expenses_to_income_ratio,
                desired_savings_percentage: raw.desired_savings_percentage,
                savings_efficiency: derived.savings_efficiency,
                debt_to_income_ratio: derived.debt_ratio,
            },
            recommendation: RecommendationFeatures {
                income: raw.income,
                essential_expenses: derived.essential_expenses,
                discretionary_vs_essential: derived.non_essential_expenses
                    / (derived.essential_expenses + ESSENTIAL_FLOOR),
                savings_gap: raw.desired_savings_percentage - derived.calculated_efficiency_pct,
                cluster_label: derived.cluster_label,
            },
        };

        check_finite(ExpenseFeatures::NAME, ExpenseFeatures::FEATURE_NAMES, &views.expense.to_vector())?;
        check_finite(
            OverspendingFeatures::NAME,
            OverspendingFeatures::FEATURE_NAMES,
            &views.overspending.to_vector(),
        )?;
        check_finite(AnomalyFeatures::NAME, AnomalyFeatures::FEATURE_NAMES, &views.anomaly.to_vector())?;
        check_finite(
            SavingsTargetFeatures::NAME,
            SavingsTargetFeatures::FEATURE_NAMES,
            &views.savings_target.to_vector(),
        )?;
        check_finite(HealthScoreFeatures::NAME, HealthScoreFeatures::FEATURE_NAMES, &views.health.to_vector())?;
        check_finite(
            RecommendationFeatures::NAME,
            RecommendationFeatures::FEATURE_NAMES,
            &views.recommendation.to_vector(),
        )?;

        Ok(views)
    }
}

/// Every view slot must hold a finite value before dispatch. A non-finite
/// slot means the derivation contract was broken somewhere upstream.
fn check_finite(view: &'static str, names: &'static [&'static str], values: &[f64]) -> Result<()> {
    let bad: Vec<&'static str> = names
        .iter()
        .zip(values.iter())
        .filter(|(_, value)| !value.is_finite())
        .map(|(name, _)| *name)
        .collect();

    if bad.is_empty() {
        Ok(())
    } else {
        Err(PredictionError::Schema { view, fields: bad })
    }
}
