//! Recommendation policy
//!
//! A fixed rule table keyed by cluster label turns the regressor's
//! predicted savings percentage into a category-level budget. This is
//! pure allocation logic, not a model.

use crate::models::{round2, BudgetAllocation};

/// Allocation row: income shares for the three fixed categories.
struct AllocationRow {
    rent: f64,
    groceries: f64,
    discretionary: f64,
}

const CLUSTER_0: AllocationRow = AllocationRow {
    rent: 0.20,
    groceries: 0.15,
    discretionary: 0.10,
};

const CLUSTER_1: AllocationRow = AllocationRow {
    rent: 0.25,
    groceries: 0.15,
    discretionary: 0.10,
};

/// Higher clusters skew toward higher fixed costs.
const CLUSTER_OTHER: AllocationRow = AllocationRow {
    rent: 0.30,
    groceries: 0.20,
    discretionary: 0.15,
};

pub struct RecommendationPolicy;

impl RecommendationPolicy {
    /// Allocate a monthly budget. Savings comes from the model's
    /// predicted percentage; the rest comes from the cluster row.
    pub fn allocate(predicted_savings_pct: f64, income: f64, cluster_label: u32) -> BudgetAllocation {
        let row = match cluster_label {
            0 => &CLUSTER_0,
            1 => &CLUSTER_1,
            _ => &CLUSTER_OTHER,
        };

        BudgetAllocation {
            rent: round2(income * row.rent),
            groceries: round2(income * row.groceries),
            savings: round2(income * predicted_savings_pct / 100.0),
            discretionary: round2(income * row.discretionary),
        }
    }
}
