//! Financial ratio engine
//!
//! Pure feature derivation: one raw profile in, one fully populated
//! derived set out. Deterministic, no I/O, no model dependency.
//! Division by a zero denominator is an expected input here, not an
//! exceptional one, so every guard resolves to 0.

use crate::error::PredictionError;
use crate::models::{DerivedFeatureSet, PotentialSavings, RawFinancialProfile};
use crate::Result;

/// Heuristic reduction rates for potential-savings estimates.
/// Flexible day-to-day categories first, sticky ones second.
const REDUCIBLE_RATE: f64 = 0.10; // groceries, transport, eating out, entertainment
const STICKY_RATE: f64 = 0.05; // utilities, healthcare, education, miscellaneous

/// Stateless derivation engine
pub struct FinancialRatioEngine;

impl FinancialRatioEngine {
    /// Derive every model-input scalar from one raw profile.
    ///
    /// Total for any well-typed input, including income = 0 and all-zero
    /// expenses. Only malformed raw fields are an error.
    pub fn derive(profile: &RawFinancialProfile, cluster_label: u32) -> Result<DerivedFeatureSet> {
        validate_profile(profile)?;

        let income = profile.income;
        let total_expenses: f64 = profile
            .expense_amounts()
            .iter()
            .map(|(_, amount)| amount)
            .sum();

        let disposable_income = income - total_expenses;
        let desired_savings_amount = profile.desired_savings_percentage / 100.0 * income;

        let essential_expenses =
            profile.groceries + profile.transport + profile.utilities + profile.healthcare;
        let non_essential_expenses =
            profile.eating_out + profile.entertainment + profile.miscellaneous;

        Ok(DerivedFeatureSet {
            total_expenses,
            disposable_income,
            desired_savings_amount,
            savings_efficiency: safe_div(disposable_income, desired_savings_amount),
            calculated_efficiency_pct: safe_div(disposable_income, income) * 100.0,
            rent_to_income_ratio: safe_div(profile.rent, income),
            groceries_to_income_ratio: safe_div(profile.groceries, income),
            total_expenses_to_income_ratio: safe_div(total_expenses, income),
            essential_expenses,
            non_essential_expenses,
            discretionary_ratio: safe_div(non_essential_expenses, income),
            debt_ratio: safe_div(profile.loan_repayment + profile.insurance, income),
            potential_savings: PotentialSavings {
                groceries: profile.groceries * REDUCIBLE_RATE,
                transport: profile.transport * REDUCIBLE_RATE,
                eating_out: profile.eating_out * REDUCIBLE_RATE,
                entertainment: profile.entertainment * REDUCIBLE_RATE,
                utilities: profile.utilities * STICKY_RATE,
                healthcare: profile.healthcare * STICKY_RATE,
                education: profile.education * STICKY_RATE,
                miscellaneous: profile.miscellaneous * STICKY_RATE,
            },
            cluster_label,
        })
    }
}

/// 0 on a zero denominator — never NaN/Inf for finite inputs.
fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn validate_profile(profile: &RawFinancialProfile) -> Result<()> {
    if !profile.income.is_finite() || profile.income < 0.0 {
        return Err(PredictionError::Input(format!(
            "Income must be a non-negative number, got {}",
            profile.income
        )));
    }

    for (name, amount) in profile.expense_amounts() {
        if !amount.is_finite() || amount < 0.0 {
            return Err(PredictionError::Input(format!(
                "{} must be a non-negative number, got {}",
                name, amount
            )));
        }
    }

    if !profile.desired_savings_percentage.is_finite()
        || !(0.0..=100.0).contains(&profile.desired_savings_percentage)
    {
        return Err(PredictionError::Input(format!(
            "Desired_Savings_Percentage must be within 0..=100, got {}",
            profile.desired_savings_percentage
        )));
    }

    if !(1..=3).contains(&profile.city_tier) {
        return Err(PredictionError::Input(format!(
            "City_Tier must be 1, 2 or 3, got {}",
            profile.city_tier
        )));
    }

    Ok(())
}
