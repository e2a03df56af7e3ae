//! How much can a member borrow for a given monthly budget?
//!
//! Inverse of the level-payment formula: the principal whose installment at
//! the given rate and term equals the budget.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanError;
use crate::time_value;
use crate::types::{
    monthly_rate_from_annual_percent, with_metadata, ComputationOutput, Money, Percent,
    MAX_TERM_MONTHS,
};
use crate::LoanResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    /// Installment the member can afford each month.
    pub monthly_budget: Money,
    pub annual_rate_percent: Percent,
    pub term_months: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    pub max_principal: Money,
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
}

pub fn calculate_max_principal(
    input: &AffordabilityInput,
) -> LoanResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let term = validate_affordability_input(input)?;
    let monthly_rate = monthly_rate_from_annual_percent(input.annual_rate_percent);

    let max_principal = time_value::pv(monthly_rate, term, -input.monthly_budget, Decimal::ZERO)?;
    let total_payment = input
        .monthly_budget
        .checked_mul(Decimal::from(term))
        .ok_or_else(|| LoanError::overflow("total payment"))?;
    let total_interest = total_payment
        .checked_sub(max_principal)
        .ok_or_else(|| LoanError::overflow("total interest"))?;

    tracing::debug!(
        monthly_budget = %input.monthly_budget,
        term_months = term,
        max_principal = %max_principal,
        "affordability computed"
    );

    let output = AffordabilityOutput {
        max_principal,
        monthly_payment: input.monthly_budget,
        total_payment,
        total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Maximum principal for a fixed monthly installment (annuity present value)",
        &serde_json::json!({
            "monthly_budget": input.monthly_budget.to_string(),
            "annual_rate_percent": input.annual_rate_percent.to_string(),
            "term_months": input.term_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_affordability_input(input: &AffordabilityInput) -> LoanResult<u32> {
    if input.monthly_budget <= Decimal::ZERO {
        return Err(LoanError::invalid(
            "monthly_budget",
            "Monthly budget must be positive",
        ));
    }
    if input.annual_rate_percent < Decimal::ZERO {
        return Err(LoanError::invalid(
            "annual_rate_percent",
            "Annual rate cannot be negative",
        ));
    }
    if input.term_months <= 0 {
        return Err(LoanError::invalid(
            "term_months",
            "Term must be at least 1 month",
        ));
    }
    if input.term_months > MAX_TERM_MONTHS {
        return Err(LoanError::invalid(
            "term_months",
            format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
        ));
    }
    Ok(input.term_months as u32)
}
