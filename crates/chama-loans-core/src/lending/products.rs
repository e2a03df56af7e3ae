//! Loan products offered by a chama and the bounds a request must respect.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::LoanError;
use crate::types::{Currency, Money, Percent, MAX_TERM_MONTHS};
use crate::LoanResult;

/// A loan product: its rate and the amount/term window members may borrow in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanType {
    pub id: String,
    pub name: String,
    /// Nominal annual rate as a percentage.
    pub annual_rate_percent: Percent,
    pub min_amount: Money,
    pub max_amount: Money,
    pub max_term_months: i32,
    /// One-off fee deducted at disbursement, as a percentage of the amount.
    #[serde(default)]
    pub processing_fee_percent: Percent,
}

/// The set of products a group offers, all in one currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanCatalog {
    #[serde(default)]
    pub currency: Currency,
    pub loan_types: Vec<LoanType>,
}

impl LoanCatalog {
    pub fn from_yaml_str(s: &str) -> LoanResult<Self> {
        let catalog: LoanCatalog = serde_yaml::from_str(s)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(s: &str) -> LoanResult<Self> {
        let catalog: LoanCatalog = serde_json::from_str(s)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn find(&self, id: &str) -> Option<&LoanType> {
        self.loan_types.iter().find(|t| t.id == id)
    }

    /// Check every product and that ids are unique.
    pub fn validate(&self) -> LoanResult<()> {
        let mut seen = HashSet::new();
        for loan_type in &self.loan_types {
            validate_loan_type(loan_type)?;
            if !seen.insert(loan_type.id.as_str()) {
                return Err(LoanError::invalid(
                    "loan_types",
                    format!("Duplicate loan type id '{}'", loan_type.id),
                ));
            }
        }
        Ok(())
    }
}

/// Reject a request whose amount or term falls outside the product window.
pub fn validate_loan_request(
    loan_type: &LoanType,
    amount: Money,
    term_months: i32,
) -> LoanResult<()> {
    if amount < loan_type.min_amount || amount > loan_type.max_amount {
        return Err(LoanError::invalid(
            "amount",
            format!(
                "Amount {} is outside {} limits [{}, {}]",
                amount, loan_type.name, loan_type.min_amount, loan_type.max_amount
            ),
        ));
    }
    if term_months < 1 || term_months > loan_type.max_term_months {
        return Err(LoanError::invalid(
            "term_months",
            format!(
                "Term of {} months is outside {} limits [1, {}]",
                term_months, loan_type.name, loan_type.max_term_months
            ),
        ));
    }
    Ok(())
}

fn validate_loan_type(loan_type: &LoanType) -> LoanResult<()> {
    let field = |name: &str| format!("loan_types[{}].{}", loan_type.id, name);

    if loan_type.id.trim().is_empty() {
        return Err(LoanError::invalid("loan_types.id", "Loan type id cannot be empty"));
    }
    if loan_type.min_amount <= Decimal::ZERO {
        return Err(LoanError::invalid(
            &field("min_amount"),
            "Minimum amount must be positive",
        ));
    }
    if loan_type.min_amount > loan_type.max_amount {
        return Err(LoanError::invalid(
            &field("max_amount"),
            "Maximum amount cannot be below minimum amount",
        ));
    }
    if loan_type.max_term_months < 1 || loan_type.max_term_months > MAX_TERM_MONTHS {
        return Err(LoanError::invalid(
            &field("max_term_months"),
            format!("Maximum term must be between 1 and {MAX_TERM_MONTHS} months"),
        ));
    }
    if loan_type.annual_rate_percent < Decimal::ZERO {
        return Err(LoanError::invalid(
            &field("annual_rate_percent"),
            "Annual rate cannot be negative",
        ));
    }
    if loan_type.processing_fee_percent < Decimal::ZERO
        || loan_type.processing_fee_percent >= Decimal::ONE_HUNDRED
    {
        return Err(LoanError::invalid(
            &field("processing_fee_percent"),
            "Processing fee must be in [0, 100)",
        ));
    }
    Ok(())
}
