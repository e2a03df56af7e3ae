//! Quote a member loan against a product: bounds check, amortize at the
//! product rate, and account for the processing fee.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanError;
use crate::lending::amortization::{build_schedule, AmortizationInput, AmortizationResult};
use crate::lending::products::{validate_loan_request, LoanType};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LoanResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteInput {
    pub loan_type: LoanType,
    pub amount: Money,
    pub term_months: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanQuote {
    pub loan_type_id: String,
    pub amount: Money,
    pub term_months: i32,
    /// amount * processing_fee_percent / 100.
    pub processing_fee: Money,
    /// What the member actually receives.
    pub net_disbursement: Money,
    /// Interest over the life of the loan plus the processing fee.
    pub effective_cost: Money,
    pub amortization: AmortizationResult,
}

pub fn quote_loan(input: &QuoteInput) -> LoanResult<ComputationOutput<LoanQuote>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let loan_type = &input.loan_type;

    validate_loan_request(loan_type, input.amount, input.term_months)?;

    let amortization = build_schedule(&AmortizationInput {
        principal: input.amount,
        annual_rate_percent: loan_type.annual_rate_percent,
        term_months: input.term_months,
        first_payment_date: input.first_payment_date,
    })?;

    let processing_fee = input
        .amount
        .checked_mul(loan_type.processing_fee_percent)
        .map(|fee| fee / Decimal::ONE_HUNDRED)
        .ok_or_else(|| LoanError::overflow("processing fee"))?;
    let net_disbursement = input.amount - processing_fee;
    let effective_cost = amortization
        .total_interest
        .checked_add(processing_fee)
        .ok_or_else(|| LoanError::overflow("effective cost"))?;

    if input.term_months == loan_type.max_term_months {
        warnings.push(format!(
            "Term is at the {} maximum of {} months",
            loan_type.name, loan_type.max_term_months
        ));
    }
    if loan_type.annual_rate_percent.is_zero() {
        warnings.push(format!("{} carries no interest", loan_type.name));
    }
    for w in &warnings {
        tracing::warn!(loan_type = %loan_type.id, "{w}");
    }

    tracing::debug!(
        loan_type = %loan_type.id,
        amount = %input.amount,
        term_months = input.term_months,
        monthly_payment = %amortization.monthly_payment,
        processing_fee = %processing_fee,
        "loan quoted"
    );

    let output = LoanQuote {
        loan_type_id: loan_type.id.clone(),
        amount: input.amount,
        term_months: input.term_months,
        processing_fee,
        net_disbursement,
        effective_cost,
        amortization,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan quote — product bounds, level-payment amortization, processing fee",
        &serde_json::json!({
            "loan_type": loan_type.id,
            "annual_rate_percent": loan_type.annual_rate_percent.to_string(),
            "processing_fee_percent": loan_type.processing_fee_percent.to_string(),
            "amount": input.amount.to_string(),
            "term_months": input.term_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn development_loan() -> LoanType {
        LoanType {
            id: "development".into(),
            name: "Development Loan".into(),
            annual_rate_percent: dec!(12),
            min_amount: dec!(10000),
            max_amount: dec!(500000),
            max_term_months: 36,
            processing_fee_percent: dec!(2),
        }
    }

    fn quote_input(amount: Decimal, term: i32) -> QuoteInput {
        QuoteInput {
            loan_type: development_loan(),
            amount,
            term_months: term,
            first_payment_date: None,
        }
    }

    #[test]
    fn test_quote_matches_amortization() {
        let out = quote_loan(&quote_input(dec!(50000), 12)).unwrap();
        let q = &out.result;
        assert!((q.amortization.monthly_payment - dec!(4442.44)).abs() < dec!(0.01));
        assert_eq!(q.amortization.schedule.len(), 12);
        assert_eq!(q.loan_type_id, "development");
    }

    #[test]
    fn test_processing_fee_and_net_disbursement() {
        let out = quote_loan(&quote_input(dec!(50000), 12)).unwrap();
        let q = &out.result;
        assert_eq!(q.processing_fee, dec!(1000));
        assert_eq!(q.net_disbursement, dec!(49000));
        assert_eq!(q.effective_cost, q.amortization.total_interest + dec!(1000));
    }

    #[test]
    fn test_quote_outside_product_bounds() {
        let err = quote_loan(&quote_input(dec!(5000), 12)).unwrap_err();
        assert!(matches!(err, LoanError::InvalidInput { ref field, .. } if field == "amount"));

        let err = quote_loan(&quote_input(dec!(50000), 48)).unwrap_err();
        assert!(matches!(err, LoanError::InvalidInput { ref field, .. } if field == "term_months"));
    }

    #[test]
    fn test_fee_on_huge_amount_reports_overflow() {
        let mut input = quote_input(dec!(70000000000000000000000000000), 1);
        input.loan_type.max_amount = Decimal::MAX;
        input.loan_type.annual_rate_percent = dec!(0);
        input.loan_type.processing_fee_percent = dec!(50);
        let err = quote_loan(&input).unwrap_err();
        assert!(matches!(err, LoanError::Overflow { .. }));
    }

    #[test]
    fn test_max_term_warning() {
        let out = quote_loan(&quote_input(dec!(50000), 36)).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("maximum"));
    }

    #[test]
    fn test_interest_free_product() {
        let mut input = quote_input(dec!(12000), 12);
        input.loan_type.annual_rate_percent = dec!(0);
        input.loan_type.processing_fee_percent = dec!(0);
        let out = quote_loan(&input).unwrap();
        assert_eq!(out.result.amortization.monthly_payment, dec!(1000));
        assert_eq!(out.result.effective_cost, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("no interest")));
    }

    #[test]
    fn test_quote_carries_due_dates() {
        let mut input = quote_input(dec!(20000), 2);
        input.first_payment_date = NaiveDate::from_ymd_opt(2025, 5, 5);
        let out = quote_loan(&input).unwrap();
        assert_eq!(
            out.result.amortization.schedule[1].due_date,
            NaiveDate::from_ymd_opt(2025, 6, 5)
        );
    }
}
