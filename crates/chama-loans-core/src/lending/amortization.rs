//! Level-payment (annuity) amortization of a member loan.
//!
//! Every installment is the same amount; the split between interest and
//! principal shifts towards principal as the balance falls. Values are not
//! rounded here. Presentation code rounds for display (see
//! [`AmortizationResult::rounded`]).

use chrono::{Months, NaiveDate};
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

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Loan terms as entered on the calculator form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationInput {
    /// Loan amount.
    pub principal: Money,
    /// Nominal annual rate as a percentage (12 = 12% p.a.).
    pub annual_rate_percent: Percent,
    /// Number of monthly installments.
    pub term_months: i32,
    /// When set, each row carries the calendar date its installment is due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

/// Full amortization of a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub monthly_payment: Money,
    /// monthly_payment * term_months.
    pub total_payment: Money,
    /// total_payment - principal.
    pub total_interest: Money,
    /// One row per month, in chronological order.
    pub schedule: Vec<PaymentRow>,
}

/// A single installment in the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    /// 1-indexed month number.
    pub month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// Remaining principal after this installment, never negative.
    pub balance: Money,
}

impl AmortizationResult {
    /// Copy of the result with every currency value rounded to `dp` places.
    pub fn rounded(&self, dp: u32) -> AmortizationResult {
        AmortizationResult {
            monthly_payment: self.monthly_payment.round_dp(dp),
            total_payment: self.total_payment.round_dp(dp),
            total_interest: self.total_interest.round_dp(dp),
            schedule: self
                .schedule
                .iter()
                .map(|row| PaymentRow {
                    month: row.month,
                    due_date: row.due_date,
                    payment: row.payment.round_dp(dp),
                    principal_portion: row.principal_portion.round_dp(dp),
                    interest_portion: row.interest_portion.round_dp(dp),
                    balance: row.balance.round_dp(dp),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Amortize a loan and wrap the result with methodology and timing metadata.
pub fn calculate_amortization(
    input: &AmortizationInput,
) -> LoanResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = build_schedule(input)?;

    if input.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate; schedule is straight-line".into());
    }

    tracing::debug!(
        principal = %input.principal,
        annual_rate_percent = %input.annual_rate_percent,
        term_months = input.term_months,
        monthly_payment = %result.monthly_payment,
        "amortization computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization (ordinary annuity, monthly compounding)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_percent": input.annual_rate_percent.to_string(),
            "monthly_rate": monthly_rate_from_annual_percent(input.annual_rate_percent).to_string(),
            "term_months": input.term_months,
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Deterministic core of [`calculate_amortization`], without the envelope.
pub fn build_schedule(input: &AmortizationInput) -> LoanResult<AmortizationResult> {
    let term = validate_amortization_input(input)?;

    let monthly_rate = monthly_rate_from_annual_percent(input.annual_rate_percent);
    let monthly_payment = time_value::pmt(monthly_rate, term, -input.principal, Decimal::ZERO)?;

    let total_payment = monthly_payment
        .checked_mul(Decimal::from(term))
        .ok_or_else(|| LoanError::overflow("total payment"))?;
    let total_interest = total_payment
        .checked_sub(input.principal)
        .ok_or_else(|| LoanError::overflow("total interest"))?;

    let mut schedule: Vec<PaymentRow> = Vec::with_capacity(term as usize);
    let mut balance = input.principal;

    for month in 1..=term {
        let interest_portion = balance
            .checked_mul(monthly_rate)
            .ok_or_else(|| LoanError::overflow("interest portion"))?;
        let principal_portion = monthly_payment
            .checked_sub(interest_portion)
            .ok_or_else(|| LoanError::overflow("principal portion"))?;
        // Clamp absorbs rounding drift on the final row
        balance = balance
            .checked_sub(principal_portion)
            .ok_or_else(|| LoanError::overflow("running balance"))?
            .max(Decimal::ZERO);

        schedule.push(PaymentRow {
            month,
            due_date: due_date(input.first_payment_date, month)?,
            payment: monthly_payment,
            principal_portion,
            interest_portion,
            balance,
        });
    }

    Ok(AmortizationResult {
        monthly_payment,
        total_payment,
        total_interest,
        schedule,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_amortization_input(input: &AmortizationInput) -> LoanResult<u32> {
    if input.principal <= Decimal::ZERO {
        return Err(LoanError::invalid("principal", "Principal must be positive"));
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

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Month `n` falls `n - 1` calendar months after the first payment; chrono
/// clamps to the last day of shorter months.
fn due_date(first: Option<NaiveDate>, month: u32) -> LoanResult<Option<NaiveDate>> {
    match first {
        None => Ok(None),
        Some(date) => date
            .checked_add_months(Months::new(month - 1))
            .map(Some)
            .ok_or_else(|| {
                LoanError::invalid(
                    "first_payment_date",
                    format!("Installment {month} falls outside the supported date range"),
                )
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const TOLERANCE: Decimal = dec!(0.01);

    fn input(principal: Decimal, rate: Decimal, term: i32) -> AmortizationInput {
        AmortizationInput {
            principal,
            annual_rate_percent: rate,
            term_months: term,
            first_payment_date: None,
        }
    }

    fn assert_close(actual: Decimal, expected: Decimal) {
        assert!(
            (actual - expected).abs() < TOLERANCE,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_reference_case_12_percent() {
        let out = build_schedule(&input(dec!(50000), dec!(12), 12)).unwrap();
        assert_close(out.monthly_payment, dec!(4442.44));
        assert_close(out.total_payment, dec!(53309.27));
        assert_close(out.total_interest, dec!(3309.27));
    }

    #[test]
    fn test_first_row_split() {
        let out = build_schedule(&input(dec!(50000), dec!(12), 12)).unwrap();
        let first = &out.schedule[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.interest_portion, dec!(500));
        assert_close(first.principal_portion, dec!(3942.44));
        assert_close(first.balance, dec!(46057.56));
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let out = build_schedule(&input(dec!(12000), dec!(0), 12)).unwrap();
        assert_eq!(out.monthly_payment, dec!(1000));
        assert_eq!(out.total_interest, Decimal::ZERO);
        for row in &out.schedule {
            assert_eq!(row.interest_portion, Decimal::ZERO);
            assert_eq!(row.principal_portion, dec!(1000));
        }
        assert_eq!(out.schedule.last().unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_row_count_matches_term() {
        for term in [1, 2, 12, 60, 360] {
            let out = build_schedule(&input(dec!(100000), dec!(14), term)).unwrap();
            assert_eq!(out.schedule.len(), term as usize);
        }
    }

    #[test]
    fn test_months_are_sequential() {
        let out = build_schedule(&input(dec!(30000), dec!(10), 24)).unwrap();
        let months: Vec<u32> = out.schedule.iter().map(|r| r.month).collect();
        assert_eq!(months, (1..=24).collect::<Vec<u32>>());
    }

    #[test]
    fn test_split_sums_to_payment() {
        let out = build_schedule(&input(dec!(75000), dec!(18), 36)).unwrap();
        for row in &out.schedule {
            assert_eq!(row.payment, out.monthly_payment);
            assert_close(row.principal_portion + row.interest_portion, row.payment);
        }
    }

    #[test]
    fn test_principal_portions_sum_to_principal() {
        let out = build_schedule(&input(dec!(250000), dec!(13.5), 48)).unwrap();
        let repaid: Decimal = out.schedule.iter().map(|r| r.principal_portion).sum();
        assert_close(repaid, dec!(250000));
    }

    #[test]
    fn test_final_balance_is_zero_and_balance_falls() {
        let out = build_schedule(&input(dec!(5000), dec!(24), 6)).unwrap();
        assert_close(out.schedule.last().unwrap().balance, Decimal::ZERO);
        for pair in out.schedule.windows(2) {
            assert!(pair[1].balance <= pair[0].balance);
        }
    }

    #[test]
    fn test_single_month_term() {
        let out = build_schedule(&input(dec!(1000), dec!(12), 1)).unwrap();
        assert_close(out.monthly_payment, dec!(1010));
        assert_eq!(out.schedule.len(), 1);
        assert_close(out.schedule[0].balance, Decimal::ZERO);
    }

    #[test]
    fn test_zero_term_rejected() {
        let err = build_schedule(&input(dec!(50000), dec!(12), 0)).unwrap_err();
        match err {
            LoanError::InvalidInput { field, .. } => assert_eq!(field, "term_months"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_term_rejected() {
        assert!(matches!(
            build_schedule(&input(dec!(50000), dec!(12), -3)),
            Err(LoanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_term_above_ceiling_rejected() {
        for term in [MAX_TERM_MONTHS + 1, i32::MAX] {
            let err = build_schedule(&input(dec!(1000), dec!(0), term)).unwrap_err();
            assert!(matches!(err, LoanError::InvalidInput { ref field, .. } if field == "term_months"));
        }
        let out = build_schedule(&input(dec!(1000), dec!(0), MAX_TERM_MONTHS)).unwrap();
        assert_eq!(out.schedule.len(), MAX_TERM_MONTHS as usize);
    }

    #[test]
    fn test_largest_principal_reports_overflow() {
        let err = build_schedule(&input(Decimal::MAX, dec!(12), 12)).unwrap_err();
        assert!(matches!(err, LoanError::Overflow { .. }));

        let err = build_schedule(&input(dec!(79000000000000000000000000000), dec!(12), 1))
            .unwrap_err();
        assert!(matches!(err, LoanError::Overflow { .. }));
    }

    #[test]
    fn test_extreme_rate_reports_overflow() {
        let err = build_schedule(&input(dec!(1000000), Decimal::MAX, 1)).unwrap_err();
        assert!(matches!(err, LoanError::Overflow { .. }));
    }

    #[test]
    fn test_non_positive_principal_rejected() {
        for principal in [dec!(0), dec!(-100)] {
            let err = build_schedule(&input(principal, dec!(12), 12)).unwrap_err();
            assert!(matches!(err, LoanError::InvalidInput { ref field, .. } if field == "principal"));
        }
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(matches!(
            build_schedule(&input(dec!(1000), dec!(-1), 12)),
            Err(LoanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_due_dates_follow_calendar_months() {
        let mut inp = input(dec!(9000), dec!(12), 3);
        inp.first_payment_date = NaiveDate::from_ymd_opt(2024, 1, 31);
        let out = build_schedule(&inp).unwrap();
        let dates: Vec<Option<NaiveDate>> = out.schedule.iter().map(|r| r.due_date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 31),
                NaiveDate::from_ymd_opt(2024, 2, 29),
                NaiveDate::from_ymd_opt(2024, 3, 31),
            ]
        );
    }

    #[test]
    fn test_no_due_dates_without_start() {
        let out = build_schedule(&input(dec!(9000), dec!(12), 3)).unwrap();
        assert!(out.schedule.iter().all(|r| r.due_date.is_none()));
    }

    #[test]
    fn test_deterministic() {
        let inp = input(dec!(42000), dec!(15), 18);
        assert_eq!(build_schedule(&inp).unwrap(), build_schedule(&inp).unwrap());
    }

    #[test]
    fn test_rounded_copy() {
        let out = build_schedule(&input(dec!(50000), dec!(12), 12)).unwrap();
        let rounded = out.rounded(0);
        assert_eq!(rounded.monthly_payment, dec!(4442));
        assert_eq!(rounded.schedule[0].interest_portion, dec!(500));
        assert_eq!(rounded.schedule.len(), 12);
        // original untouched
        assert!(out.monthly_payment.scale() > 0);
    }

    #[test]
    fn test_envelope_zero_rate_warning() {
        let out = calculate_amortization(&input(dec!(12000), dec!(0), 12)).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.methodology.contains("amortization"));
        assert_eq!(out.assumptions["term_months"], 12);
    }

    #[test]
    fn test_input_deserializes_from_json() {
        let inp: AmortizationInput = serde_json::from_str(
            r#"{"principal": "50000", "annual_rate_percent": "12", "term_months": 12}"#,
        )
        .unwrap();
        assert_eq!(inp, input(dec!(50000), dec!(12), 12));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn valid_input() -> impl Strategy<Value = AmortizationInput> {
            (1u64..=10_000_000, 0u32..=6_000, 1i32..=360).prop_map(|(p, bps, term)| {
                AmortizationInput {
                    principal: Decimal::from(p),
                    annual_rate_percent: Decimal::new(i64::from(bps), 2),
                    term_months: term,
                    first_payment_date: None,
                }
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn schedule_invariants_hold(inp in valid_input()) {
                let out = build_schedule(&inp).unwrap();

                prop_assert_eq!(out.schedule.len(), inp.term_months as usize);

                let repaid: Decimal = out.schedule.iter().map(|r| r.principal_portion).sum();
                prop_assert!((repaid - inp.principal).abs() < TOLERANCE);

                let last = out.schedule.last().unwrap();
                prop_assert!(last.balance.abs() < TOLERANCE);

                let mut previous = inp.principal;
                for row in &out.schedule {
                    prop_assert!(row.balance <= previous);
                    prop_assert!(row.balance >= Decimal::ZERO);
                    prop_assert!((row.principal_portion + row.interest_portion - row.payment).abs() < TOLERANCE);
                    previous = row.balance;
                }
            }
        }
    }
}
