use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::LoanError;
use crate::types::{Money, Rate};
use crate::LoanResult;

/// Growth factor `(1 + rate)^nper`, failing instead of panicking when the
/// power leaves Decimal's range.
pub fn compound_factor(rate: Rate, nper: u32) -> LoanResult<Decimal> {
    if rate <= Decimal::NEGATIVE_ONE {
        return Err(LoanError::invalid(
            "rate",
            "Periodic rate must be greater than -100%",
        ));
    }
    (Decimal::ONE + rate)
        .checked_powi(i64::from(nper))
        .ok_or_else(|| LoanError::Overflow {
            context: format!("compound factor (1 + {rate})^{nper}"),
        })
}

/// Present Value
pub fn pv(rate: Rate, nper: u32, pmt: Money, fv: Money) -> LoanResult<Money> {
    if nper == 0 {
        return Err(LoanError::invalid("nper", "Number of periods must be > 0"));
    }

    if rate.is_zero() {
        return pmt
            .checked_mul(Decimal::from(nper))
            .and_then(|total| total.checked_add(fv))
            .map(|total| -total)
            .ok_or_else(|| LoanError::overflow("PV of undiscounted payments"));
    }

    let factor = compound_factor(rate, nper)?;

    if factor.is_zero() {
        return Err(LoanError::DivisionByZero {
            context: "PV factor".into(),
        });
    }

    let annuity_factor = (Decimal::ONE - Decimal::ONE / factor) / rate;
    pmt.checked_mul(annuity_factor)
        .and_then(|annuity| fv.checked_div(factor).and_then(|d| annuity.checked_add(d)))
        .map(|total| -total)
        .ok_or_else(|| LoanError::overflow("PV of annuity"))
}

/// Payment (PMT)
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> LoanResult<Money> {
    if nper == 0 {
        return Err(LoanError::invalid("nper", "Number of periods must be > 0"));
    }

    if rate.is_zero() {
        return present_value
            .checked_add(future_value)
            .and_then(|total| total.checked_div(Decimal::from(nper)))
            .map(|payment| -payment)
            .ok_or_else(|| LoanError::overflow("PMT straight-line payment"));
    }

    // Discounted form of -(pv * f + fv) * r / (f - 1); never multiplies by f
    let factor = compound_factor(rate, nper)?;
    if factor.is_zero() {
        return Err(LoanError::DivisionByZero {
            context: "PMT factor".into(),
        });
    }
    let discount = Decimal::ONE / factor;
    let annuity_factor = (Decimal::ONE - discount) / rate;

    if annuity_factor.is_zero() {
        return Err(LoanError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    future_value
        .checked_mul(discount)
        .and_then(|d| present_value.checked_add(d))
        .and_then(|total| total.checked_div(annuity_factor))
        .map(|payment| -payment)
        .ok_or_else(|| LoanError::overflow("PMT annuity payment"))
}
