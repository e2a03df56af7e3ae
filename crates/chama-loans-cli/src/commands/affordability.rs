use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use chama_loans_core::affordability::max_principal::{self, AffordabilityInput};

use crate::input;

/// Arguments for borrowing capacity
#[derive(Args)]
pub struct AffordabilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Installment the member can afford each month
    #[arg(long)]
    pub monthly_budget: Option<Decimal>,

    /// Nominal annual interest rate in percent (12 = 12%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long, allow_negative_numbers = true)]
    pub term_months: Option<i32>,
}

pub fn run_affordability(args: AffordabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let monthly_budget = args
            .monthly_budget
            .ok_or("--monthly-budget is required (or provide --input)")?;
        let annual_rate = args
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?;
        let term_months = args
            .term_months
            .ok_or("--term-months is required (or provide --input)")?;

        AffordabilityInput {
            monthly_budget,
            annual_rate_percent: annual_rate,
            term_months,
        }
    };

    let result = max_principal::calculate_max_principal(&afford_input)?;
    Ok(serde_json::to_value(result)?)
}
