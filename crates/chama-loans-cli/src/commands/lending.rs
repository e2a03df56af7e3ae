use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use chama_loans_core::lending::amortization::{self, AmortizationInput};
use chama_loans_core::lending::products::{LoanCatalog, LoanType};
use chama_loans_core::lending::quote::{self, QuoteInput};

use crate::input;

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual interest rate in percent (12 = 12%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long, allow_negative_numbers = true)]
    pub term_months: Option<i32>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,

    /// Round currency values to whole units for display
    #[arg(long)]
    pub round: bool,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let amort_input: AmortizationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let principal = args
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let annual_rate = args
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?;
        let term_months = args
            .term_months
            .ok_or("--term-months is required (or provide --input)")?;

        AmortizationInput {
            principal,
            annual_rate_percent: annual_rate,
            term_months,
            first_payment_date: args.first_payment_date,
        }
    };

    let mut result = amortization::calculate_amortization(&amort_input)?;
    if args.round {
        result.result = result.result.rounded(0);
    }
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a loan quote
#[derive(Args)]
pub struct QuoteArgs {
    /// Path to JSON quote input (loan type embedded; overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan product catalog (.yaml, .yml or .json)
    #[arg(long)]
    pub products: Option<String>,

    /// Id of the loan type in the catalog
    #[arg(long)]
    pub loan_type: Option<String>,

    /// Requested amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Requested number of monthly installments
    #[arg(long, allow_negative_numbers = true)]
    pub term_months: Option<i32>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,
}

pub fn run_quote(args: QuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let quote_input: QuoteInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let products = args
            .products
            .as_deref()
            .ok_or("--products is required (or provide --input)")?;
        let loan_type_id = args
            .loan_type
            .as_deref()
            .ok_or("--loan-type is required (or provide --input)")?;
        let amount = args.amount.ok_or("--amount is required (or provide --input)")?;
        let term_months = args
            .term_months
            .ok_or("--term-months is required (or provide --input)")?;

        let catalog = input::file::read_catalog(products)?;
        let loan_type = find_loan_type(&catalog, loan_type_id)?;

        QuoteInput {
            loan_type,
            amount,
            term_months,
            first_payment_date: args.first_payment_date,
        }
    };

    let result = quote::quote_loan(&quote_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for listing a loan catalog
#[derive(Args)]
pub struct ProductsArgs {
    /// Loan product catalog (.yaml, .yml or .json)
    #[arg(long)]
    pub products: String,
}

pub fn run_products(args: ProductsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let catalog = input::file::read_catalog(&args.products)?;
    tracing::info!(
        currency = ?catalog.currency,
        loan_types = catalog.loan_types.len(),
        "catalog is valid"
    );
    Ok(serde_json::to_value(&catalog.loan_types)?)
}

fn find_loan_type(
    catalog: &LoanCatalog,
    id: &str,
) -> Result<LoanType, Box<dyn std::error::Error>> {
    match catalog.find(id) {
        Some(loan_type) => Ok(loan_type.clone()),
        None => {
            let available: Vec<&str> = catalog.loan_types.iter().map(|t| t.id.as_str()).collect();
            Err(format!(
                "Unknown loan type '{}' (available: {})",
                id,
                available.join(", ")
            )
            .into())
        }
    }
}
