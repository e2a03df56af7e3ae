//! Node bindings: each function takes the input struct as a JSON string and
//! returns the computation envelope as a JSON string.

use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Lending
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_amortization(input_json: String) -> NapiResult<String> {
    let input: chama_loans_core::lending::amortization::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = chama_loans_core::lending::amortization::calculate_amortization(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn quote_loan(input_json: String) -> NapiResult<String> {
    let input: chama_loans_core::lending::quote::QuoteInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = chama_loans_core::lending::quote::quote_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_loan_catalog(catalog_json: String) -> NapiResult<String> {
    let catalog = chama_loans_core::lending::products::LoanCatalog::from_json_str(&catalog_json)
        .map_err(to_napi_error)?;
    serde_json::to_string(&catalog).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Affordability
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_max_principal(input_json: String) -> NapiResult<String> {
    let input: chama_loans_core::affordability::max_principal::AffordabilityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = chama_loans_core::affordability::max_principal::calculate_max_principal(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
