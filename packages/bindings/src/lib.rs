use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Form preview
// ---------------------------------------------------------------------------

/// Live installment estimate for the loan form.
///
/// Returns `null` while the form is incomplete or the terms are not
/// computable; only malformed JSON is an error.
#[napi]
pub fn preview_installment(input_json: String) -> NapiResult<Option<String>> {
    let input: microlend_core::amortization::installment::InstallmentPreviewInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    Ok(microlend_core::amortization::installment::preview_installment(&input)
        .map(|amount| amount.to_string()))
}

// ---------------------------------------------------------------------------
// Schedule generation (create / edit / renew flows)
// ---------------------------------------------------------------------------

/// Full schedule for persistence. Rejects instead of returning an empty list,
/// so the calling transaction rolls back.
#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: microlend_core::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        microlend_core::amortization::schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_breakdown(input_json: String) -> NapiResult<String> {
    let input: microlend_core::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        microlend_core::amortization::breakdown::build_breakdown(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Servicing
// ---------------------------------------------------------------------------

#[napi]
pub fn review_schedule(input_json: String) -> NapiResult<String> {
    let input: microlend_core::servicing::status::ReviewInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        microlend_core::servicing::status::review_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn renewal_principal(input_json: String) -> NapiResult<String> {
    let input: microlend_core::servicing::renewal::RenewalInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        microlend_core::servicing::renewal::calculate_renewal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
