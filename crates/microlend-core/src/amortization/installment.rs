//! Periodic installment calculator.
//!
//! The same rounding path serves the live form preview and the schedule
//! generator, so the estimate a loan officer sees is the amount persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::LendingError;
use crate::time_value::{annuity_payment, periodic_rate, round_money};
use crate::types::*;
use crate::LendingResult;

/// Longest schedule the engine will produce: ten years of daily installments.
pub const MAX_TERM: u32 = 3_660;

/// Reject installment counts outside `1..=MAX_TERM`.
pub fn check_term(term: u32) -> LendingResult<()> {
    if term == 0 {
        return Err(LendingError::InvalidInput {
            field: "term".into(),
            reason: "Term must be at least one installment".into(),
        });
    }
    if term > MAX_TERM {
        return Err(LendingError::InvalidInput {
            field: "term".into(),
            reason: format!("Term of {term} installments exceeds the maximum of {MAX_TERM}"),
        });
    }
    Ok(())
}

/// Compute the rounded installment, naming the offending input on failure.
pub fn try_installment_amount(
    principal: Money,
    annual_rate_percent: Decimal,
    term: u32,
    frequency: Frequency,
) -> LendingResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    check_term(term)?;

    let rate = periodic_rate(annual_rate_percent, frequency);
    if rate <= Decimal::ZERO {
        return Err(LendingError::NotComputable(format!(
            "periodic rate {rate} is not positive; zero-interest loans use a fixed payment"
        )));
    }

    let raw = annuity_payment(rate, term, principal)?;
    Ok(round_money(raw))
}

/// Installment amount for an amortizing loan, or `None` when not computable.
pub fn installment_amount(
    principal: Money,
    annual_rate_percent: Decimal,
    term: u32,
    frequency: Frequency,
) -> Option<Money> {
    try_installment_amount(principal, annual_rate_percent, term, frequency).ok()
}

/// Partially filled loan form, as received while the user is still typing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallmentPreviewInput {
    #[serde(default)]
    pub principal: Option<Money>,
    /// Annual rate as a percentage.
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
    #[serde(default)]
    pub term: Option<i64>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
}

/// Result of a form preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentPreview {
    /// `None` means "not enough data yet", not a failure.
    pub installment: Option<Money>,
    pub periodic_rate: Option<Rate>,
    pub periods_per_year: Option<u32>,
}

fn resolve_preview(input: &InstallmentPreviewInput) -> LendingResult<Money> {
    let missing = |field: &str| LendingError::InvalidInput {
        field: field.into(),
        reason: "not provided".into(),
    };
    let principal = input.principal.ok_or_else(|| missing("principal"))?;
    let rate = input.interest_rate.ok_or_else(|| missing("interest_rate"))?;
    let frequency = input.frequency.ok_or_else(|| missing("frequency"))?;
    let term = input.term.ok_or_else(|| missing("term"))?;
    let term = u32::try_from(term).map_err(|_| LendingError::InvalidInput {
        field: "term".into(),
        reason: format!("{term} is not a valid installment count"),
    })?;
    try_installment_amount(principal, rate, term, frequency)
}

/// Preview amount for a partially filled form. Never fails.
pub fn preview_installment(input: &InstallmentPreviewInput) -> Option<Money> {
    resolve_preview(input).ok()
}

/// Preview wrapped in the standard envelope; the reason an amount is not
/// shown lands in `warnings` instead of an error.
pub fn calculate_installment(input: &InstallmentPreviewInput) -> ComputationOutput<InstallmentPreview> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let installment = match resolve_preview(input) {
        Ok(amount) => {
            debug!(%amount, "installment preview computed");
            Some(amount)
        }
        Err(e) => {
            debug!(reason = %e, "installment preview not computable");
            warnings.push(e.to_string());
            None
        }
    };

    let output = InstallmentPreview {
        installment,
        periodic_rate: match (input.interest_rate, input.frequency) {
            (Some(r), Some(f)) => Some(periodic_rate(r, f)),
            _ => None,
        },
        periods_per_year: input.frequency.map(Frequency::periods_per_year),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Level-payment amortization (rate / (1 - (1 + rate)^-n)), rounded half away from zero",
        input,
        warnings,
        elapsed,
        output,
    )
}
