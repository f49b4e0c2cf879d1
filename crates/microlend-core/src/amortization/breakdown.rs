use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::calendar;
use crate::amortization::installment::try_installment_amount;
use crate::error::LendingError;
use crate::time_value::{overflow, periodic_rate, round_money};
use crate::types::*;
use crate::LendingResult;

/// A single row of the amortization table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationPeriod {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub opening_balance: Money,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

/// Principal/interest split of an interest-rate loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownOutput {
    pub loan_id: String,
    pub periodic_rate: Rate,
    pub periods: Vec<AmortizationPeriod>,
    pub total_interest: Money,
    pub total_principal: Money,
    /// Closing balance after the last installment. Non-zero because every
    /// installment carries the same rounded amount.
    pub residual_balance: Money,
}

/// Build the per-installment principal/interest table for an interest-rate loan.
pub fn build_breakdown(terms: &LoanTerms) -> LendingResult<ComputationOutput<BreakdownOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if terms.payment_type != PaymentType::InterestRate {
        return Err(LendingError::InvalidInput {
            field: "payment_type".into(),
            reason: "Breakdown requires an INTEREST_RATE loan".into(),
        });
    }
    let annual = terms.interest_rate.ok_or_else(|| LendingError::InvalidInput {
        field: "interest_rate".into(),
        reason: "not provided".into(),
    })?;

    // Validates the term, so the capacity below is bounded by MAX_TERM.
    let payment = try_installment_amount(terms.principal, annual, terms.term, terms.frequency)?;
    let rate = periodic_rate(annual, terms.frequency);

    let mut periods = Vec::with_capacity(terms.term as usize);
    let mut balance = terms.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut due = calendar::anchor(terms.issue_date);

    for installment_number in 1..=terms.term {
        due = calendar::advance(due, terms.frequency)?;
        let opening = balance;

        let interest = opening
            .checked_mul(rate)
            .map(round_money)
            .ok_or_else(|| overflow("period interest"))?;
        let principal = payment
            .checked_sub(interest)
            .ok_or_else(|| overflow("period principal"))?;
        balance = opening
            .checked_sub(principal)
            .ok_or_else(|| overflow("closing balance"))?;

        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| overflow("total interest"))?;
        total_principal = total_principal
            .checked_add(principal)
            .ok_or_else(|| overflow("total principal"))?;

        periods.push(AmortizationPeriod {
            installment_number,
            due_date: due.date_naive(),
            opening_balance: opening,
            payment,
            interest,
            principal,
            closing_balance: balance,
        });
    }

    if !balance.is_zero() {
        warnings.push(format!(
            "Residual balance of {balance} after final installment (no rounding correction applied)"
        ));
    }

    let output = BreakdownOutput {
        loan_id: terms.loan_id.clone(),
        periodic_rate: rate,
        periods,
        total_interest,
        total_principal,
        residual_balance: balance,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortization table: interest on opening balance, remainder to principal",
        &serde_json::json!({
            "loan_id": terms.loan_id,
            "principal": terms.principal.to_string(),
            "annual_rate_pct": annual.to_string(),
            "frequency": terms.frequency,
            "term": terms.term,
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

    fn terms() -> LoanTerms {
        LoanTerms {
            loan_id: "L-1".into(),
            principal: dec!(1000),
            payment_type: PaymentType::InterestRate,
            interest_rate: Some(dec!(12)),
            fixed_payment: None,
            frequency: Frequency::Monthly,
            issue_date: NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            term: 12,
        }
    }

    #[test]
    fn test_first_period_split() {
        let out = build_breakdown(&terms()).unwrap();
        let first = &out.result.periods[0];
        // 1% of 1000
        assert_eq!(first.interest, dec!(10.00));
        assert_eq!(first.payment, dec!(88.85));
        assert_eq!(first.principal, dec!(78.85));
        assert_eq!(first.closing_balance, dec!(921.15));
    }

    #[test]
    fn test_balance_chains() {
        let out = build_breakdown(&terms()).unwrap();
        for pair in out.result.periods.windows(2) {
            assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        }
    }

    #[test]
    fn test_residual_is_small() {
        let out = build_breakdown(&terms()).unwrap();
        assert!(out.result.residual_balance.abs() < dec!(0.10));
        assert_eq!(
            out.result.total_principal + out.result.residual_balance,
            dec!(1000)
        );
    }

    #[test]
    fn test_fixed_loan_rejected() {
        let mut t = terms();
        t.payment_type = PaymentType::Fixed;
        assert!(build_breakdown(&t).is_err());
    }

    #[test]
    fn test_term_above_maximum_rejected() {
        let mut t = terms();
        t.term = u32::MAX;
        assert!(matches!(build_breakdown(&t), Err(LendingError::InvalidInput { .. })));
    }

    #[test]
    fn test_huge_principal_rejected() {
        let mut t = terms();
        t.principal = Decimal::MAX;
        assert!(matches!(build_breakdown(&t), Err(LendingError::NotComputable(_))));
    }

    #[test]
    fn test_zero_rate_rejected() {
        let mut t = terms();
        t.interest_rate = Some(Decimal::ZERO);
        assert!(build_breakdown(&t).is_err());
    }
}
