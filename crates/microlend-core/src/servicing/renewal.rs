use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LendingError;
use crate::servicing::status::{can_regenerate, outstanding_balance};
use crate::time_value::overflow;
use crate::types::*;
use crate::LendingResult;

/// Input for sizing a renewal loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalInput {
    /// Schedule of the loan being renewed, with payments recorded so far.
    pub schedule: Vec<ScheduleEntry>,
    /// Cash handed to the client on top of the payoff.
    pub net_cash_to_client: Money,
}

/// Renewal sizing result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalOutput {
    pub payoff: Money,
    pub net_cash_to_client: Money,
    /// Principal of the new loan.
    pub new_principal: Money,
    pub unpaid_installments: u32,
}

/// Principal of a renewal: payoff of the old loan plus net cash to the client.
pub fn renewal_principal(schedule: &[ScheduleEntry], net_cash_to_client: Money) -> LendingResult<Money> {
    if net_cash_to_client < Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "net_cash_to_client".into(),
            reason: "Net cash to client cannot be negative".into(),
        });
    }
    outstanding_balance(schedule)?
        .checked_add(net_cash_to_client)
        .ok_or_else(|| overflow("renewal principal"))
}

/// Size a renewal from the old loan's schedule.
pub fn calculate_renewal(input: &RenewalInput) -> LendingResult<ComputationOutput<RenewalOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.schedule.is_empty() {
        return Err(LendingError::InvalidInput {
            field: "schedule".into(),
            reason: "Renewal requires the schedule of the loan being renewed".into(),
        });
    }

    let payoff = outstanding_balance(&input.schedule)?;
    let new_principal = renewal_principal(&input.schedule, input.net_cash_to_client)?;
    let unpaid_installments = input
        .schedule
        .iter()
        .filter(|e| e.amount_paid < e.amount_due)
        .count() as u32;

    if payoff.is_zero() {
        warnings.push("Loan is fully paid; renewal principal is the net cash only".into());
    }
    if can_regenerate(&input.schedule) {
        warnings.push("No payments recorded on the loan being renewed".into());
    }
    if new_principal <= Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "net_cash_to_client".into(),
            reason: "Renewal principal must be positive".into(),
        });
    }

    let output = RenewalOutput {
        payoff,
        net_cash_to_client: input.net_cash_to_client,
        new_principal,
        unpaid_installments,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Renewal principal = outstanding payoff + net cash to client",
        &serde_json::json!({
            "installments": input.schedule.len(),
            "net_cash_to_client": input.net_cash_to_client.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn schedule(paid: &[Money]) -> Vec<ScheduleEntry> {
        paid.iter()
            .enumerate()
            .map(|(i, p)| ScheduleEntry {
                loan_id: "L-9".into(),
                installment_number: i as u32 + 1,
                due_date: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(),
                amount_due: dec!(100),
                amount_paid: *p,
                status: InstallmentStatus::Pending,
            })
            .collect()
    }

    #[test]
    fn test_renewal_principal() {
        let s = schedule(&[dec!(100), dec!(40), dec!(0)]);
        assert_eq!(renewal_principal(&s, dec!(250)).unwrap(), dec!(410));
    }

    #[test]
    fn test_negative_net_cash_rejected() {
        let s = schedule(&[dec!(0)]);
        assert!(renewal_principal(&s, dec!(-1)).is_err());
    }

    #[test]
    fn test_calculate_renewal() {
        let out = calculate_renewal(&RenewalInput {
            schedule: schedule(&[dec!(100), dec!(40), dec!(0)]),
            net_cash_to_client: dec!(500),
        })
        .unwrap();
        assert_eq!(out.result.payoff, dec!(160));
        assert_eq!(out.result.new_principal, dec!(660));
        assert_eq!(out.result.unpaid_installments, 2);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_fully_paid_with_no_cash_rejected() {
        let input = RenewalInput {
            schedule: schedule(&[dec!(100)]),
            net_cash_to_client: Decimal::ZERO,
        };
        assert!(calculate_renewal(&input).is_err());
    }

    #[test]
    fn test_empty_schedule_rejected() {
        let input = RenewalInput {
            schedule: Vec::new(),
            net_cash_to_client: dec!(100),
        };
        assert!(calculate_renewal(&input).is_err());
    }

    #[test]
    fn test_renewal_overflow_is_not_computable() {
        let s = schedule(&[dec!(0)]);
        let result = renewal_principal(&s, Decimal::MAX);
        assert!(matches!(result, Err(LendingError::NotComputable(_))));
    }
}
