use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::amortization::calendar;
use crate::amortization::installment::{check_term, try_installment_amount};
use crate::error::LendingError;
use crate::time_value::{annuity_payment, checked_total, overflow, periodic_rate};
use crate::types::*;
use crate::LendingResult;

/// Totals over a generated schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub installments: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_due_date: Option<NaiveDate>,
    pub amount_per_installment: Money,
    pub total_due: Money,
    /// `total_due - principal`.
    pub total_interest: Money,
    /// `total_due` minus the unrounded installment times the term.
    /// Only meaningful for interest-rate loans; reported, never applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounding_drift: Option<Money>,
}

/// Output of the checked schedule builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub loan_id: String,
    pub entries: Vec<ScheduleEntry>,
    pub summary: ScheduleSummary,
}

/// Amount due on every installment of the loan.
///
/// Interest-rate loans use the calculator; when that is not computable, or
/// the loan is fixed-payment, the fixed payment is used if it is positive.
/// A term outside `1..=MAX_TERM` is rejected before either path is tried.
pub fn resolve_amount_due(terms: &LoanTerms) -> LendingResult<Money> {
    check_term(terms.term)?;

    let from_rate = match (terms.payment_type, terms.interest_rate) {
        (PaymentType::InterestRate, Some(rate)) => {
            Some(try_installment_amount(terms.principal, rate, terms.term, terms.frequency))
        }
        _ => None,
    };

    match from_rate {
        Some(Ok(amount)) => Ok(amount),
        Some(Err(rate_err)) => match terms.fixed_payment {
            Some(fixed) if fixed > Decimal::ZERO => {
                debug!(loan_id = %terms.loan_id, reason = %rate_err, "rate not computable, using fixed payment");
                Ok(fixed)
            }
            _ => Err(rate_err),
        },
        None => match terms.fixed_payment {
            Some(fixed) if fixed > Decimal::ZERO => Ok(fixed),
            Some(fixed) => Err(LendingError::InvalidInput {
                field: "fixed_payment".into(),
                reason: format!("fixed payment {fixed} must be positive"),
            }),
            None => Err(LendingError::InvalidInput {
                field: match terms.payment_type {
                    PaymentType::Fixed => "fixed_payment".into(),
                    PaymentType::InterestRate => "interest_rate".into(),
                },
                reason: "not provided".into(),
            }),
        },
    }
}

fn try_generate(terms: &LoanTerms) -> LendingResult<Vec<ScheduleEntry>> {
    let amount_due = resolve_amount_due(terms)?;
    debug!(loan_id = %terms.loan_id, %amount_due, term = terms.term, "generating schedule");

    let mut entries = Vec::with_capacity(terms.term as usize);
    let mut due = calendar::anchor(terms.issue_date);

    for installment_number in 1..=terms.term {
        due = calendar::advance(due, terms.frequency)?;
        entries.push(ScheduleEntry {
            loan_id: terms.loan_id.clone(),
            installment_number,
            due_date: due.date_naive(),
            amount_due,
            amount_paid: Decimal::ZERO,
            status: InstallmentStatus::Pending,
        });
    }

    Ok(entries)
}

/// Generate the full installment schedule for a loan.
///
/// An empty result means the schedule could not be generated; the reason is
/// logged. Callers persisting a loan must treat it as a hard failure.
pub fn generate_schedule(terms: &LoanTerms) -> Vec<ScheduleEntry> {
    match try_generate(terms) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(loan_id = %terms.loan_id, reason = %e, "payment schedule not generated");
            Vec::new()
        }
    }
}

/// Totals for a schedule produced from `terms`.
pub fn summarize(terms: &LoanTerms, entries: &[ScheduleEntry]) -> LendingResult<ScheduleSummary> {
    let total_due = checked_total(entries.iter().map(|e| e.amount_due), "schedule total")?;
    let total_interest = total_due
        .checked_sub(terms.principal)
        .ok_or_else(|| overflow("schedule total interest"))?;

    let rounding_drift = match (terms.payment_type, terms.interest_rate) {
        (PaymentType::InterestRate, Some(rate)) if !entries.is_empty() => {
            let r = periodic_rate(rate, terms.frequency);
            annuity_payment(r, terms.term, terms.principal)
                .ok()
                .and_then(|exact| exact.checked_mul(Decimal::from(terms.term)))
                .and_then(|unrounded| total_due.checked_sub(unrounded))
        }
        _ => None,
    };

    Ok(ScheduleSummary {
        installments: entries.len() as u32,
        first_due_date: entries.first().map(|e| e.due_date),
        last_due_date: entries.last().map(|e| e.due_date),
        amount_per_installment: entries.first().map(|e| e.amount_due).unwrap_or_default(),
        total_due,
        total_interest,
        rounding_drift,
    })
}

/// Generate a schedule for persistence, failing loudly instead of returning
/// an empty list.
pub fn build_schedule(terms: &LoanTerms) -> LendingResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let entries = generate_schedule(terms);
    if entries.is_empty() {
        return Err(LendingError::ScheduleUnavailable {
            loan_id: terms.loan_id.clone(),
        });
    }

    if terms.payment_type == PaymentType::InterestRate {
        let rate_ok = terms.interest_rate.is_some_and(|rate| {
            try_installment_amount(terms.principal, rate, terms.term, terms.frequency).is_ok()
        });
        if !rate_ok {
            warnings.push("Interest rate not computable; fixed payment used as installment".into());
        }
    }
    if terms.payment_type == PaymentType::Fixed && terms.interest_rate.is_some() {
        warnings.push("Fixed-payment loan: interest_rate ignored".into());
    }

    let summary = summarize(terms, &entries)?;
    if summary.total_due < terms.principal {
        warnings.push(format!(
            "Total due {} is below principal {}",
            summary.total_due, terms.principal
        ));
    }

    let output = ScheduleOutput {
        loan_id: terms.loan_id.clone(),
        entries,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment installment schedule with end-of-month clamping",
        &serde_json::json!({
            "loan_id": terms.loan_id,
            "principal": terms.principal.to_string(),
            "payment_type": terms.payment_type,
            "frequency": terms.frequency,
            "periods_per_year": terms.frequency.periods_per_year(),
            "issue_date": terms.issue_date,
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

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rate_loan() -> LoanTerms {
        LoanTerms {
            loan_id: "L-100".into(),
            principal: dec!(1000),
            payment_type: PaymentType::InterestRate,
            interest_rate: Some(dec!(10)),
            fixed_payment: None,
            frequency: Frequency::Monthly,
            issue_date: d(2023, 10, 1),
            term: 12,
        }
    }

    fn fixed_loan() -> LoanTerms {
        LoanTerms {
            loan_id: "L-200".into(),
            principal: dec!(500),
            payment_type: PaymentType::Fixed,
            interest_rate: None,
            fixed_payment: Some(dec!(50)),
            frequency: Frequency::Weekly,
            issue_date: d(2023, 11, 15),
            term: 12,
        }
    }

    #[test]
    fn test_rate_loan_schedule() {
        let entries = generate_schedule(&rate_loan());
        assert_eq!(entries.len(), 12);
        assert_eq!(entries[0].due_date, d(2023, 11, 1));
        assert_eq!(entries[2].due_date, d(2024, 1, 1));
        assert_eq!(entries[11].due_date, d(2024, 10, 1));
        for e in &entries {
            assert_eq!(e.amount_due, dec!(87.92));
            assert_eq!(e.amount_paid, Decimal::ZERO);
            assert_eq!(e.status, InstallmentStatus::Pending);
            assert_eq!(e.loan_id, "L-100");
        }
    }

    #[test]
    fn test_fixed_loan_schedule() {
        let entries = generate_schedule(&fixed_loan());
        assert_eq!(entries.len(), 12);
        assert_eq!(entries[0].due_date, d(2023, 11, 22));
        assert_eq!(entries[1].due_date, d(2023, 11, 29));
        assert!(entries.iter().all(|e| e.amount_due == dec!(50)));
    }

    #[test]
    fn test_fixed_payment_is_not_rounded() {
        let mut terms = fixed_loan();
        terms.fixed_payment = Some(dec!(33.333));
        let entries = generate_schedule(&terms);
        assert_eq!(entries[0].amount_due, dec!(33.333));
    }

    #[test]
    fn test_clamped_date_carries_forward() {
        let mut terms = rate_loan();
        terms.issue_date = d(2024, 1, 31);
        terms.term = 3;
        let dates: Vec<NaiveDate> = generate_schedule(&terms).iter().map(|e| e.due_date).collect();
        assert_eq!(dates, vec![d(2024, 2, 29), d(2024, 3, 29), d(2024, 4, 29)]);
    }

    #[test]
    fn test_rate_failure_falls_back_to_fixed() {
        let mut terms = rate_loan();
        terms.interest_rate = Some(Decimal::ZERO);
        terms.fixed_payment = Some(dec!(90));
        let entries = generate_schedule(&terms);
        assert_eq!(entries.len(), 12);
        assert_eq!(entries[0].amount_due, dec!(90));
    }

    #[test]
    fn test_zero_rate_without_fallback_is_empty() {
        let mut terms = rate_loan();
        terms.interest_rate = Some(Decimal::ZERO);
        assert!(generate_schedule(&terms).is_empty());
    }

    #[test]
    fn test_missing_rate_uses_fixed_payment() {
        let mut terms = rate_loan();
        terms.interest_rate = None;
        terms.fixed_payment = Some(dec!(100));
        assert_eq!(generate_schedule(&terms)[0].amount_due, dec!(100));
    }

    #[test]
    fn test_non_positive_fixed_payment_is_empty() {
        let mut terms = fixed_loan();
        terms.fixed_payment = Some(Decimal::ZERO);
        assert!(generate_schedule(&terms).is_empty());
        terms.fixed_payment = None;
        assert!(generate_schedule(&terms).is_empty());
    }

    #[test]
    fn test_zero_term_is_empty() {
        let mut terms = fixed_loan();
        terms.term = 0;
        assert!(generate_schedule(&terms).is_empty());
    }

    #[test]
    fn test_date_overflow_is_empty() {
        let mut terms = fixed_loan();
        terms.issue_date = NaiveDate::MAX;
        assert!(generate_schedule(&terms).is_empty());
    }

    #[test]
    fn test_build_schedule_errors_when_unavailable() {
        let mut terms = rate_loan();
        terms.principal = Decimal::ZERO;
        let err = build_schedule(&terms).unwrap_err();
        assert!(matches!(err, LendingError::ScheduleUnavailable { .. }));
        assert!(err.to_string().contains("check interest rate and term"));
    }

    #[test]
    fn test_build_schedule_summary() {
        let out = build_schedule(&rate_loan()).unwrap();
        let s = &out.result.summary;
        assert_eq!(s.installments, 12);
        assert_eq!(s.total_due, dec!(1055.04));
        assert_eq!(s.total_interest, dec!(55.04));
        assert_eq!(s.first_due_date, Some(d(2023, 11, 1)));
        assert_eq!(s.last_due_date, Some(d(2024, 10, 1)));
        let drift = s.rounding_drift.unwrap();
        assert!(drift.abs() < dec!(0.06));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_build_schedule_warns_on_fallback() {
        let mut terms = rate_loan();
        terms.interest_rate = Some(dec!(-1));
        terms.fixed_payment = Some(dec!(95));
        let out = build_schedule(&terms).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_fixed_summary_has_no_drift() {
        let terms = fixed_loan();
        let entries = generate_schedule(&terms);
        let s = summarize(&terms, &entries).unwrap();
        assert_eq!(s.total_due, dec!(600));
        assert_eq!(s.total_interest, dec!(100));
        assert!(s.rounding_drift.is_none());
    }

    #[test]
    fn test_term_above_maximum_is_empty() {
        let mut terms = fixed_loan();
        terms.frequency = Frequency::Daily;
        terms.term = u32::MAX;
        assert!(generate_schedule(&terms).is_empty());
        assert!(matches!(
            resolve_amount_due(&terms),
            Err(LendingError::InvalidInput { ref field, .. }) if field == "term"
        ));
    }

    #[test]
    fn test_term_above_maximum_skips_fixed_fallback() {
        let mut terms = rate_loan();
        terms.term = crate::amortization::MAX_TERM + 1;
        terms.fixed_payment = Some(dec!(5));
        assert!(generate_schedule(&terms).is_empty());
    }

    #[test]
    fn test_maximum_term_generates() {
        let mut terms = fixed_loan();
        terms.frequency = Frequency::Daily;
        terms.term = crate::amortization::MAX_TERM;
        let entries = generate_schedule(&terms);
        assert_eq!(entries.len(), crate::amortization::MAX_TERM as usize);
    }

    #[test]
    fn test_total_overflow_is_error() {
        let mut terms = fixed_loan();
        terms.fixed_payment = Some(dec!(50000000000000000000000000000));
        terms.term = 2;
        assert_eq!(generate_schedule(&terms).len(), 2);
        assert!(matches!(build_schedule(&terms), Err(LendingError::NotComputable(_))));
    }
}
