//! Installment lifecycle after a schedule has been persisted.
//!
//! Status is derived from the payment already recorded on each entry and the
//! date it is evaluated on; nothing here records payments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value::overflow;
use crate::types::*;
use crate::LendingResult;

/// Status an entry should carry on `as_of`.
pub fn derive_status(entry: &ScheduleEntry, as_of: NaiveDate) -> InstallmentStatus {
    if entry.amount_paid >= entry.amount_due {
        InstallmentStatus::Paid
    } else if entry.due_date < as_of {
        InstallmentStatus::Overdue
    } else {
        InstallmentStatus::Pending
    }
}

/// Re-derive every entry's status. Returns how many entries changed.
pub fn refresh_statuses(entries: &mut [ScheduleEntry], as_of: NaiveDate) -> usize {
    let mut changed = 0;
    for entry in entries.iter_mut() {
        let status = derive_status(entry, as_of);
        if status != entry.status {
            entry.status = status;
            changed += 1;
        }
    }
    changed
}

/// Amount still owed across the schedule. Overpayments do not offset other
/// installments.
pub fn outstanding_balance(entries: &[ScheduleEntry]) -> LendingResult<Money> {
    unpaid_total(entries.iter(), "outstanding balance")
}

fn unpaid_total<'a, I>(mut entries: I, context: &str) -> LendingResult<Money>
where
    I: Iterator<Item = &'a ScheduleEntry>,
{
    entries
        .try_fold(Decimal::ZERO, |acc, e| {
            let owed = e.amount_due.checked_sub(e.amount_paid)?.max(Decimal::ZERO);
            acc.checked_add(owed)
        })
        .ok_or_else(|| overflow(context))
}

/// Financial terms may only be regenerated while nothing has been paid.
pub fn can_regenerate(entries: &[ScheduleEntry]) -> bool {
    entries.iter().all(|e| e.amount_paid.is_zero())
}

/// A persisted schedule evaluated on a given date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewInput {
    pub schedule: Vec<ScheduleEntry>,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutput {
    pub entries: Vec<ScheduleEntry>,
    pub outstanding_balance: Money,
    pub paid: u32,
    pub pending: u32,
    pub overdue: u32,
    pub overdue_amount: Money,
    /// Whether the edit flow may still regenerate the schedule.
    pub can_regenerate: bool,
}

/// Refresh statuses and total what is still owed.
pub fn review_schedule(input: &ReviewInput) -> LendingResult<ComputationOutput<ReviewOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut entries = input.schedule.clone();
    let changed = refresh_statuses(&mut entries, input.as_of);
    if changed > 0 {
        warnings.push(format!("{changed} installment status(es) updated"));
    }

    let count = |status: InstallmentStatus| entries.iter().filter(|e| e.status == status).count() as u32;
    let overdue_amount = unpaid_total(
        entries.iter().filter(|e| e.status == InstallmentStatus::Overdue),
        "overdue amount",
    )?;

    let output = ReviewOutput {
        outstanding_balance: outstanding_balance(&entries)?,
        paid: count(InstallmentStatus::Paid),
        pending: count(InstallmentStatus::Pending),
        overdue: count(InstallmentStatus::Overdue),
        overdue_amount,
        can_regenerate: can_regenerate(&entries),
        entries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Installment status review",
        &serde_json::json!({ "as_of": input.as_of, "installments": input.schedule.len() }),
        warnings,
        elapsed,
        output,
    ))
}
