//! Due-date arithmetic.
//!
//! Dates are anchored at 12:00 UTC before stepping so that no offset can
//! move a date-only value across midnight.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

use crate::error::LendingError;
use crate::types::Frequency;
use crate::LendingResult;

/// Hour of day every calendar date is pinned to.
pub const ANCHOR_HOUR: u32 = 12;

/// Pin a calendar date to the anchor time.
pub fn anchor(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_opt(ANCHOR_HOUR, 0, 0).unwrap_or_default())
        .and_utc()
}

/// Parse an issue date from an upstream record.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; for timestamps the calendar
/// date is taken as written in its own offset, never shifted to UTC.
pub fn parse_issue_date(raw: &str) -> LendingResult<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|e| LendingError::DateError(format!("cannot parse issue date '{raw}': {e}")))
}

/// Advance an anchored due date by exactly one period.
pub fn advance(current: DateTime<Utc>, frequency: Frequency) -> LendingResult<DateTime<Utc>> {
    let overflow = || LendingError::DateError(format!("{current} + one {frequency} period is out of range"));
    match frequency {
        Frequency::Daily => current.checked_add_days(Days::new(1)).ok_or_else(overflow),
        Frequency::Weekly => current.checked_add_days(Days::new(7)).ok_or_else(overflow),
        Frequency::Biweekly => current.checked_add_days(Days::new(15)).ok_or_else(overflow),
        Frequency::Monthly => {
            let date = next_month_clamped(current.date_naive()).ok_or_else(overflow)?;
            Ok(anchor(date))
        }
    }
}

/// Advance a calendar date by one period.
pub fn advance_due_date(date: NaiveDate, frequency: Frequency) -> LendingResult<NaiveDate> {
    advance(anchor(date), frequency).map(|dt| dt.date_naive())
}

/// Same day of the following month, clamped to that month's last day.
///
/// The naive step keeps the day number and lets it spill over (Jan 31 lands
/// on Mar 2 or 3). A spill is detected by the month not being
/// `(month % 12) + 1`, and is pulled back to the day before the first of the
/// spilled month.
fn next_month_clamped(date: NaiveDate) -> Option<NaiveDate> {
    let expected_month = date.month() % 12 + 1;
    let year = if date.month() == 12 { date.year() + 1 } else { date.year() };

    let first = NaiveDate::from_ymd_opt(year, expected_month, 1)?;
    let naive = first.checked_add_days(Days::new(u64::from(date.day0())))?;

    if naive.month() != expected_month {
        naive.with_day(1)?.pred_opt()
    } else {
        Some(naive)
    }
}
