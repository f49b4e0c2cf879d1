use rust_decimal::prelude::RoundingStrategy;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LendingError;
use crate::types::{Frequency, Money, Rate};
use crate::LendingResult;

/// Decimal places carried by every persisted amount.
pub const MONEY_DP: u32 = 2;

/// Round a money amount to cents, half away from zero.
///
/// Every rounded amount in the crate goes through here so that previews and
/// persisted schedules can never disagree by a cent.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an annual percentage (10.0 = 10%) into the per-period decimal rate.
pub fn periodic_rate(annual_rate_percent: Decimal, frequency: Frequency) -> Rate {
    annual_rate_percent / dec!(100) / Decimal::from(frequency.periods_per_year())
}

/// Level payment that fully amortizes `present_value` over `nper` periods.
///
/// `rate * pv / (1 - (1 + rate)^-nper)`, unrounded.
pub fn annuity_payment(rate: Rate, nper: u32, present_value: Money) -> LendingResult<Money> {
    if nper == 0 {
        return Err(LendingError::InvalidInput {
            field: "term".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate <= Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate must be positive".into(),
        });
    }

    let factor = Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powi(i64::from(nper)))
        .ok_or_else(|| overflow(&format!("(1 + {rate})^{nper}")))?;
    if factor.is_zero() {
        return Err(LendingError::DivisionByZero {
            context: "annuity discount factor".into(),
        });
    }

    let discount = Decimal::ONE
        .checked_div(factor)
        .ok_or_else(|| overflow("annuity discount factor"))?;
    let denominator = Decimal::ONE - discount;
    if denominator.is_zero() {
        return Err(LendingError::DivisionByZero {
            context: "annuity denominator".into(),
        });
    }

    rate.checked_mul(present_value)
        .and_then(|numerator| numerator.checked_div(denominator))
        .ok_or_else(|| overflow(&format!("payment on {present_value} at {rate} per period")))
}

/// Arithmetic that leaves the `Decimal` range is reported as not computable.
pub(crate) fn overflow(context: &str) -> LendingError {
    LendingError::NotComputable(format!("{context} overflows the decimal range"))
}

/// Sum of money amounts, `NotComputable` on overflow.
pub fn checked_total<I>(amounts: I, context: &str) -> LendingResult<Money>
where
    I: IntoIterator<Item = Money>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| overflow(context))
}
