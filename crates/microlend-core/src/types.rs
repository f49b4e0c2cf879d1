use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LendingError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Annual rates supplied by the
/// loan forms are percentages and are converted at the calculator boundary.
pub type Rate = Decimal;

/// Payment cadence of a loan.
///
/// Drives both the periodic-rate divisor and the due-date step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    /// Semi-monthly ("quincenal"): 15-day step, 24 periods per year.
    Biweekly,
    Monthly,
}

impl Frequency {
    /// Number of periods per year used to derive the periodic rate.
    pub fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Daily => 365,
            Frequency::Weekly => 52,
            Frequency::Biweekly => 24,
            Frequency::Monthly => 12,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Biweekly => "BIWEEKLY",
            Frequency::Monthly => "MONTHLY",
        };
        f.write_str(s)
    }
}

impl FromStr for Frequency {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "BIWEEKLY" => Ok(Frequency::Biweekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            other => Err(LendingError::InvalidInput {
                field: "frequency".into(),
                reason: format!("unknown frequency '{other}'"),
            }),
        }
    }
}

/// How the installment amount of a loan is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    /// Flat amount agreed in advance.
    Fixed,
    /// Amortizing installment derived from an annual interest rate.
    InterestRate,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentType::Fixed => f.write_str("FIXED"),
            PaymentType::InterestRate => f.write_str("INTEREST_RATE"),
        }
    }
}

impl FromStr for PaymentType {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "FIXED" => Ok(PaymentType::Fixed),
            "INTEREST_RATE" => Ok(PaymentType::InterestRate),
            other => Err(LendingError::InvalidInput {
                field: "payment_type".into(),
                reason: format!("unknown payment type '{other}'"),
            }),
        }
    }
}

/// Lifecycle state of a single installment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

/// The engine's projection of a loan record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub loan_id: String,
    pub principal: Money,
    pub payment_type: PaymentType,
    /// Annual rate as a percentage (10.0 = 10%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_payment: Option<Money>,
    pub frequency: Frequency,
    pub issue_date: NaiveDate,
    pub term: u32,
}

/// One scheduled payment obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub loan_id: String,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub amount_due: Money,
    pub amount_paid: Money,
    pub status: InstallmentStatus,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_wire_names() {
        let f: Frequency = serde_json::from_str("\"BIWEEKLY\"").unwrap();
        assert_eq!(f, Frequency::Biweekly);
        assert_eq!(serde_json::to_string(&Frequency::Monthly).unwrap(), "\"MONTHLY\"");
    }

    #[test]
    fn test_payment_type_wire_names() {
        let p: PaymentType = serde_json::from_str("\"INTEREST_RATE\"").unwrap();
        assert_eq!(p, PaymentType::InterestRate);
        assert_eq!(serde_json::to_string(&PaymentType::Fixed).unwrap(), "\"FIXED\"");
    }

    #[test]
    fn test_frequency_from_str_case_insensitive() {
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_payment_type_from_str_accepts_dashes() {
        assert_eq!(
            "interest-rate".parse::<PaymentType>().unwrap(),
            PaymentType::InterestRate
        );
    }

    #[test]
    fn test_periods_per_year() {
        assert_eq!(Frequency::Daily.periods_per_year(), 365);
        assert_eq!(Frequency::Weekly.periods_per_year(), 52);
        assert_eq!(Frequency::Biweekly.periods_per_year(), 24);
        assert_eq!(Frequency::Monthly.periods_per_year(), 12);
    }

    #[test]
    fn test_status_defaults_to_pending() {
        assert_eq!(InstallmentStatus::default(), InstallmentStatus::Pending);
    }
}
