use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use microlend_core::servicing::renewal::{self, RenewalInput};
use microlend_core::servicing::status::{self, ReviewInput};
use microlend_core::ScheduleEntry;

use crate::input;

/// Arguments for a schedule status review
#[derive(Args)]
pub struct ReviewArgs {
    /// Path to JSON input file: `{ "schedule": [...], "as_of": "YYYY-MM-DD" }`
    /// or a bare schedule array
    #[arg(long)]
    pub input: Option<String>,

    /// Evaluation date (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// Arguments for renewal sizing
#[derive(Args)]
pub struct RenewalArgs {
    /// Path to JSON input file: `{ "schedule": [...], "net_cash_to_client": "..." }`
    #[arg(long)]
    pub input: Option<String>,

    /// Net cash handed to the client (overrides the input file)
    #[arg(long)]
    pub net_cash: Option<Decimal>,
}

fn read_document(path: Option<&str>, what: &str) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_json_value(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(data)
    } else {
        Err(format!("--input <file.json> or stdin required for {what}").into())
    }
}

pub fn run_review(args: ReviewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = read_document(args.input.as_deref(), "schedule review")?;

    let review_input = if data.is_array() {
        let schedule: Vec<ScheduleEntry> = serde_json::from_value(data)?;
        ReviewInput {
            schedule,
            as_of: args
                .as_of
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        }
    } else {
        let mut parsed: ReviewInput = serde_json::from_value(data)?;
        if let Some(as_of) = args.as_of {
            parsed.as_of = as_of;
        }
        parsed
    };

    let result = status::review_schedule(&review_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_renewal(args: RenewalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut data = read_document(args.input.as_deref(), "renewal sizing")?;
    if let (Some(net_cash), Some(obj)) = (args.net_cash, data.as_object_mut()) {
        obj.insert("net_cash_to_client".into(), Value::String(net_cash.to_string()));
    }

    let renewal_input: RenewalInput = serde_json::from_value(data)?;
    let result = renewal::calculate_renewal(&renewal_input)?;
    Ok(serde_json::to_value(result)?)
}
