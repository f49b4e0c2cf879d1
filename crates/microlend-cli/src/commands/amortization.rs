use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use microlend_core::amortization::breakdown;
use microlend_core::amortization::calendar::parse_issue_date;
use microlend_core::amortization::installment::{self, InstallmentPreviewInput};
use microlend_core::amortization::schedule;
use microlend_core::{Frequency, LoanTerms, PaymentType};

use crate::input;

/// Arguments for an installment preview
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct InstallmentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (10 = 10%)
    #[arg(long, alias = "interest-rate")]
    pub rate: Option<Decimal>,

    /// Number of installments
    #[arg(long)]
    pub term: Option<i64>,

    /// DAILY, WEEKLY, BIWEEKLY or MONTHLY
    #[arg(long)]
    pub frequency: Option<Frequency>,
}

/// Loan terms for schedule and breakdown commands
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanTermsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan identifier copied onto every installment
    #[arg(long, default_value = "preview")]
    pub loan_id: String,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// FIXED or INTEREST_RATE
    #[arg(long, default_value = "INTEREST_RATE")]
    pub payment_type: PaymentType,

    /// Annual interest rate in percent (10 = 10%)
    #[arg(long, alias = "interest-rate")]
    pub rate: Option<Decimal>,

    /// Fixed periodic payment
    #[arg(long)]
    pub fixed_payment: Option<Decimal>,

    /// DAILY, WEEKLY, BIWEEKLY or MONTHLY
    #[arg(long)]
    pub frequency: Option<Frequency>,

    /// Issue date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub issue_date: Option<String>,

    /// Number of installments
    #[arg(long)]
    pub term: Option<u32>,
}

impl LoanTermsArgs {
    fn into_terms(self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_json(path);
        }
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(serde_json::from_value(data)?);
        }

        let issue_date = self
            .issue_date
            .as_deref()
            .ok_or("--issue-date is required (or provide --input)")?;

        Ok(LoanTerms {
            loan_id: self.loan_id,
            principal: self
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            payment_type: self.payment_type,
            interest_rate: self.rate,
            fixed_payment: self.fixed_payment,
            frequency: self
                .frequency
                .ok_or("--frequency is required (or provide --input)")?,
            issue_date: parse_issue_date(issue_date)?,
            term: self.term.ok_or("--term is required (or provide --input)")?,
        })
    }
}

pub fn run_installment(args: InstallmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let preview_input: InstallmentPreviewInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        InstallmentPreviewInput {
            principal: args.principal,
            interest_rate: args.rate,
            term: args.term,
            frequency: args.frequency,
        }
    };

    // Not computable is a preview state, not a command failure.
    let result = installment::calculate_installment(&preview_input);
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: LoanTermsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.into_terms()?;
    let result = schedule::build_schedule(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_breakdown(args: LoanTermsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.into_terms()?;
    let result = breakdown::build_breakdown(&terms)?;
    Ok(serde_json::to_value(result)?)
}
