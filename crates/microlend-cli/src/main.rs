mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{InstallmentArgs, LoanTermsArgs};
use commands::servicing::{RenewalArgs, ReviewArgs};

/// Loan installment previews and payment schedules
#[derive(Parser)]
#[command(
    name = "mlend",
    version,
    about = "Loan installment previews and payment schedules",
    long_about = "A CLI over the micro-lending amortization engine. Computes installment \
                  previews, full payment schedules with month-end clamping, principal/interest \
                  breakdowns, status reviews and renewal sizing with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview the periodic installment for an interest-rate loan
    Installment(InstallmentArgs),
    /// Generate the full installment schedule for a loan
    Schedule(LoanTermsArgs),
    /// Principal/interest split per installment
    Breakdown(LoanTermsArgs),
    /// Refresh installment statuses and total what is still owed
    Review(ReviewArgs),
    /// Size the principal of a renewal loan
    Renewal(RenewalArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Installment(args) => commands::amortization::run_installment(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::Breakdown(args) => commands::amortization::run_breakdown(args),
        Commands::Review(args) => commands::servicing::run_review(args),
        Commands::Renewal(args) => commands::servicing::run_renewal(args),
        Commands::Version => {
            println!("mlend {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
