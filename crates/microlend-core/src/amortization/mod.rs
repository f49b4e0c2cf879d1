pub mod breakdown;
pub mod calendar;
pub mod installment;
pub mod schedule;

pub use calendar::{advance_due_date, parse_issue_date};
pub use installment::{check_term, installment_amount, preview_installment, try_installment_amount, MAX_TERM};
pub use schedule::{build_schedule, generate_schedule, summarize};
