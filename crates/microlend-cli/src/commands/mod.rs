pub mod amortization;
pub mod servicing;
