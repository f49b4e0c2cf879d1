pub mod amortization;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "servicing")]
pub mod servicing;

pub use error::LendingError;
pub use types::*;

/// Standard result type for all lending operations
pub type LendingResult<T> = Result<T, LendingError>;
