use thiserror::Error;

#[derive(Debug, Error)]
pub enum LendingError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Not computable: {0}")]
    NotComputable(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Loan {loan_id}: could not calculate payment schedule — check interest rate and term")]
    ScheduleUnavailable { loan_id: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LendingError {
    fn from(e: serde_json::Error) -> Self {
        LendingError::SerializationError(e.to_string())
    }
}
