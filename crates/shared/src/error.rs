use thiserror::Error;

/// Reasons a recipe is refused before it is sent for scoring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a number, got '{raw}'")]
    NotANumber { field: &'static str, raw: String },
    #[error("{field} must be greater than zero, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("brew_time must be a whole number of seconds, got '{raw}'")]
    InvalidTime { raw: String },
    #[error("unknown brew method '{raw}'")]
    UnknownMethod { raw: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::NonPositive { field, .. } => field,
            ValidationError::InvalidTime { .. } => "brew_time",
            ValidationError::UnknownMethod { .. } => "method",
        }
    }
}
