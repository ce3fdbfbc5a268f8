//! Field validation shared by contract and milestone entities

use thiserror::Error;

/// Minimum length of titles and owner names
pub const MIN_NAME_LEN: usize = 3;

/// A field failed validation
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Trimmed value must have at least [`MIN_NAME_LEN`] characters
pub(crate) fn require_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::new(
            field,
            format!("must be at least {} characters", MIN_NAME_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

/// Money values are finite and non-negative
pub(crate) fn require_amount(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(value)
}
