//! Caller-side checks for deposit and withdrawal input.
//!
//! [`EarnClient`](crate::yaas::EarnClient) forwards amounts and currencies
//! untouched; front ends run these before calling it.

use std::fmt;

pub const CURRENCY_MAX_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

/// Positive and at most `max` (the balance or product limit the caller enforces).
pub fn validate_amount(amount: f64, max: f64) -> ValidationResult {
    if amount.is_nan() || amount <= 0.0 {
        return Err(ValidationError::new("amount", "must be greater than 0"));
    }

    if amount > max {
        return Err(ValidationError::new(
            "amount",
            format!("exceeds maximum of {}", max),
        ));
    }

    Ok(())
}

pub fn validate_currency(currency: &str) -> ValidationResult {
    let currency = currency.trim();
    if currency.is_empty() {
        return Err(ValidationError::new("currency", "must not be empty"));
    }

    if currency.len() > CURRENCY_MAX_LEN {
        return Err(ValidationError::new(
            "currency",
            format!("must be at most {} characters", CURRENCY_MAX_LEN),
        ));
    }

    if !currency.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(ValidationError::new(
            "currency",
            "must contain only letters and digits",
        ));
    }

    Ok(())
}

/// Quick-fill share of `max`, rounded to 6 decimals.
pub fn percentage_of(max: f64, percentage: f64) -> f64 {
    (max * percentage * 1_000_000.0).round() / 1_000_000.0
}
