//! Structured error types for chinook-core.
//!
//! Uses `thiserror` so library callers can match on the failure kind.
//! The binary (chinook-cli) wraps these in `anyhow` for reporting.

use thiserror::Error;

/// Main error type for customer store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The relational engine rejected the operation (constraint
    /// violation, lost connection, timeout). Never retried.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A write addressed a row that does not exist
    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Required field empty or missing; nothing was written
    #[error("missing required field '{field}'")]
    Validation { field: &'static str },

    /// A stored value could not be mapped into its entity type
    #[error("invalid value '{value}' in {context}")]
    Decode { value: String, context: String },

    /// Configuration error
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for chinook-core operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create a not-found error
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create a validation error for a required field
    pub fn validation(field: &'static str) -> Self {
        Self::Validation { field }
    }

    /// Create a decode error with context
    pub fn decode(value: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Decode {
            value: value.into(),
            context: context.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::not_found("customer", 42);
        assert_eq!(err.to_string(), "not found: customer '42'");
        assert!(err.is_not_found());

        let err = StoreError::validation("email");
        assert_eq!(err.to_string(), "missing required field 'email'");
        assert!(!err.is_not_found());

        let err = StoreError::decode("abc", "Invoice.Total");
        assert!(err.to_string().contains("Invoice.Total"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Sqlx(_)));
    }
}
