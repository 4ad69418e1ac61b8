//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Storage concerns belong to the persistence layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. empty title, malformed slug).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write collided with existing state (unique slug, exhausted code).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

/// Reject blank or over-long text fields.
pub fn ensure_text(field: &str, value: &str, max_chars: usize) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    let len = value.chars().count();
    if len > max_chars {
        return Err(DomainError::validation(format!(
            "{field} is {len} characters long (max {max_chars})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_text_rejects_blank_values() {
        let err = ensure_text("title", "   ", 50).unwrap_err();
        assert_eq!(err, DomainError::Validation("title cannot be empty".to_string()));
    }

    #[test]
    fn ensure_text_counts_characters_not_bytes() {
        // 10 multi-byte characters fit a 10-character column.
        assert!(ensure_text("title", "کتابکتابکت", 10).is_ok());
        assert!(ensure_text("title", "کتابکتابکتا", 10).is_err());
    }

    #[test]
    fn not_found_message_names_the_record() {
        let err = DomainError::not_found("product 42");
        assert_eq!(err.to_string(), "not found: product 42");
    }
}
