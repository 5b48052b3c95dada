//! Domain types, request/response payloads, and field validation.

mod member;
mod pagination;
mod project;
mod role;
mod task;
mod user;

pub use member::*;
pub use pagination::*;
pub use project::*;
pub use role::*;
pub use task::*;
pub use user::*;

use thiserror::Error;

/// A request payload failed field validation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Trim and length-check a required name-like field.
///
/// Limits count characters, not bytes, so multibyte text is not penalized.
pub(crate) fn validate_required_text(
    value: &str,
    field: &str,
    max_len: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max_len {
        return Err(ValidationError::new(format!(
            "{field} must be {max_len} characters or less"
        )));
    }
    Ok(trimmed.to_string())
}

/// Length-check an optional free-text field. Counts characters, not bytes.
pub(crate) fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), ValidationError> {
    if let Some(v) = value {
        if v.chars().count() > max_len {
            return Err(ValidationError::new(format!(
                "{field} must be {max_len} characters or less"
            )));
        }
    }
    Ok(())
}
