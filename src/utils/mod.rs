//! Project-specific utilities live here.

use std::borrow::Cow;

use validator::ValidationError;

/// Message for a missing or whitespace-only field.
pub const BLANK: &str = "can't be blank";

/// Formats a shared log prefix for module logs.
pub fn log_prefix(module: &str) -> String {
    format!("bookshelf::{module}")
}

/// `validator` check rejecting empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed(BLANK)));
    }
    Ok(())
}
