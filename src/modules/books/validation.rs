//! Write-time rules every catalog book satisfies.

use std::borrow::Cow;

use serde_json::Value;
use validator::{ValidateArgs, ValidationError, ValidationErrors};

use super::models::{CreateBook, NewBook};
use crate::utils::{self, BLANK};

/// Page counts must satisfy `MIN_NUMBER_PAGE < number_page <= MAX_NUMBER_PAGE`.
pub const MIN_NUMBER_PAGE: i64 = 1;
pub const MAX_NUMBER_PAGE: i64 = 50_000;

/// Rules that depend on configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookRules {
    pub min_title_length: Option<usize>,
}

impl BookRules {
    /// Check every field and collect all violations, not just the first.
    pub fn validate(&self, input: &CreateBook) -> Result<NewBook, ValidationErrors> {
        input.validate_with_args(self)?;

        // Presence and bounds were checked above.
        Ok(NewBook {
            title: input.title.clone().unwrap_or_default(),
            author: input.author.clone().unwrap_or_default(),
            number_page: input
                .number_page
                .as_ref()
                .and_then(|pages| parse_number_page(pages).ok())
                .unwrap_or_default(),
            picture: input
                .picture
                .as_deref()
                .filter(|picture| !picture.trim().is_empty())
                .map(str::to_string),
        })
    }
}

/// Length is measured on the title as given, surrounding spaces included.
pub(crate) fn validate_title(title: &str, rules: &BookRules) -> Result<(), ValidationError> {
    utils::not_blank(title)?;
    match rules.min_title_length {
        Some(min) if title.chars().count() < min => Err(ValidationError::new("too_short")
            .with_message(Cow::Owned(format!("is too short (minimum is {min} characters)")))),
        _ => Ok(()),
    }
}

pub(crate) fn validate_number_page(value: &Value) -> Result<(), ValidationError> {
    parse_number_page(value).map(|_| ())
}

/// Accepts integers and numeric strings such as `"300"`.
fn parse_number_page(value: &Value) -> Result<i64, ValidationError> {
    let pages = match value {
        Value::Null => return Err(error("blank", BLANK)),
        Value::Number(n) => match n.as_i64() {
            Some(pages) => pages,
            None if n.is_f64() => return Err(error("not_an_integer", "must be an integer")),
            // Larger than i64::MAX.
            None => i64::MAX,
        },
        Value::String(s) if s.trim().is_empty() => return Err(error("blank", BLANK)),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(pages) => pages,
            Err(_) if s.trim().parse::<f64>().is_ok_and(f64::is_finite) => {
                return Err(error("not_an_integer", "must be an integer"))
            }
            Err(_) => return Err(error("not_a_number", "is not a number")),
        },
        _ => return Err(error("not_a_number", "is not a number")),
    };

    if pages <= MIN_NUMBER_PAGE {
        Err(error("range", format!("must be greater than {MIN_NUMBER_PAGE}")))
    } else if pages > MAX_NUMBER_PAGE {
        Err(error(
            "range",
            format!("must be less than or equal to {MAX_NUMBER_PAGE}"),
        ))
    } else {
        Ok(pages)
    }
}

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}
