use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{validate_number_page, validate_title, BookRules};
use crate::utils::not_blank;

/// A catalog entry. Only ever built from validated input or a stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub number_page: i64,
    /// Reference to the cover image, if one was uploaded
    pub picture: Option<String>,
}

/// Raw request body for creating a book.
///
/// Fields are loose on purpose so that a missing title and a non-numeric
/// page count are reported as validation details rather than a JSON
/// rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(context = BookRules)]
pub struct CreateBook {
    #[serde(default)]
    #[validate(
        required(message = "can't be blank"),
        custom(function = "validate_title", use_context)
    )]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(required(message = "can't be blank"), custom(function = "not_blank"))]
    pub author: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "can't be blank"),
        custom(function = "validate_number_page")
    )]
    pub number_page: Option<serde_json::Value>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// A book that passed validation and may be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub number_page: i64,
    pub picture: Option<String>,
}

/// Query string naming the user a listing is computed for.
#[derive(Debug, Clone, Deserialize)]
pub struct ForUser {
    pub user_id: i64,
}
