use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::not_blank;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Missing fields default to empty so they are reported as blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub email: String,
}

/// A user marking a book as favorite; unique per (user, book)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
}

/// One entry of a user's reading history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub created_at: String,
}

/// Body naming the book a favorite or reading refers to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRef {
    pub book_id: i64,
}
