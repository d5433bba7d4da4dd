//! Errors raised by the catalog store and how they surface over HTTP.

use bookshelf_http::error::AppError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The user reference does not resolve to a persisted user.
    #[error("user {0} does not exist")]
    UnknownUser(i64),

    #[error("book {0} does not exist")]
    UnknownBook(i64),

    #[error("{0} already exists")]
    Duplicate(String),

    /// The store could not be reached (pool exhausted or closed, I/O failure).
    #[error("data store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UnknownUser(_) | StoreError::UnknownBook(_) => {
                AppError::not_found(e.to_string())
            }
            StoreError::Duplicate(_) => AppError::conflict(e.to_string()),
            StoreError::Unavailable(_) => AppError::unavailable(e.to_string()),
            StoreError::Database(db) => AppError::Internal(db.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn pool_failures_are_unavailable() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }

    #[test]
    fn unknown_user_maps_to_not_found() {
        let response = AppError::from(StoreError::UnknownUser(42)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::from(StoreError::Unavailable("timeout".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
