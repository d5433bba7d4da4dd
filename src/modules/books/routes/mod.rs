use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use bookshelf_http::error::AppError;
use bookshelf_http::extract::{ApiJson, ApiPath, ApiQuery};

use super::models::{Book, CreateBook, ForUser};
use super::repository::BookRepository;
use super::suggestions::SuggestionEngine;
use super::validation::BookRules;

/// Shared state for the books handlers
#[derive(Clone)]
pub struct BooksState {
    pub books: BookRepository,
    pub suggestions: SuggestionEngine,
    pub rules: BookRules,
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route("/unfavorited", get(unfavorited_books))
        .route("/suggestions", get(suggested_books))
        .route("/{id}", get(get_book).delete(delete_book))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.books.list().await?))
}

async fn create_book(
    State(state): State<BooksState>,
    ApiJson(payload): ApiJson<CreateBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let new_book = state
        .rules
        .validate(&payload)
        .map_err(|errors| AppError::invalid(&errors, "book is invalid"))?;

    let book = state.books.insert(&new_book).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(
    State(state): State<BooksState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Book>, AppError> {
    state
        .books
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("book {id} does not exist")))
}

async fn delete_book(
    State(state): State<BooksState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    if state.books.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("book {id} does not exist")))
    }
}

async fn unfavorited_books(
    State(state): State<BooksState>,
    ApiQuery(query): ApiQuery<ForUser>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.suggestions.unfavorited_books(query.user_id).await?))
}

async fn suggested_books(
    State(state): State<BooksState>,
    ApiQuery(query): ApiQuery<ForUser>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(
        state
            .suggestions
            .suggest_unfavorited_books(query.user_id)
            .await?,
    ))
}
