use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use validator::Validate;

use bookshelf_http::error::AppError;
use bookshelf_http::extract::{ApiJson, ApiPath};

use super::models::{BookRef, CreateUser, Favorite, Reading, User};
use super::repository::UserRepository;
use crate::error::StoreError;
use crate::modules::books::models::Book;
use crate::modules::books::repository::BookRepository;

#[derive(Clone)]
pub struct UsersState {
    pub users: UserRepository,
    pub books: BookRepository,
}

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/health", get(health_check))
        .route("/{id}", get(get_user).delete(delete_user))
        .route("/{id}/favorites", get(list_favorites).post(add_favorite))
        .route("/{id}/favorites/{book_id}", delete(remove_favorite))
        .route("/{id}/readings", get(list_readings).post(add_reading))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "users module is healthy"
}

async fn list_users(State(state): State<UsersState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list().await?))
}

async fn create_user(
    State(state): State<UsersState>,
    ApiJson(payload): ApiJson<CreateUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    payload
        .validate()
        .map_err(|errors| AppError::invalid(&errors, "user is invalid"))?;

    let user = state
        .users
        .create(payload.name.trim(), payload.email.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<UsersState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .find(id)
        .await?
        .ok_or(StoreError::UnknownUser(id))?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<UsersState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    if state.users.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StoreError::UnknownUser(id).into())
    }
}

async fn list_favorites(
    State(state): State<UsersState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Book>>, AppError> {
    if state.users.find(id).await?.is_none() {
        return Err(StoreError::UnknownUser(id).into());
    }
    Ok(Json(state.books.favorited_by(id).await?))
}

async fn add_favorite(
    State(state): State<UsersState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<BookRef>,
) -> Result<(StatusCode, Json<Favorite>), AppError> {
    let favorite = state.users.add_favorite(id, payload.book_id).await?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

async fn remove_favorite(
    State(state): State<UsersState>,
    ApiPath((id, book_id)): ApiPath<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    if state.users.remove_favorite(id, book_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!(
            "user {id} has not favorited book {book_id}"
        )))
    }
}

async fn list_readings(
    State(state): State<UsersState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Reading>>, AppError> {
    if state.users.find(id).await?.is_none() {
        return Err(StoreError::UnknownUser(id).into());
    }
    Ok(Json(state.users.readings(id).await?))
}

async fn add_reading(
    State(state): State<UsersState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<BookRef>,
) -> Result<(StatusCode, Json<Reading>), AppError> {
    let reading = state.users.add_reading(id, payload.book_id).await?;
    Ok((StatusCode::CREATED, Json(reading)))
}
