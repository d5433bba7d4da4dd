//! Fixtures for tests: an in-memory database with the real schema.

use bookshelf_kernel::settings::{DatabaseSettings, Settings};
use sqlx::SqlitePool;

use crate::modules::{
    self,
    books::{models::NewBook, repository::BookRepository},
    users::repository::UserRepository,
};

pub(crate) async fn pool() -> SqlitePool {
    let pool = bookshelf_db::connect(&DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
    .unwrap();
    let registry = modules::build_registry(pool.clone(), &Settings::default());
    bookshelf_db::migrate_registry(&pool, &registry).await.unwrap();
    pool
}

pub(crate) async fn user(pool: &SqlitePool, email: &str) -> i64 {
    UserRepository::new(pool.clone())
        .create("Reader", email)
        .await
        .unwrap()
        .id
}

/// Insert `count` books titled "Book 1".."Book N" and return their ids in order
pub(crate) async fn books(pool: &SqlitePool, count: usize) -> Vec<i64> {
    let repo = BookRepository::new(pool.clone());
    let mut ids = Vec::with_capacity(count);
    for n in 1..=count {
        let book = repo
            .insert(&NewBook {
                title: format!("Book {n}"),
                author: "Anonymous".to_string(),
                number_page: 100 + n as i64,
                picture: None,
            })
            .await
            .unwrap();
        ids.push(book.id);
    }
    ids
}

pub(crate) async fn favorite(pool: &SqlitePool, user_id: i64, book_id: i64) {
    UserRepository::new(pool.clone())
        .add_favorite(user_id, book_id)
        .await
        .unwrap();
}
