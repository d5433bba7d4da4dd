use sqlx::SqlitePool;

use super::models::{Book, NewBook};
use crate::error::StoreResult;

const BOOK_COLUMNS: &str = "id, title, author, number_page, picture";

/// Data access for the `books` table
#[derive(Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, book: &NewBook) -> StoreResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (title, author, number_page, picture) VALUES (?, ?, ?, ?)
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.number_page)
        .bind(&book.picture)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(book_id = created.id, title = %created.title, "book created");
        Ok(created)
    }

    pub async fn find(&self, id: i64) -> StoreResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    pub async fn list(&self) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Delete a book together with the favorites and readings pointing at it.
    /// Returns `false` when no such book exists.
    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM favorites WHERE book_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM readings WHERE book_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if deleted > 0 {
            tracing::info!(book_id = id, "book deleted");
        }
        Ok(deleted > 0)
    }

    /// Every book the user has no favorite for, as one anti-join.
    ///
    /// `NOT EXISTS` yields each book at most once even if the same favorite
    /// were stored twice.
    pub async fn unfavorited_by(&self, user_id: i64) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT b.id, b.title, b.author, b.number_page, b.picture
             FROM books b
             WHERE NOT EXISTS (
                 SELECT 1 FROM favorites f
                 WHERE f.book_id = b.id AND f.user_id = ?
             )
             ORDER BY b.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Books the user has favorited
    pub async fn favorited_by(&self, user_id: i64) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT b.id, b.title, b.author, b.number_page, b.picture
             FROM books b
             JOIN favorites f ON f.book_id = b.id
             WHERE f.user_id = ?
             ORDER BY b.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }
}
