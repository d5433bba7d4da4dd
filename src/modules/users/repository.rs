use sqlx::{SqliteConnection, SqlitePool};

use super::models::{Favorite, Reading, User};
use crate::error::{StoreError, StoreResult};

/// Data access for users and the favorites and readings they own
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, email: &str) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email) VALUES (?, ?) RETURNING id, name, email",
        )
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Duplicate(_) => StoreError::Duplicate(format!("user with email {email}")),
            other => other,
        })?;

        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    pub async fn find(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Delete a user and, in the same transaction, every favorite and
    /// reading it owns. Returns `false` when no such user exists.
    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let favorites = sqlx::query("DELETE FROM favorites WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let readings = sqlx::query("DELETE FROM readings WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        tx.commit().await?;

        tracing::info!(user_id = id, favorites, readings, "user deleted");
        Ok(true)
    }

    /// Reference check and insert run in one transaction.
    pub async fn add_favorite(&self, user_id: i64, book_id: i64) -> StoreResult<Favorite> {
        let mut tx = self.pool.begin().await?;
        ensure_refs(&mut tx, user_id, book_id).await?;

        let favorite = sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorites (user_id, book_id) VALUES (?, ?) RETURNING id, user_id, book_id",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Duplicate(_) => {
                StoreError::Duplicate(format!("favorite of book {book_id} for user {user_id}"))
            }
            other => other,
        })?;
        tx.commit().await?;

        tracing::info!(user_id, book_id, "favorite added");
        Ok(favorite)
    }

    /// Returns `false` when the user had not favorited the book.
    pub async fn remove_favorite(&self, user_id: i64, book_id: i64) -> StoreResult<bool> {
        let removed = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND book_id = ?")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed > 0)
    }

    pub async fn add_reading(&self, user_id: i64, book_id: i64) -> StoreResult<Reading> {
        let mut tx = self.pool.begin().await?;
        ensure_refs(&mut tx, user_id, book_id).await?;

        let reading = sqlx::query_as::<_, Reading>(
            "INSERT INTO readings (user_id, book_id) VALUES (?, ?)
             RETURNING id, user_id, book_id, created_at",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(user_id, book_id, "reading recorded");
        Ok(reading)
    }

    /// Most recent first
    pub async fn readings(&self, user_id: i64) -> StoreResult<Vec<Reading>> {
        let readings = sqlx::query_as::<_, Reading>(
            "SELECT id, user_id, book_id, created_at FROM readings
             WHERE user_id = ? ORDER BY id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(readings)
    }
}

/// Turn missing rows into typed errors before the foreign keys would.
async fn ensure_refs(conn: &mut SqliteConnection, user_id: i64, book_id: i64) -> StoreResult<()> {
    let (user, book): (i64, i64) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?), EXISTS(SELECT 1 FROM books WHERE id = ?)",
    )
    .bind(user_id)
    .bind(book_id)
    .fetch_one(&mut *conn)
    .await?;

    match (user, book) {
        (0, _) => Err(StoreError::UnknownUser(user_id)),
        (_, 0) => Err(StoreError::UnknownBook(book_id)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::repository::BookRepository;
    use crate::testing;

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let pool = testing::pool().await;
        let users = UserRepository::new(pool);

        users.create("Ada", "ada@example.com").await.unwrap();
        assert!(matches!(
            users.create("Ada again", "ada@example.com").await,
            Err(StoreError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn favorites_are_unique_per_user_and_book() {
        let pool = testing::pool().await;
        let users = UserRepository::new(pool.clone());
        let user = testing::user(&pool, "ada@example.com").await;
        let book = testing::books(&pool, 1).await[0];

        users.add_favorite(user, book).await.unwrap();
        assert!(matches!(
            users.add_favorite(user, book).await,
            Err(StoreError::Duplicate(_))
        ));

        assert!(users.remove_favorite(user, book).await.unwrap());
        assert!(!users.remove_favorite(user, book).await.unwrap());
    }

    #[tokio::test]
    async fn favorite_requires_existing_user_and_book() {
        let pool = testing::pool().await;
        let users = UserRepository::new(pool.clone());
        let user = testing::user(&pool, "ada@example.com").await;
        let book = testing::books(&pool, 1).await[0];

        assert!(matches!(
            users.add_favorite(user + 100, book).await,
            Err(StoreError::UnknownUser(_))
        ));
        assert!(matches!(
            users.add_favorite(user, book + 100).await,
            Err(StoreError::UnknownBook(_))
        ));
    }

    #[tokio::test]
    async fn reading_of_a_deleted_book_is_rejected_and_rolled_back() {
        let pool = testing::pool().await;
        let users = UserRepository::new(pool.clone());
        let user = testing::user(&pool, "ada@example.com").await;
        let book = testing::books(&pool, 1).await[0];

        assert!(BookRepository::new(pool.clone()).delete(book).await.unwrap());
        assert!(matches!(
            users.add_reading(user, book).await,
            Err(StoreError::UnknownBook(id)) if id == book
        ));
        assert!(users.readings(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_to_favorites_and_readings() {
        let pool = testing::pool().await;
        let users = UserRepository::new(pool.clone());
        let user = testing::user(&pool, "ada@example.com").await;
        let other = testing::user(&pool, "grace@example.com").await;
        let books = testing::books(&pool, 3).await;

        users.add_favorite(user, books[0]).await.unwrap();
        users.add_favorite(other, books[0]).await.unwrap();
        users.add_reading(user, books[1]).await.unwrap();
        users.add_reading(user, books[1]).await.unwrap();

        assert!(users.delete(user).await.unwrap());
        assert!(!users.delete(user).await.unwrap());
        assert_eq!(users.find(user).await.unwrap(), None);

        let (favorites,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE user_id = ?")
            .bind(user)
            .fetch_one(&pool)
            .await
            .unwrap();
        let (readings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM readings WHERE user_id = ?")
            .bind(user)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!((favorites, readings), (0, 0));

        let kept = BookRepository::new(pool.clone()).favorited_by(other).await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(BookRepository::new(pool).list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn readings_are_listed_newest_first() {
        let pool = testing::pool().await;
        let users = UserRepository::new(pool.clone());
        let user = testing::user(&pool, "ada@example.com").await;
        let books = testing::books(&pool, 2).await;

        users.add_reading(user, books[0]).await.unwrap();
        users.add_reading(user, books[1]).await.unwrap();

        let read: Vec<_> = users
            .readings(user)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.book_id)
            .collect();
        assert_eq!(read, vec![books[1], books[0]]);
    }
}
