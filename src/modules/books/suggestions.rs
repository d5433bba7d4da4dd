//! Books a user has not favorited yet, and the suggestion list built on them.

use super::models::Book;
use super::repository::BookRepository;
use crate::error::{StoreError, StoreResult};
use crate::modules::users::repository::UserRepository;

/// Read-only query engine behind the "suggested books" feature.
#[derive(Clone)]
pub struct SuggestionEngine {
    books: BookRepository,
    users: UserRepository,
    limit: Option<usize>,
}

impl SuggestionEngine {
    /// `limit` caps `suggest_unfavorited_books`; `None` leaves it equal to
    /// `unfavorited_books`.
    pub fn new(books: BookRepository, users: UserRepository, limit: Option<usize>) -> Self {
        Self {
            books,
            users,
            limit,
        }
    }

    /// The catalog minus the user's favorites, ordered by book id.
    pub async fn unfavorited_books(&self, user_id: i64) -> StoreResult<Vec<Book>> {
        if self.users.find(user_id).await?.is_none() {
            return Err(StoreError::UnknownUser(user_id));
        }
        let books = self.books.unfavorited_by(user_id).await?;
        tracing::debug!(user_id, count = books.len(), "computed unfavorited books");
        Ok(books)
    }

    /// Suggestions for the user: a prefix of `unfavorited_books`.
    pub async fn suggest_unfavorited_books(&self, user_id: i64) -> StoreResult<Vec<Book>> {
        let mut books = self.unfavorited_books(user_id).await?;
        if let Some(limit) = self.limit {
            books.truncate(limit);
        }
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use sqlx::SqlitePool;
    use std::collections::BTreeSet;

    fn engine(pool: &SqlitePool, limit: Option<usize>) -> SuggestionEngine {
        SuggestionEngine::new(
            BookRepository::new(pool.clone()),
            UserRepository::new(pool.clone()),
            limit,
        )
    }

    fn ids(books: &[Book]) -> BTreeSet<i64> {
        books.iter().map(|b| b.id).collect()
    }

    #[tokio::test]
    async fn half_favorited_catalog_suggests_the_other_half() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "ada@example.com").await;
        let books = testing::books(&pool, 10).await;
        for &book in &books[..5] {
            testing::favorite(&pool, user, book).await;
        }
        let engine = engine(&pool, None);

        let expected: BTreeSet<i64> = books[5..].iter().copied().collect();
        let unfavorited = engine.unfavorited_books(user).await.unwrap();
        let suggested = engine.suggest_unfavorited_books(user).await.unwrap();

        assert_eq!(ids(&unfavorited), expected);
        assert_eq!(ids(&suggested), expected);
    }

    #[tokio::test]
    async fn user_without_favorites_gets_whole_catalog() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "grace@example.com").await;
        let books = testing::books(&pool, 4).await;

        let unfavorited = engine(&pool, None).unfavorited_books(user).await.unwrap();
        assert_eq!(ids(&unfavorited), books.into_iter().collect());
    }

    #[tokio::test]
    async fn everything_favorited_gives_nothing() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "alan@example.com").await;
        for book in testing::books(&pool, 3).await {
            testing::favorite(&pool, user, book).await;
        }

        let engine = engine(&pool, None);
        assert!(engine.unfavorited_books(user).await.unwrap().is_empty());
        assert!(engine.suggest_unfavorited_books(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn partitions_catalog_with_favorites_and_ignores_other_users() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "edsger@example.com").await;
        let other = testing::user(&pool, "barbara@example.com").await;
        let books = testing::books(&pool, 6).await;
        testing::favorite(&pool, user, books[0]).await;
        testing::favorite(&pool, user, books[3]).await;
        testing::favorite(&pool, other, books[1]).await;

        let engine = engine(&pool, None);
        let unfavorited = ids(&engine.unfavorited_books(user).await.unwrap());
        let favorited = ids(&BookRepository::new(pool.clone()).favorited_by(user).await.unwrap());

        assert!(unfavorited.is_disjoint(&favorited));
        let union: BTreeSet<i64> = unfavorited.union(&favorited).copied().collect();
        assert_eq!(union, books.iter().copied().collect());
        assert!(unfavorited.contains(&books[1]));
    }

    #[tokio::test]
    async fn repeated_calls_agree() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "donald@example.com").await;
        let books = testing::books(&pool, 5).await;
        testing::favorite(&pool, user, books[2]).await;

        let engine = engine(&pool, None);
        let first = engine.unfavorited_books(user).await.unwrap();
        let second = engine.unfavorited_books(user).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn limit_keeps_a_prefix_of_unfavorited_books() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "barbara@example.com").await;
        testing::books(&pool, 8).await;

        let engine = engine(&pool, Some(3));
        let unfavorited = engine.unfavorited_books(user).await.unwrap();
        let suggested = engine.suggest_unfavorited_books(user).await.unwrap();

        assert_eq!(unfavorited.len(), 8);
        assert_eq!(suggested, unfavorited[..3].to_vec());
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let pool = testing::pool().await;
        testing::books(&pool, 2).await;
        let engine = engine(&pool, None);

        assert!(matches!(
            engine.unfavorited_books(999).await,
            Err(StoreError::UnknownUser(999))
        ));
        assert!(matches!(
            engine.suggest_unfavorited_books(999).await,
            Err(StoreError::UnknownUser(999))
        ));
    }

    #[tokio::test]
    async fn closed_store_is_unavailable() {
        let pool = testing::pool().await;
        let user = testing::user(&pool, "ada@example.com").await;
        let engine = engine(&pool, None);

        pool.close().await;

        assert!(matches!(
            engine.unfavorited_books(user).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            engine.suggest_unfavorited_books(user).await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
