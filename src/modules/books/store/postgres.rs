use async_trait::async_trait;
use sqlx::PgPool;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookChanges, NewBook};

/// Postgres-backed book store.
///
/// Every mutation is a single statement, so a failed write changes nothing.
#[derive(Debug, Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    let unique_violation = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());

    if unique_violation {
        StoreError::DuplicateIsbn
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, book: NewBook) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO book (title, author, isbn)
            VALUES ($1, $2, $3)
            RETURNING id, title, author, isbn
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let books = sqlx::query_as::<_, Book>("SELECT id, title, author, isbn FROM book ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn get(&self, id: i32) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>("SELECT id, title, author, isbn FROM book WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { id })
    }

    async fn update(&self, id: i32, changes: BookChanges) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE book
            SET title  = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn   = COALESCE($4, isbn)
            WHERE id = $1
            RETURNING id, title, author, isbn
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.author)
        .bind(changes.isbn)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(StoreError::NotFound { id })
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("DELETE FROM book WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or(StoreError::NotFound { id })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
