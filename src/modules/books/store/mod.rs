//! Book persistence.
//!
//! Uniqueness of `isbn` is the store's job: implementations must reject a
//! colliding insert or update atomically and leave existing rows untouched.

mod memory;
mod postgres;

pub use memory::InMemoryBookStore;
pub use postgres::PgBookStore;

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Book, BookChanges, NewBook};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book {id} not found")]
    NotFound { id: i32 },

    #[error("isbn already exists")]
    DuplicateIsbn,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Async CRUD over the book table.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a book and return it with its assigned id.
    async fn create(&self, book: NewBook) -> Result<Book, StoreError>;

    /// All books in id order.
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    async fn get(&self, id: i32) -> Result<Book, StoreError>;

    /// Apply only the supplied fields and return the updated record.
    async fn update(&self, id: i32, changes: BookChanges) -> Result<Book, StoreError>;

    async fn delete(&self, id: i32) -> Result<(), StoreError>;

    /// Cheap round-trip used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release backing resources during shutdown.
    async fn close(&self) {}
}
