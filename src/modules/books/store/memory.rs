use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookChanges, NewBook};

/// In-memory book store for development and testing.
///
/// Mirrors the Postgres store: sequential ids starting at 1, unique isbn,
/// and no partial writes. Data is lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: i32,
    books: BTreeMap<i32, Book>,
}

impl Inner {
    fn isbn_taken(&self, isbn: &str, except: Option<i32>) -> bool {
        self.books
            .values()
            .any(|b| b.isbn == isbn && Some(b.id) != except)
    }
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn create(&self, book: NewBook) -> Result<Book, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.isbn_taken(&book.isbn, None) {
            return Err(StoreError::DuplicateIsbn);
        }

        inner.last_id += 1;
        let book = Book {
            id: inner.last_id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
        };
        inner.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.books.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Book, StoreError> {
        let inner = self.inner.read().await;
        inner
            .books
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn update(&self, id: i32, changes: BookChanges) -> Result<Book, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.books.contains_key(&id) {
            return Err(StoreError::NotFound { id });
        }
        if let Some(isbn) = &changes.isbn {
            if inner.isbn_taken(isbn, Some(id)) {
                return Err(StoreError::DuplicateIsbn);
            }
        }

        let book = inner
            .books
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;
        changes.apply_to(book);
        Ok(book.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(isbn: &str) -> NewBook {
        NewBook {
            title: "Dune".into(),
            author: "Herbert".into(),
            isbn: isbn.into(),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_not_reused() {
        let store = InMemoryBookStore::new();
        let first = store.create(new_book("1")).await.unwrap();
        let second = store.create(new_book("2")).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        store.delete(second.id).await.unwrap();
        let third = store.create(new_book("3")).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn list_is_in_id_order() {
        let store = InMemoryBookStore::new();
        assert!(store.list().await.unwrap().is_empty());

        for isbn in ["c", "a", "b"] {
            store.create(new_book(isbn)).await.unwrap();
        }
        let isbns: Vec<_> = store.list().await.unwrap().into_iter().map(|b| b.isbn).collect();
        assert_eq!(isbns, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn update_to_own_isbn_is_allowed() {
        let store = InMemoryBookStore::new();
        let book = store.create(new_book("1")).await.unwrap();

        let updated = store
            .update(
                book.id,
                BookChanges {
                    isbn: Some("1".into()),
                    ..BookChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated, book);
    }

    #[tokio::test]
    async fn conflicting_update_leaves_record_unchanged() {
        let store = InMemoryBookStore::new();
        store.create(new_book("1")).await.unwrap();
        let target = store.create(new_book("2")).await.unwrap();

        let err = store
            .update(
                target.id,
                BookChanges {
                    title: Some("Changed".into()),
                    isbn: Some("1".into()),
                    ..BookChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIsbn));
        assert_eq!(store.get(target.id).await.unwrap(), target);
    }

    #[tokio::test]
    async fn missing_ids_report_not_found() {
        let store = InMemoryBookStore::new();
        assert!(matches!(
            store.get(7).await.unwrap_err(),
            StoreError::NotFound { id: 7 }
        ));
        assert!(matches!(
            store.update(7, BookChanges::default()).await.unwrap_err(),
            StoreError::NotFound { id: 7 }
        ));
        assert!(matches!(
            store.delete(7).await.unwrap_err(),
            StoreError::NotFound { id: 7 }
        ));
    }
}
