//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;

use bookshelf_http::error::AppError;

use super::models::{Book, CreateBook, DeleteResponse, UpdateBook, ValidationError};
use super::store::{BookStore, StoreError};

pub type SharedStore = Arc<dyn BookStore>;

pub const DUPLICATE_ISBN_MESSAGE: &str = "ISBN already exists";
pub const NOT_FOUND_MESSAGE: &str = "Book not found";
pub const DELETED_MESSAGE: &str = "Book deleted successfully";

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(
            vec![json!({ "field": err.field(), "error": err.to_string() })],
            err.to_string(),
        )
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::not_found(NOT_FOUND_MESSAGE),
            StoreError::DuplicateIsbn => AppError::conflict(
                vec![json!({ "field": "isbn", "error": "unique" })],
                DUPLICATE_ISBN_MESSAGE,
            ),
            StoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

/// Router for `/`, `/{id}` and `/health`, relative to the module mount path.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(store)
}

/// POST /books
async fn create_book(
    State(store): State<SharedStore>,
    payload: Result<Json<CreateBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(payload) = payload?;
    let book = store.create(payload.validate()?).await?;

    tracing::info!(book_id = book.id, isbn = %book.isbn, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /books
async fn list_books(State(store): State<SharedStore>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(store.list().await?))
}

/// GET /books/{id}
async fn get_book(
    State(store): State<SharedStore>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    Ok(Json(store.get(id).await?))
}

/// PUT /books/{id}
async fn update_book(
    State(store): State<SharedStore>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateBook>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let changes = payload.validate()?;

    let book = if changes.is_empty() {
        store.get(id).await?
    } else {
        store.update(id, changes).await?
    };

    tracing::info!(book_id = book.id, "book updated");
    Ok(Json(book))
}

/// DELETE /books/{id}
async fn delete_book(
    State(store): State<SharedStore>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let Path(id) = id?;
    store.delete(id).await?;

    tracing::info!(book_id = id, "book deleted");
    Ok(Json(DeleteResponse {
        message: DELETED_MESSAGE.to_string(),
    }))
}

/// GET /books/health
async fn health_check(State(store): State<SharedStore>) -> Result<&'static str, AppError> {
    store.ping().await?;
    Ok("books module is healthy")
}
