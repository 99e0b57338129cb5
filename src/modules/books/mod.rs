pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};

use routes::SharedStore;

/// Schema for the book table. Idempotent so it can run on every startup.
pub const BOOKS_MIGRATIONS: &[Migration] = &[Migration {
    id: "001_create_book",
    up: r#"
        CREATE TABLE IF NOT EXISTS book (
            id     SERIAL       PRIMARY KEY,
            title  VARCHAR(200) NOT NULL,
            author VARCHAR(100) NOT NULL,
            isbn   VARCHAR(20)  NOT NULL UNIQUE
        );
        "#,
}];

/// Books module: CRUD over the book table, served under `/books`
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        BOOKS_MIGRATIONS.to_vec()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.store.close().await;
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module over `store`
pub fn create_module(store: SharedStore) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn json_body(schema: &str) -> serde_json::Value {
    serde_json::json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = serde_json::json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int32" }
    }]);

    serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "All books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": json_body("CreateBook"),
                    "responses": {
                        "201": book_response("Created book"),
                        "400": error_response("Missing field or duplicate ISBN")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": id_param.clone(),
                    "responses": {
                        "200": book_response("The book"),
                        "404": error_response("Unknown id")
                    }
                },
                "put": {
                    "summary": "Update some fields of a book",
                    "tags": ["Books"],
                    "parameters": id_param.clone(),
                    "requestBody": json_body("UpdateBook"),
                    "responses": {
                        "200": book_response("Updated book"),
                        "400": error_response("Invalid field or duplicate ISBN"),
                        "404": error_response("Unknown id")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": id_param.clone(),
                    "responses": {
                        "200": {
                            "description": "Deleted",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "message": { "type": "string" } },
                                        "required": ["message"]
                                    }
                                }
                            }
                        },
                        "404": error_response("Unknown id")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Books store health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "Store reachable",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        },
                        "500": error_response("Store unreachable")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int32" },
                        "title": { "type": "string", "maxLength": models::TITLE_MAX_LEN },
                        "author": { "type": "string", "maxLength": models::AUTHOR_MAX_LEN },
                        "isbn": { "type": "string", "maxLength": models::ISBN_MAX_LEN }
                    },
                    "required": ["id", "title", "author", "isbn"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "maxLength": models::TITLE_MAX_LEN },
                        "author": { "type": "string", "maxLength": models::AUTHOR_MAX_LEN },
                        "isbn": { "type": "string", "maxLength": models::ISBN_MAX_LEN }
                    },
                    "required": ["title", "author", "isbn"]
                },
                "UpdateBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "maxLength": models::TITLE_MAX_LEN },
                        "author": { "type": "string", "maxLength": models::AUTHOR_MAX_LEN },
                        "isbn": { "type": "string", "maxLength": models::ISBN_MAX_LEN }
                    }
                }
            }
        }
    })
}
