pub mod models;
pub mod repository;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookit_kernel::{InitCtx, Migration, Module};
use sqlx::SqlitePool;

use repository::SqliteBookRepository;
use routes::SharedRepository;

const CREATE_BOOKS: &str = r#"
    CREATE TABLE IF NOT EXISTS Books (
        book_id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        num_pages INTEGER,
        pub_date DATE NOT NULL
    );
"#;

/// Books module: CRUD over the `Books` table
pub struct BooksModule {
    repository: SharedRepository,
}

impl BooksModule {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
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
            database = %ctx.settings.database.path,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repository.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: CREATE_BOOKS,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrMessage" }
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

fn openapi() -> serde_json::Value {
    let id_param = serde_json::json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "Book ID",
        "schema": { "type": "integer", "format": "int64" }
    });
    let book_body = serde_json::json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/NewBook" }
            }
        }
    });

    serde_json::json!({
        "paths": {
            "/books": {
                "get": {
                    "summary": "Get all books",
                    "tags": ["books"],
                    "parameters": [
                        { "name": "limit", "in": "query", "required": false, "schema": { "type": "integer", "minimum": 0 } },
                        { "name": "offset", "in": "query", "required": false, "schema": { "type": "integer", "minimum": 0 } }
                    ],
                    "responses": {
                        "200": {
                            "description": "List of books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "400": error_response("Invalid paging parameters"),
                        "404": error_response("No books found"),
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Add a new book",
                    "tags": ["books"],
                    "requestBody": book_body,
                    "responses": {
                        "201": book_response("Created book with its assigned id"),
                        "400": error_response("Missing field, invalid date or malformed body"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/books/{id}": {
                "get": {
                    "summary": "Get a single book",
                    "tags": ["books"],
                    "parameters": [id_param],
                    "responses": {
                        "200": book_response("The book"),
                        "400": error_response("Invalid book id"),
                        "404": error_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Update a book",
                    "tags": ["books"],
                    "parameters": [id_param],
                    "requestBody": book_body,
                    "responses": {
                        "200": book_response("Updated book"),
                        "400": error_response("Invalid id, missing field or invalid date"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["books"],
                    "parameters": [id_param],
                    "responses": {
                        "200": { "description": "Deleted" },
                        "400": error_response("Invalid book id"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "book_id": { "type": "integer", "format": "int64" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "num_pages": { "type": "integer", "minimum": 0 },
                        "pub_date": { "type": "string", "format": "date" }
                    },
                    "required": ["book_id", "title", "author", "pub_date"]
                },
                "NewBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "num_pages": { "type": "integer", "minimum": 0 },
                        "pub_date": { "type": "string", "format": "date" }
                    },
                    "required": ["title", "author", "pub_date"]
                }
            }
        }
    })
}

/// Create the books module backed by the given pool
pub fn create_module(db: SqlitePool) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(Arc::new(SqliteBookRepository::new(db))))
}
