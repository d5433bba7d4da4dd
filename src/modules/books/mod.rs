pub mod models;
pub mod repository;
pub mod routes;
pub mod suggestions;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{settings::CatalogSettings, InitCtx, Migration, Module};
use serde_json::json;
use sqlx::SqlitePool;

use crate::modules::users::repository::UserRepository;
use crate::utils;
use repository::BookRepository;
use routes::BooksState;
use suggestions::SuggestionEngine;
use validation::{BookRules, MAX_NUMBER_PAGE, MIN_NUMBER_PAGE};

/// Catalog of books and the suggestions computed over it
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(pool: SqlitePool, catalog: &CatalogSettings) -> Self {
        let books = BookRepository::new(pool.clone());
        let suggestions = SuggestionEngine::new(
            books.clone(),
            UserRepository::new(pool),
            catalog.suggestion_limit,
        );
        Self {
            state: BooksState {
                books,
                suggestions,
                rules: BookRules {
                    min_title_length: catalog.min_title_length,
                },
            },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            target: "bookshelf.books",
            prefix = %utils::log_prefix(self.name()),
            environment = ?ctx.settings.environment,
            min_title_length = ?ctx.settings.catalog.min_title_length,
            suggestion_limit = ?ctx.settings.catalog.suggestion_limit,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_list = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": {
                    "type": "array", "items": { "$ref": "#/components/schemas/Book" }
                } } }
            })
        };
        let error = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": {
                    "$ref": "#/components/schemas/ErrorResponse"
                } } }
            })
        };
        let user_id = json!({
            "name": "user_id", "in": "query", "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let book_id = json!({
            "name": "id", "in": "path", "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": { "200": book_list("Every book in the catalog") }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": {
                                "$ref": "#/components/schemas/CreateBook"
                            } } }
                        },
                        "responses": {
                            "201": {
                                "description": "Created book",
                                "content": { "application/json": { "schema": {
                                    "$ref": "#/components/schemas/Book"
                                } } }
                            },
                            "422": error("Validation error")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [book_id.clone()],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": { "application/json": { "schema": {
                                    "$ref": "#/components/schemas/Book"
                                } } }
                            },
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book with its favorites and readings",
                        "tags": ["Books"],
                        "parameters": [book_id],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": error("Book not found")
                        }
                    }
                },
                "/unfavorited": {
                    "get": {
                        "summary": "Books the user has not favorited",
                        "tags": ["Books"],
                        "parameters": [user_id.clone()],
                        "responses": {
                            "200": book_list("Unfavorited books ordered by id"),
                            "400": error("Missing or malformed user_id"),
                            "404": error("User not found"),
                            "503": error("Data store unavailable")
                        }
                    }
                },
                "/suggestions": {
                    "get": {
                        "summary": "Suggested books for the user",
                        "tags": ["Books"],
                        "parameters": [user_id],
                        "responses": {
                            "200": book_list("Suggestions, a prefix of the unfavorited books"),
                            "400": error("Missing or malformed user_id"),
                            "404": error("User not found"),
                            "503": error("Data store unavailable")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "number_page": {
                                "type": "integer",
                                "minimum": MIN_NUMBER_PAGE + 1,
                                "maximum": MAX_NUMBER_PAGE
                            },
                            "picture": {
                                "type": "string",
                                "nullable": true,
                                "description": "Reference to the cover image"
                            }
                        },
                        "required": ["id", "title", "author", "number_page"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "number_page": {
                                "description": "Integer or numeric string",
                                "oneOf": [{ "type": "integer" }, { "type": "string" }]
                            },
                            "picture": { "type": "string", "nullable": true }
                        },
                        "required": ["title", "author", "number_page"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE books (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    title       TEXT NOT NULL CHECK (length(trim(title)) > 0),
                    author      TEXT NOT NULL CHECK (length(trim(author)) > 0),
                    number_page INTEGER NOT NULL CHECK (number_page > 1 AND number_page <= 50000),
                    picture     TEXT,
                    created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                );
                "#,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

pub fn create_module(pool: SqlitePool, catalog: &CatalogSettings) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(pool, catalog))
}
