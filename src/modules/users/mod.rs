pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;
use sqlx::SqlitePool;

use crate::modules::books::repository::BookRepository;
use crate::utils;
use repository::UserRepository;
use routes::UsersState;

/// Users and the favorites and readings they own
pub struct UsersModule {
    state: UsersState,
}

impl UsersModule {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            state: UsersState {
                users: UserRepository::new(pool.clone()),
                books: BookRepository::new(pool),
            },
        }
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            target: "bookshelf.users",
            prefix = %utils::log_prefix(self.name()),
            environment = ?ctx.settings.environment,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id = json!({
            "name": "id", "in": "path", "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let not_found = json!({
            "description": "User not found",
            "content": { "application/json": { "schema": {
                "$ref": "#/components/schemas/ErrorResponse"
            } } }
        });
        let book_ref = json!({
            "required": true,
            "content": { "application/json": { "schema": {
                "$ref": "#/components/schemas/BookRef"
            } } }
        });
        let ok = |description: &str, schema: serde_json::Value| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": schema } }
            })
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List users",
                        "tags": ["Users"],
                        "responses": {
                            "200": ok("Users", json!({ "type": "array", "items": { "$ref": "#/components/schemas/User" } }))
                        }
                    },
                    "post": {
                        "summary": "Create a user",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": {
                                "$ref": "#/components/schemas/CreateUser"
                            } } }
                        },
                        "responses": {
                            "201": ok("Created user", json!({ "$ref": "#/components/schemas/User" })),
                            "409": {
                                "description": "Email already taken",
                                "content": { "application/json": { "schema": {
                                    "$ref": "#/components/schemas/ErrorResponse"
                                } } }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a user",
                        "tags": ["Users"],
                        "parameters": [id.clone()],
                        "responses": {
                            "200": ok("The user", json!({ "$ref": "#/components/schemas/User" })),
                            "404": not_found.clone()
                        }
                    },
                    "delete": {
                        "summary": "Delete a user with its favorites and readings",
                        "tags": ["Users"],
                        "parameters": [id.clone()],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": not_found.clone()
                        }
                    }
                },
                "/{id}/favorites": {
                    "get": {
                        "summary": "Books the user has favorited",
                        "tags": ["Users"],
                        "parameters": [id.clone()],
                        "responses": {
                            "200": ok("Favorite books", json!({ "type": "array", "items": { "$ref": "#/components/schemas/Book" } })),
                            "404": not_found.clone()
                        }
                    },
                    "post": {
                        "summary": "Mark a book as favorite",
                        "tags": ["Users"],
                        "parameters": [id.clone()],
                        "requestBody": book_ref.clone(),
                        "responses": {
                            "201": ok("Favorite", json!({ "$ref": "#/components/schemas/Favorite" })),
                            "404": not_found.clone(),
                            "409": { "description": "Already a favorite" }
                        }
                    }
                },
                "/{id}/favorites/{book_id}": {
                    "delete": {
                        "summary": "Remove a favorite",
                        "tags": ["Users"],
                        "parameters": [
                            id.clone(),
                            { "name": "book_id", "in": "path", "required": true, "schema": { "type": "integer", "format": "int64" } }
                        ],
                        "responses": {
                            "204": { "description": "Removed" },
                            "404": { "description": "Not a favorite" }
                        }
                    }
                },
                "/{id}/readings": {
                    "get": {
                        "summary": "Reading history, newest first",
                        "tags": ["Users"],
                        "parameters": [id.clone()],
                        "responses": {
                            "200": ok("Readings", json!({ "type": "array", "items": { "$ref": "#/components/schemas/Reading" } })),
                            "404": not_found.clone()
                        }
                    },
                    "post": {
                        "summary": "Record a reading",
                        "tags": ["Users"],
                        "parameters": [id],
                        "requestBody": book_ref,
                        "responses": {
                            "201": ok("Reading", json!({ "$ref": "#/components/schemas/Reading" })),
                            "404": not_found
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Users health check",
                        "tags": ["Users"],
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
                    "User": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" }
                        },
                        "required": ["id", "name", "email"]
                    },
                    "CreateUser": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" }
                        },
                        "required": ["name", "email"]
                    },
                    "BookRef": {
                        "type": "object",
                        "properties": { "book_id": { "type": "integer", "format": "int64" } },
                        "required": ["book_id"]
                    },
                    "Favorite": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "user_id": { "type": "integer", "format": "int64" },
                            "book_id": { "type": "integer", "format": "int64" }
                        },
                        "required": ["id", "user_id", "book_id"]
                    },
                    "Reading": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "user_id": { "type": "integer", "format": "int64" },
                            "book_id": { "type": "integer", "format": "int64" },
                            "created_at": { "type": "string" }
                        },
                        "required": ["id", "user_id", "book_id", "created_at"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "001_init",
                up: r#"
                    CREATE TABLE users (
                        id         INTEGER PRIMARY KEY AUTOINCREMENT,
                        name       TEXT NOT NULL CHECK (length(trim(name)) > 0),
                        email      TEXT NOT NULL CHECK (length(trim(email)) > 0),
                        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                    );
                    CREATE UNIQUE INDEX users_email_unique ON users (email);
                    "#,
            },
            Migration {
                id: "002_favorites_readings",
                up: r#"
                    CREATE TABLE favorites (
                        id         INTEGER PRIMARY KEY AUTOINCREMENT,
                        user_id    INTEGER NOT NULL REFERENCES users (id),
                        book_id    INTEGER NOT NULL REFERENCES books (id),
                        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                    );
                    CREATE UNIQUE INDEX favorites_user_book_unique ON favorites (user_id, book_id);
                    CREATE INDEX favorites_book ON favorites (book_id);
                    CREATE TABLE readings (
                        id         INTEGER PRIMARY KEY AUTOINCREMENT,
                        user_id    INTEGER NOT NULL REFERENCES users (id),
                        book_id    INTEGER NOT NULL REFERENCES books (id),
                        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                    );
                    CREATE INDEX readings_user ON readings (user_id);
                    CREATE INDEX readings_book ON readings (book_id);
                    "#,
            },
        ]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

pub fn create_module(pool: SqlitePool) -> Arc<dyn Module> {
    Arc::new(UsersModule::new(pool))
}
