pub mod models;
pub mod routes;
pub mod store;
pub mod validation;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_kernel::{InitCtx, Module, Schema};

use crate::utils;
use store::BookStore;

/// Books catalogue: validated CRUD over the `books` table
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
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
            prefix = %utils::log_prefix(self.name()),
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

    fn schemas(&self) -> Vec<Schema> {
        vec![Schema {
            id: "001_books",
            ddl: store::BOOKS_TABLE,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_response(description: &str, schema: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let isbn_param = json!([{
        "name": "isbn",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    }]);
    let book_body = |schema: &str| {
        json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": format!("#/components/schemas/{schema}") }
                }
            }
        })
    };

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books ordered by title",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("All books", "BookList")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": book_body("Book"),
                    "responses": {
                        "201": json_response("Created book", "BookEnvelope"),
                        "400": error_response("Validation failed"),
                        "409": error_response("ISBN already exists")
                    }
                }
            },
            "/{isbn}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": isbn_param.clone(),
                    "responses": {
                        "200": json_response("Book", "BookEnvelope"),
                        "404": error_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace every field of a book except its ISBN",
                    "tags": ["Books"],
                    "parameters": isbn_param.clone(),
                    "requestBody": book_body("BookUpdate"),
                    "responses": {
                        "200": json_response("Updated book", "BookEnvelope"),
                        "400": error_response("Validation failed"),
                        "404": error_response("Book not found")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": isbn_param,
                    "responses": {
                        "200": json_response("Deletion confirmation", "Message"),
                        "404": error_response("Book not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "isbn": { "type": "string", "minLength": 1 },
                        "amazon_url": { "type": "string", "format": "uri" },
                        "author": { "type": "string", "minLength": 1 },
                        "language": { "type": "string", "minLength": 1 },
                        "pages": { "type": "integer", "minimum": 1 },
                        "publisher": { "type": "string", "minLength": 1 },
                        "title": { "type": "string", "minLength": 1 },
                        "year": { "type": "integer", "minimum": 1000, "maximum": 9999 }
                    },
                    "required": [
                        "isbn", "amazon_url", "author", "language",
                        "pages", "publisher", "title", "year"
                    ]
                },
                "BookUpdate": {
                    "type": "object",
                    "properties": {
                        "amazon_url": { "type": "string", "format": "uri" },
                        "author": { "type": "string", "minLength": 1 },
                        "language": { "type": "string", "minLength": 1 },
                        "pages": { "type": "integer", "minimum": 1 },
                        "publisher": { "type": "string", "minLength": 1 },
                        "title": { "type": "string", "minLength": 1 },
                        "year": { "type": "integer", "minimum": 1000, "maximum": 9999 }
                    },
                    "required": [
                        "amazon_url", "author", "language",
                        "pages", "publisher", "title", "year"
                    ]
                },
                "BookEnvelope": {
                    "type": "object",
                    "properties": {
                        "book": { "$ref": "#/components/schemas/Book" }
                    },
                    "required": ["book"]
                },
                "BookList": {
                    "type": "object",
                    "properties": {
                        "books": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Book" }
                        }
                    },
                    "required": ["books"]
                },
                "Message": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" }
                    },
                    "required": ["message"]
                }
            }
        }
    })
}

/// Create the books module over the given database pool
pub fn create_module(pool: sqlx::SqlitePool) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(BookStore::new(pool)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_covers_every_route() {
        let spec = openapi_fragment();

        for (path, method) in [
            ("/", "get"),
            ("/", "post"),
            ("/{isbn}", "get"),
            ("/{isbn}", "put"),
            ("/{isbn}", "delete"),
        ] {
            assert!(
                spec["paths"][path][method].is_object(),
                "missing {method} {path}"
            );
        }
    }

    #[test]
    fn openapi_required_fields_match_validation_rules() {
        let spec = openapi_fragment();
        let required: Vec<&str> = spec["components"]["schemas"]["Book"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|field| field.as_str().unwrap())
            .collect();
        let rules: Vec<&str> = validation::BOOK_RULES.iter().map(|rule| rule.name).collect();

        assert_eq!(required, rules);
    }
}
