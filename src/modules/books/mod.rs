pub mod models;
pub mod routes;
pub mod store;
pub mod views;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, Migration, Module};
use serde_json::json;

use store::BookStore;
use views::{IndexTemplate, Render};

/// Shared handler state
#[derive(Clone)]
pub struct BooksState {
    pub store: BookStore,
    pub view: Arc<dyn Render>,
}

/// The book catalog, served at the site root
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(store: BookStore, view: Arc<dyn Render>) -> Self {
        Self {
            state: BooksState { store, view },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn mount_path(&self) -> String {
        "/".to_string()
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
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let ack = json!({
            "description": "Acknowledgment",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Ack" }
                }
            }
        });
        let rejected = json!({
            "description": "Missing parameter or undecodable body",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let write_body = |schema: &str| {
            json!({
                "required": true,
                "content": {
                    "application/x-www-form-urlencoded": {
                        "schema": { "$ref": format!("#/components/schemas/{schema}") }
                    },
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{schema}") }
                    }
                }
            })
        };
        let text = json!({ "type": "string" });
        let id = json!({ "oneOf": [{ "type": "integer" }, { "type": "string" }] });
        let field_names = ["btitle", "bauthor", "bperson", "bpub_date", "bread", "bcomment"];

        let mut book_fields = serde_json::Map::new();
        for name in field_names {
            book_fields.insert(name.to_string(), text.clone());
        }
        let mut update_fields = book_fields.clone();
        update_fields.insert("bid".to_string(), id.clone());

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Render the catalog page",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "HTML page", "content": { "text/html": {} } }
                        }
                    },
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "requestBody": write_body("BookFields"),
                        "responses": { "200": ack, "400": rejected }
                    },
                    "put": {
                        "summary": "Replace every field of a book",
                        "tags": ["Books"],
                        "requestBody": write_body("UpdateBook"),
                        "responses": { "200": ack, "400": rejected }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "requestBody": write_body("DeleteBook"),
                        "responses": { "200": ack, "400": rejected }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookFields": {
                        "type": "object",
                        "properties": book_fields,
                        "required": field_names
                    },
                    "UpdateBook": {
                        "type": "object",
                        "properties": update_fields,
                        "required": ["bid", "btitle", "bauthor", "bperson", "bpub_date", "bread", "bcomment"]
                    },
                    "DeleteBook": {
                        "type": "object",
                        "properties": { "id": id },
                        "required": ["id"]
                    },
                    "Ack": {
                        "type": "object",
                        "properties": { "data": text },
                        "required": ["data"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![store::CREATE_TABLE]
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

/// Build the books module against `db`, loading the page template from the configured
/// template directory
pub fn create_module(settings: &Settings, db: Database) -> anyhow::Result<Arc<dyn Module>> {
    let view = IndexTemplate::load(&settings.server.template_dir)?;
    Ok(Arc::new(BooksModule::new(BookStore::new(db), Arc::new(view))))
}
