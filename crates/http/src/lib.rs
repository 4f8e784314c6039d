//! HTTP server facade for bookshelf: error envelope, body extraction and the router.

use std::future::Future;

use anyhow::Context;
use axum::{routing::get, Router};
use bookshelf_kernel::settings::Settings;
use bookshelf_kernel::ModuleRegistry;

pub mod error;
pub mod extract;
pub mod router;

use router::RouterBuilder;

/// Build the main router with every module mounted and the global middleware stack applied
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    let mut builder = RouterBuilder::new()
        .route("/healthz", get(health_check))
        .with_static(&settings.server.static_dir);

    for module in registry.modules() {
        builder = builder.mount_module(module.as_ref());
    }

    builder
        .with_openapi(registry)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

/// Bind and serve `app` until `shutdown` resolves
pub async fn serve<F>(app: Router, settings: &Settings, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {address}"))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn health_check() -> &'static str {
    "ok"
}
