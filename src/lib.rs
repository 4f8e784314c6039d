//! Book catalog service.
//!
//! Wires settings, the storage gateway, the module registry and the HTTP server together.

pub mod modules;

use anyhow::Context;
use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// Open the store and build the registry with every module registered and its schema applied.
pub async fn bootstrap(settings: &Settings) -> anyhow::Result<(Database, ModuleRegistry)> {
    let db = Database::connect(&settings.database)
        .await
        .with_context(|| format!("failed to open book store at {}", settings.database.url))?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings, &db)?;

    db.apply_migrations(&registry.collect_migrations())
        .await
        .context("failed to apply schema")?;

    Ok((db, registry))
}

/// Run the service until Ctrl-C, then stop modules and drain the pool.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookshelf bootstrap starting"
    );

    let (db, registry) = bootstrap(&settings).await?;
    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let app = bookshelf_http::build_router(&registry, &settings);
    tracing::info!("bookshelf bootstrap complete");

    let served = bookshelf_http::serve(app, &settings, shutdown_signal()).await;

    registry.stop_all().await?;
    db.close().await;
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
