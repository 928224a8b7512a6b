//! BookIT application library
//!
//! Application modules (books CRUD, URL normalizer) plus the bootstrap used
//! by both the `bookit-app` binary and `bookit-cli`.

pub mod modules;
pub mod utils;

use anyhow::Context;
use axum::Router;
use bookit_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

/// Re-export commonly used types
pub use modules::*;

/// Registry with every application module wired to `db`
pub fn build_registry(db: &SqlitePool) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, db);
    registry
}

/// Full HTTP application over an already migrated pool
pub fn build_app(db: &SqlitePool, settings: &Settings) -> Router {
    bookit_http::build_router(&build_registry(db), settings)
}

/// Create the database if needed and apply pending migrations.
///
/// Returns the number of migrations applied.
pub async fn setup(settings: &Settings) -> anyhow::Result<usize> {
    let db = bookit_db::setup(&settings.database).await?;
    let registry = build_registry(&db);

    let applied = bookit_db::run_migrations(&db, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;

    tracing::info!(applied, database = %settings.database.path, "database setup complete");
    db.close().await;
    Ok(applied)
}

/// Serve the application until Ctrl-C.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let db = bookit_db::connect(&settings.database).await?;
    let registry = build_registry(&db);

    bookit_db::run_migrations(&db, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };
    registry.init_modules(&ctx).await?;

    bookit_http::start_server(&registry, &settings, shutdown_signal()).await?;

    registry.stop_modules().await?;
    db.close().await;
    tracing::info!("bookit-app stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
