//! SQLite connection pool factory and migration runner for BookIT.

use std::path::Path;

use anyhow::{anyhow, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use bookit_kernel::settings::DatabaseSettings;
use bookit_kernel::Migration;

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        module TEXT NOT NULL,
        id TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    );
"#;

/// Open a pool on an existing database file.
///
/// The file is never created here; `setup` must have run first.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    if !Path::new(&settings.path).exists() {
        return Err(anyhow!(
            "database '{}' does not exist yet, run `bookit-cli setup` first",
            settings.path
        ));
    }

    open(settings, false).await
}

/// Open a pool on the configured database file, creating it when missing.
pub async fn setup(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    open(settings, true).await
}

async fn open(settings: &DatabaseSettings, create_if_missing: bool) -> anyhow::Result<SqlitePool> {
    tracing::info!(
        target: "bookit-db",
        path = %settings.path,
        create_if_missing,
        "opening sqlite database"
    );

    let options = SqliteConnectOptions::new()
        .filename(&settings.path)
        .create_if_missing(create_if_missing)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database '{}'", settings.path))
}

/// Single-connection in-memory pool. The connection is never recycled, so
/// the database lives as long as the pool.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("failed to open in-memory database")
}

/// Apply each `(module, migration)` pair once, recording it in `_migrations`.
///
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .context("failed to create migrations table")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already_applied: Option<(String,)> =
            sqlx::query_as("SELECT id FROM _migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await
                .context("failed to read migrations table")?;

        if already_applied.is_some() {
            tracing::debug!(target: "bookit-db", module = %module, id = migration.id, "migration already applied");
            continue;
        }

        tracing::info!(target: "bookit-db", module = %module, id = migration.id, "applying migration");

        sqlx::raw_sql(migration.up)
            .execute(pool)
            .await
            .with_context(|| format!("migration '{}/{}' failed", module, migration.id))?;

        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(pool)
            .await
            .with_context(|| format!("failed to record migration '{}/{}'", module, migration.id))?;

        applied += 1;
    }

    Ok(applied)
}
