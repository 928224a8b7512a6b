pub mod books;
pub mod url;

use bookit_kernel::ModuleRegistry;
use sqlx::SqlitePool;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &SqlitePool) {
    registry.register(books::create_module(db.clone()));
    registry.register(url::create_module());
}
