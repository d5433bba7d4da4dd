pub mod books;
pub mod users;

use bookshelf_kernel::{settings::Settings, ModuleRegistry};
use sqlx::SqlitePool;

/// Build the registry with the database core module and every domain module
pub fn build_registry(pool: SqlitePool, settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(std::sync::Arc::new(bookshelf_db::DbModule::new(pool.clone())));
    register_all(&mut registry, pool, settings);
    registry
}

/// Register all domain modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, pool: SqlitePool, settings: &Settings) {
    registry.register_domain(books::create_module(pool.clone(), &settings.catalog));
    registry.register_domain(users::create_module(pool));
}
