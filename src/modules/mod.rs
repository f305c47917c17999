pub mod books;

use shelf_db::Database;
use shelf_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, database: &Database) {
    registry.register(books::create_module(database.pool().clone()));
}
