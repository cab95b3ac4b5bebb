pub mod memory;
pub mod postgres;

pub use memory::InMemoryCatalog;
pub use postgres::{create_pool, PgCatalog};
