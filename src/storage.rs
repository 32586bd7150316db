use std::sync::Arc;

pub use expensedb_core::{ExpenseStore, StorageError};
pub use expensedb_memory::InMemoryStorage;
pub use expensedb_sqlite::{SqliteConfig, SqliteStorage};

use crate::config::{Backend, Config};

/// Builds the configured backend and runs its schema initialization.
pub fn open_storage(config: &Config) -> Result<Arc<dyn ExpenseStore>, StorageError> {
    let storage: Arc<dyn ExpenseStore> = match config.storage.backend {
        Backend::Sqlite => {
            tracing::info!(path = %config.storage.path.display(), "Using SQLite storage");
            Arc::new(SqliteStorage::new(config.sqlite())?)
        }
        Backend::Memory => {
            tracing::warn!("Using in-memory storage, expenses will not survive a restart");
            let storage = InMemoryStorage::new();
            storage.init()?;
            Arc::new(storage)
        }
    };
    Ok(storage)
}
