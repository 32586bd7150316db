use crate::models::{
    write::NewExpense,
    DateRange, ExpenseId, ExpenseListing, ExpenseRecord,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(String),
    #[error("{0}")]
    Other(String),
}

/// Durable home of expense records.
///
/// Implementations must be safe to call from many threads at once. Each call
/// is a self-contained unit: it either commits fully or fails, and no state
/// is carried between calls.
pub trait ExpenseStore: Send + Sync {
    /// Creates the backing table when missing. Safe to call on every start.
    fn init(&self) -> Result<(), StorageError>;

    /// Appends a record and returns its freshly assigned id.
    fn insert(&self, expense: &NewExpense) -> Result<ExpenseId, StorageError>;

    /// Every record, ascending by date.
    fn scan_all(&self) -> Result<Vec<ExpenseListing>, StorageError>;

    /// Records dated within `range` (inclusive), descending by date.
    fn scan_range(&self, range: &DateRange) -> Result<Vec<ExpenseRecord>, StorageError>;
}
