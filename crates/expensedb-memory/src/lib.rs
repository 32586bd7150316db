use std::sync::{
    atomic::{AtomicI64, Ordering},
    RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use expensedb_core::{
    DateRange, ExpenseId, ExpenseListing, ExpenseRecord, ExpenseStore, NewExpense, StorageError,
};

/// Ledger kept in process memory. Contents are lost when the process exits.
pub struct InMemoryStorage {
    records: RwLock<Vec<ExpenseRecord>>,
    sequence_counter: AtomicI64,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            sequence_counter: AtomicI64::new(1),
        }
    }

    fn next_sequence(&self) -> ExpenseId {
        self.sequence_counter.fetch_add(1, Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<ExpenseRecord>>, StorageError> {
        self.records.read().map_err(|e| StorageError::Other(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<ExpenseRecord>>, StorageError> {
        self.records.write().map_err(|e| StorageError::Other(e.to_string()))
    }
}

impl ExpenseStore for InMemoryStorage {
    fn init(&self) -> Result<(), StorageError> {
        tracing::debug!("In-memory ledger ready");
        Ok(())
    }

    fn insert(&self, expense: &NewExpense) -> Result<ExpenseId, StorageError> {
        let mut records = self.write()?;
        let id = self.next_sequence();
        records.push(ExpenseRecord {
            id,
            date: expense.date.clone(),
            amount: expense.amount,
            category: expense.category.clone(),
            subcategory: expense.subcategory.clone(),
            note: expense.note.clone(),
        });
        tracing::debug!(id, "Expense inserted");
        Ok(id)
    }

    fn scan_all(&self) -> Result<Vec<ExpenseListing>, StorageError> {
        let records = self.read()?;
        // records are kept in id order, so a stable sort leaves date ties by id
        let mut result: Vec<ExpenseListing> = records.iter().map(ExpenseListing::from).collect();
        result.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(result)
    }

    fn scan_range(&self, range: &DateRange) -> Result<Vec<ExpenseRecord>, StorageError> {
        let records = self.read()?;
        let mut result: Vec<ExpenseRecord> = records
            .iter()
            .filter(|r| range.contains(&r.date))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(result)
    }
}
