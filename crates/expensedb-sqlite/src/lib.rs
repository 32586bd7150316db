use std::{path::PathBuf, time::Duration};

use expensedb_core::{
    DateRange, ExpenseId, ExpenseListing, ExpenseRecord, ExpenseStore, NewExpense, StorageError,
};
use rusqlite::{params, Connection};

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    pub path: PathBuf,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl SqliteConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Expense ledger stored in a SQLite file.
///
/// No connection is held between calls. Every operation opens the file,
/// does its work as one statement and closes the connection when it goes out
/// of scope, error paths included. Concurrent writers are serialized by
/// SQLite's own locking.
pub struct SqliteStorage {
    config: SqliteConfig,
}

fn sql_err(e: rusqlite::Error) -> StorageError {
    StorageError::Sqlite(e.to_string())
}

impl SqliteStorage {
    /// Opens the ledger at `config.path` and makes sure the schema exists.
    pub fn new(config: SqliteConfig) -> Result<Self, StorageError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let storage = Self { config };
        storage.init()?;
        Ok(storage)
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.config.path).map_err(sql_err)?;
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))
            .map_err(sql_err)?;
        Ok(conn)
    }
}

impl ExpenseStore for SqliteStorage {
    fn init(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;

        // journal mode sticks to the file, so setting it once here covers later connections
        let mode: String = conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(sql_err)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                subcategory TEXT DEFAULT '',
                note TEXT DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_date
                ON expenses(date);
            ",
        )
        .map_err(sql_err)?;

        tracing::debug!(
            path = %self.config.path.display(),
            journal_mode = %mode,
            "SQLite schema ready"
        );
        Ok(())
    }

    fn insert(&self, expense: &NewExpense) -> Result<ExpenseId, StorageError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO expenses (date, amount, category, subcategory, note)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                expense.date,
                expense.amount,
                expense.category,
                expense.subcategory,
                expense.note
            ],
        )
        .map_err(sql_err)?;

        let id = conn.last_insert_rowid();
        tracing::debug!(
            id,
            date = %expense.date,
            category = %expense.category,
            "Expense inserted"
        );
        Ok(id)
    }

    fn scan_all(&self) -> Result<Vec<ExpenseListing>, StorageError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, date, amount, category, COALESCE(subcategory, '')
                 FROM expenses
                 ORDER BY date, id",
            )
            .map_err(sql_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ExpenseListing {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    amount: row.get(2)?,
                    category: row.get(3)?,
                    subcategory: row.get(4)?,
                })
            })
            .map_err(sql_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(sql_err)?;

        tracing::debug!(count = rows.len(), "Scanned all expenses");
        Ok(rows)
    }

    fn scan_range(&self, range: &DateRange) -> Result<Vec<ExpenseRecord>, StorageError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, date, amount, category, COALESCE(subcategory, ''), COALESCE(note, '')
                 FROM expenses
                 WHERE date BETWEEN ?1 AND ?2
                 ORDER BY date DESC, id",
            )
            .map_err(sql_err)?;

        let rows = stmt
            .query_map(params![range.start, range.end], |row| {
                Ok(ExpenseRecord {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    amount: row.get(2)?,
                    category: row.get(3)?,
                    subcategory: row.get(4)?,
                    note: row.get(5)?,
                })
            })
            .map_err(sql_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(sql_err)?;

        tracing::debug!(%range, count = rows.len(), "Scanned expense range");
        Ok(rows)
    }
}
