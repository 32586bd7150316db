use std::{collections::BTreeMap, sync::Arc};

use crate::{
    models::{CategoryTotal, DateRange, ExpenseListing, ExpenseRecord},
    storage::{ExpenseStore, StorageError},
};

/// Read-only views derived from an `ExpenseStore`.
#[derive(Clone)]
pub struct QueryEngine {
    storage: Arc<dyn ExpenseStore>,
}

impl QueryEngine {
    pub fn new(storage: Arc<dyn ExpenseStore>) -> Self {
        Self { storage }
    }

    pub fn list_all(&self) -> Result<Vec<ExpenseListing>, StorageError> {
        self.storage.scan_all()
    }

    pub fn list_date_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<ExpenseRecord>, StorageError> {
        self.storage.scan_range(&DateRange::new(start, end))
    }

    /// Totals `amount` per category for records dated in `[start, end]`.
    ///
    /// `category` of `None` (or an empty string) means every category. Rows
    /// come back ascending by category name and only categories with at least
    /// one matching record appear.
    pub fn summarize(
        &self,
        start: &str,
        end: &str,
        category: Option<&str>,
    ) -> Result<Vec<CategoryTotal>, StorageError> {
        let category = category.filter(|c| !c.is_empty());
        let range = DateRange::new(start, end);
        let records = self.storage.scan_range(&range)?;

        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for record in records {
            if let Some(wanted) = category {
                if record.category != wanted {
                    continue;
                }
            }
            *totals.entry(record.category).or_insert(0.0) += record.amount;
        }

        tracing::debug!(
            %range,
            filter = ?category,
            categories = totals.len(),
            "Summarized expenses"
        );

        Ok(totals
            .into_iter()
            .map(|(category, total_amount)| CategoryTotal {
                category,
                total_amount,
            })
            .collect())
    }
}
