use std::fmt::Display;

use serde::Serialize;

pub mod write;

pub type ExpenseId = i64;

/// A stored expense line item with every column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub date: String,
    pub amount: f64,
    pub category: String,
    pub subcategory: String,
    pub note: String,
}

/// Narrow projection used when listing the whole ledger. Carries no `note`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseListing {
    pub id: ExpenseId,
    pub date: String,
    pub amount: f64,
    pub category: String,
    pub subcategory: String,
}

impl From<&ExpenseRecord> for ExpenseListing {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            id: record.id,
            date: record.date.clone(),
            amount: record.amount,
            category: record.category.clone(),
            subcategory: record.subcategory.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total_amount: f64,
}

/// Inclusive `[start, end]` interval over date strings.
///
/// Bounds are compared as plain strings, which matches calendar order for
/// `YYYY-MM-DD` values only. Nothing is parsed or validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        self.start.as_str() <= date && date <= self.end.as_str()
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new("2024-01-01", "2024-01-31");
        assert!(range.contains("2024-01-01"));
        assert!(range.contains("2024-01-31"));
        assert!(range.contains("2024-01-15"));
        assert!(!range.contains("2023-12-31"));
        assert!(!range.contains("2024-02-01"));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = DateRange::new("2024-02-01", "2024-01-01");
        assert!(!range.contains("2024-01-15"));
        assert!(!range.contains("2024-02-01"));
    }

    #[test]
    fn test_listing_drops_note() {
        let record = ExpenseRecord {
            id: 7,
            date: "2024-01-05".to_string(),
            amount: 12.5,
            category: "food".to_string(),
            subcategory: "lunch".to_string(),
            note: "with team".to_string(),
        };
        let listing = ExpenseListing::from(&record);
        assert_eq!(listing.id, 7);
        assert_eq!(listing.subcategory, "lunch");
    }
}
