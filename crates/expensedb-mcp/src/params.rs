use expensedb_core::{ExpenseId, NewExpense};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddExpenseInput {
    /// Expense date as YYYY-MM-DD.
    pub date: String,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub note: String,
}

impl From<AddExpenseInput> for NewExpense {
    fn from(input: AddExpenseInput) -> Self {
        NewExpense {
            date: input.date,
            amount: input.amount,
            category: input.category,
            subcategory: input.subcategory,
            note: input.note,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DateRangeInput {
    /// First day included, YYYY-MM-DD.
    pub start_date: String,
    /// Last day included, YYYY-MM-DD.
    pub end_date: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SummarizeInput {
    pub start_date: String,
    pub end_date: String,
    /// Restrict the summary to this exact category. Omit or null for all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddExpenseOutput {
    pub status: String,
    pub id: ExpenseId,
}

impl AddExpenseOutput {
    pub fn ok(id: ExpenseId) -> Self {
        Self {
            status: "ok".to_string(),
            id,
        }
    }
}
