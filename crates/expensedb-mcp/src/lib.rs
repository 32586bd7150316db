//! MCP front end for ExpenseDB.
//!
//! Exposes `add_expense`, `list_all_expense`, `list_dated_expense` and
//! `summarize` as tools plus the `expense://categories` resource. Holds no
//! ledger logic of its own: tools forward to an `ExpenseStore` and a
//! `QueryEngine` and serialize whatever they return.

pub mod categories;
pub mod params;
pub mod server;

pub use categories::{CategoryResource, CATEGORIES_URI};
pub use server::{ExpenseServer, ServerError};
