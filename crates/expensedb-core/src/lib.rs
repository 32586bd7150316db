//! Core types and traits for ExpenseDB storage backends.
//!
//! This crate provides the `ExpenseStore` trait, the record projections it
//! returns and the `QueryEngine` that derives listings and category totals,
//! so storage implementations can live in separate crates.

pub mod models;
pub mod query;
pub mod storage;

pub use models::{CategoryTotal, DateRange, ExpenseListing, ExpenseRecord, ExpenseId};
pub use models::write::NewExpense;
pub use query::QueryEngine;
pub use storage::{ExpenseStore, StorageError};
