pub mod config;
pub mod error;
pub mod logging;
pub mod storage;

pub use expensedb_core::{models, query};
pub use expensedb_mcp as mcp;

use config::{Config, Transport};
use error::AppError;
use mcp::{CategoryResource, ExpenseServer};

/// Opens storage and serves the MCP tools on the configured transport.
///
/// Storage is initialized before anything is served, so a missing or corrupt
/// database fails here instead of on the first request.
pub async fn run(config: Config) -> Result<(), AppError> {
    let storage = storage::open_storage(&config)?;

    let categories = CategoryResource::new(config.resources.categories_path.clone());
    tracing::info!(categories = %categories.path().display(), "Starting Expense Tracker");

    let server = ExpenseServer::new(storage, categories);
    match config.server.transport {
        Transport::Stdio => server.serve_stdio().await?,
        Transport::Http => server.serve_http(config.listen_addr()?).await?,
    }
    Ok(())
}
