use thiserror::Error;

use expensedb_core::StorageError;
use expensedb_mcp::ServerError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("storage initialization failed: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid listen address: {0}")]
    ListenAddr(#[from] std::net::AddrParseError),
    #[error(transparent)]
    Server(#[from] ServerError),
}
