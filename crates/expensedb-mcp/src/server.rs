use std::{net::SocketAddr, sync::Arc};

use expensedb_core::{
    CategoryTotal, ExpenseListing, ExpenseRecord, ExpenseStore, NewExpense, QueryEngine,
    StorageError,
};
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::{
        stdio,
        streamable_http_server::{session::local::LocalSessionManager, StreamableHttpService},
    },
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    categories::{CategoryResource, CATEGORIES_URI},
    params::{AddExpenseInput, AddExpenseOutput, DateRangeInput, SummarizeInput},
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to start MCP server: {0}")]
    Start(String),
    #[error("MCP server task failed: {0}")]
    Join(String),
}

/// MCP front end over the expense ledger.
#[derive(Clone)]
pub struct ExpenseServer {
    storage: Arc<dyn ExpenseStore>,
    engine: QueryEngine,
    categories: CategoryResource,
    tool_router: ToolRouter<Self>,
}

fn storage_error(e: StorageError) -> McpError {
    tracing::error!(error = %e, "Storage operation failed");
    McpError::internal_error(e.to_string(), None)
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Runs a blocking store call off the async executor.
async fn run_blocking<T, F>(f: F) -> Result<T, McpError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?
        .map_err(storage_error)
}

impl ExpenseServer {
    pub(crate) async fn add(&self, input: AddExpenseInput) -> Result<AddExpenseOutput, McpError> {
        let storage = self.storage.clone();
        let expense = NewExpense::from(input);
        let id = run_blocking(move || storage.insert(&expense)).await?;
        Ok(AddExpenseOutput::ok(id))
    }

    pub(crate) async fn list_all(&self) -> Result<Vec<ExpenseListing>, McpError> {
        let engine = self.engine.clone();
        run_blocking(move || engine.list_all()).await
    }

    pub(crate) async fn list_dated(
        &self,
        input: DateRangeInput,
    ) -> Result<Vec<ExpenseRecord>, McpError> {
        let engine = self.engine.clone();
        run_blocking(move || engine.list_date_range(&input.start_date, &input.end_date)).await
    }

    pub(crate) async fn summary(
        &self,
        input: SummarizeInput,
    ) -> Result<Vec<CategoryTotal>, McpError> {
        let engine = self.engine.clone();
        run_blocking(move || {
            engine.summarize(&input.start_date, &input.end_date, input.category.as_deref())
        })
        .await
    }

    pub(crate) async fn resource_contents(&self, uri: &str) -> Result<ResourceContents, McpError> {
        if uri != CATEGORIES_URI {
            return Err(McpError::resource_not_found(
                format!("unknown resource: {}", uri),
                None,
            ));
        }
        self.categories.read().await
    }

    pub async fn serve_stdio(self) -> Result<(), ServerError> {
        tracing::info!("MCP server listening on stdio");
        let service = self
            .serve(stdio())
            .await
            .map_err(|e| ServerError::Start(e.to_string()))?;

        let reason = service
            .waiting()
            .await
            .map_err(|e| ServerError::Join(e.to_string()))?;
        tracing::info!(?reason, "MCP server stopped");
        Ok(())
    }

    /// Serves the tools over streamable HTTP at `/mcp` until Ctrl-C.
    pub async fn serve_http(self, addr: SocketAddr) -> Result<(), ServerError> {
        let service = StreamableHttpService::new(
            move || Ok(self.clone()),
            LocalSessionManager::default().into(),
            Default::default(),
        );
        let router = axum::Router::new().nest_service("/mcp", service);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Start(format!("cannot bind {}: {}", addr, e)))?;
        tracing::info!(%addr, "MCP server listening on http://{}/mcp", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .map_err(|e| ServerError::Join(e.to_string()))?;
        tracing::info!("MCP server stopped");
        Ok(())
    }
}

#[tool_router]
impl ExpenseServer {
    pub fn new(storage: Arc<dyn ExpenseStore>, categories: CategoryResource) -> Self {
        Self {
            engine: QueryEngine::new(storage.clone()),
            storage,
            categories,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Add a new expense entry to the database. Returns the id assigned to it.")]
    async fn add_expense(
        &self,
        params: Parameters<AddExpenseInput>,
    ) -> Result<CallToolResult, McpError> {
        to_json(&self.add(params.0).await?)
    }

    #[tool(description = "List all expense entries ordered by date (note omitted).")]
    async fn list_all_expense(&self) -> Result<CallToolResult, McpError> {
        to_json(&self.list_all().await?)
    }

    #[tool(description = "List expense entries within an inclusive date range, newest first.")]
    async fn list_dated_expense(
        &self,
        params: Parameters<DateRangeInput>,
    ) -> Result<CallToolResult, McpError> {
        to_json(&self.list_dated(params.0).await?)
    }

    #[tool(description = "Total expenses per category within an inclusive date range, \
                          optionally for a single category.")]
    async fn summarize(
        &self,
        params: Parameters<SummarizeInput>,
    ) -> Result<CallToolResult, McpError> {
        to_json(&self.summary(params.0).await?)
    }
}

#[tool_handler]
impl ServerHandler for ExpenseServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Expense Tracker - record expenses with add_expense, browse them with \
                 list_all_expense or list_dated_expense, and get per-category totals with \
                 summarize. Dates are YYYY-MM-DD. The expense://categories resource lists \
                 the known categories."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(vec![self.categories.describe()]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        Ok(ReadResourceResult {
            contents: vec![self.resource_contents(&request.uri).await?],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expensedb_core::{DateRange, ExpenseId};
    use expensedb_memory::InMemoryStorage;

    struct BrokenStore;

    impl ExpenseStore for BrokenStore {
        fn init(&self) -> Result<(), StorageError> {
            Ok(())
        }

        fn insert(&self, _expense: &NewExpense) -> Result<ExpenseId, StorageError> {
            Err(StorageError::Sqlite("database disk image is malformed".to_string()))
        }

        fn scan_all(&self) -> Result<Vec<ExpenseListing>, StorageError> {
            Err(StorageError::Sqlite("database disk image is malformed".to_string()))
        }

        fn scan_range(&self, _range: &DateRange) -> Result<Vec<ExpenseRecord>, StorageError> {
            Err(StorageError::Sqlite("database disk image is malformed".to_string()))
        }
    }

    fn server() -> ExpenseServer {
        let storage: Arc<dyn ExpenseStore> = Arc::new(InMemoryStorage::new());
        ExpenseServer::new(storage, CategoryResource::new("categories.json"))
    }

    fn broken_server() -> ExpenseServer {
        ExpenseServer::new(Arc::new(BrokenStore), CategoryResource::new("categories.json"))
    }

    fn add_input(date: &str, amount: f64, category: &str) -> AddExpenseInput {
        AddExpenseInput {
            date: date.to_string(),
            amount,
            category: category.to_string(),
            subcategory: String::new(),
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_add_expense_reports_status_and_id() {
        let server = server();
        let first = server.add(add_input("2024-01-05", 12.5, "food")).await.unwrap();
        let second = server.add(add_input("2024-01-10", 7.25, "food")).await.unwrap();

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::json!({"status": "ok", "id": 1})
        );
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_add_expense_defaults_optional_fields() {
        let input: AddExpenseInput = serde_json::from_value(serde_json::json!({
            "date": "2024-01-05",
            "amount": 12.5,
            "category": "food"
        }))
        .unwrap();
        assert_eq!(input.subcategory, "");
        assert_eq!(input.note, "");

        let server = server();
        server.add(input).await.unwrap();
        let rows = server
            .list_dated(DateRangeInput {
                start_date: "2024-01-01".to_string(),
                end_date: "2024-01-31".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(rows[0].note, "");
    }

    #[tokio::test]
    async fn test_list_all_rows_carry_no_note() {
        let server = server();
        let mut input = add_input("2024-01-05", 12.5, "food");
        input.note = "secret".to_string();
        server.add(input).await.unwrap();

        let rows = serde_json::to_value(server.list_all().await.unwrap()).unwrap();
        let row = rows[0].as_object().unwrap();
        assert!(!row.contains_key("note"));
        assert_eq!(row["subcategory"], "");
    }

    #[tokio::test]
    async fn test_summarize_tool_example() {
        let server = server();
        server.add(add_input("2024-01-05", 12.50, "food")).await.unwrap();
        server.add(add_input("2024-01-10", 7.25, "food")).await.unwrap();
        server.add(add_input("2024-02-01", 20.00, "transit")).await.unwrap();

        let input: SummarizeInput = serde_json::from_value(serde_json::json!({
            "start_date": "2024-01-01",
            "end_date": "2024-01-31",
            "category": null
        }))
        .unwrap();
        let totals = serde_json::to_value(server.summary(input).await.unwrap()).unwrap();
        assert_eq!(totals, serde_json::json!([{"category": "food", "total_amount": 19.75}]));
    }

    #[tokio::test]
    async fn test_storage_failure_reaches_caller() {
        let server = broken_server();

        let err = server.add(add_input("2024-01-05", 12.5, "food")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert!(err.message.contains("database disk image is malformed"), "{}", err.message);

        let err = server
            .summary(SummarizeInput {
                start_date: "2024-01-01".to_string(),
                end_date: "2024-01-31".to_string(),
                category: None,
            })
            .await
            .unwrap_err();
        assert!(err.message.contains("database disk image is malformed"), "{}", err.message);
    }

    #[tokio::test]
    async fn test_unknown_resource_uri_not_found() {
        let server = server();
        let err = server.resource_contents("expense://budgets").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert!(err.message.contains("expense://budgets"));
    }

    #[tokio::test]
    async fn test_categories_uri_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("categories.json");
        std::fs::write(&path, r#"{"transit": ["taxi"]}"#).unwrap();

        let storage: Arc<dyn ExpenseStore> = Arc::new(InMemoryStorage::new());
        let server = ExpenseServer::new(storage, CategoryResource::new(&path));
        match server.resource_contents(CATEGORIES_URI).await.unwrap() {
            ResourceContents::TextResourceContents { text, .. } => {
                assert_eq!(text, r#"{"transit": ["taxi"]}"#)
            }
            other => panic!("Expected text contents, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_bind_failure_is_start_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();

        let result = server().serve_http(addr).await;
        assert!(matches!(result, Err(ServerError::Start(_))), "{:?}", result);
    }
}
