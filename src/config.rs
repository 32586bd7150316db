use std::{
    net::{AddrParseError, SocketAddr},
    path::PathBuf,
};

use clap::{Parser, ValueEnum};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "expensedb", about = "ExpenseDB - personal expense ledger served over MCP")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "expensedb.toml")]
    pub config: String,

    /// MCP transport (overrides config file)
    #[arg(short, long, value_enum)]
    pub transport: Option<Transport>,

    /// Port to listen on for the http transport (overrides config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// SQLite database file (overrides config file)
    #[arg(short, long)]
    pub db_path: Option<PathBuf>,

    /// Storage backend (overrides config file)
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,

    /// Category taxonomy JSON file (overrides config file)
    #[arg(long)]
    pub categories: Option<PathBuf>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    #[serde(default = "default_resources")]
    pub resources: ResourcesConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_transport")]
    pub transport: Transport,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: Backend,

    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResourcesConfig {
    #[serde(default = "default_categories_path")]
    pub categories_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_server() -> ServerConfig {
    ServerConfig {
        transport: default_transport(),
        host: default_host(),
        port: default_port(),
    }
}

fn default_storage() -> StorageConfig {
    StorageConfig {
        backend: default_backend(),
        path: default_db_path(),
        busy_timeout_ms: default_busy_timeout_ms(),
    }
}

fn default_resources() -> ResourcesConfig {
    ResourcesConfig {
        categories_path: default_categories_path(),
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_transport() -> Transport {
    Transport::Stdio
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_backend() -> Backend {
    Backend::Sqlite
}

fn default_db_path() -> PathBuf {
    PathBuf::from("/tmp/expenses.db")
}

fn default_busy_timeout_ms() -> u64 {
    expensedb_sqlite::DEFAULT_BUSY_TIMEOUT_MS
}

fn default_categories_path() -> PathBuf {
    PathBuf::from("categories.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: default_server(),
            storage: default_storage(),
            resources: default_resources(),
            logging: default_logging(),
        }
    }
}

impl Config {
    pub fn load(cli: &CliArgs) -> Self {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(transport) = cli.transport {
            config.server.transport = transport;
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref path) = cli.db_path {
            config.storage.path = path.clone();
        }
        if let Some(backend) = cli.backend {
            config.storage.backend = backend;
        }
        if let Some(ref path) = cli.categories {
            config.resources.categories_path = path.clone();
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }

        config
    }

    /// Parses a TOML document, falling back to defaults when it is malformed.
    pub fn parse(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse config file: {}", e);
            Config::default()
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    pub fn sqlite(&self) -> expensedb_sqlite::SqliteConfig {
        expensedb_sqlite::SqliteConfig {
            path: self.storage.path.clone(),
            busy_timeout_ms: self.storage.busy_timeout_ms,
        }
    }
}
