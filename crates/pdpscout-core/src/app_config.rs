use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub stores_path: PathBuf,
    /// Timeout for a single outbound GET.
    pub request_timeout_ms: u64,
    /// Hard ceiling for one (identifier, store) lookup, all fallbacks included.
    pub store_timeout_ms: u64,
    /// Simultaneous store lookups across a whole batch.
    pub max_concurrent_lookups: usize,
    pub user_agent: String,
    pub accept_language: String,
}
