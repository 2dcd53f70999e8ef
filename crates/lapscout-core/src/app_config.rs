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

/// Runtime settings for the listing client and CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Backend root, e.g. `http://localhost:8000`. Endpoint paths are joined onto it.
    pub api_base_url: String,
    /// Timeout for user-initiated calls (search, filter, estimate).
    pub request_timeout_secs: u64,
    /// Timeout for a single refresh status check. A timeout counts as a failed poll.
    pub status_timeout_secs: u64,
    pub user_agent: String,
    /// Page-count hint sent with `POST /api/refresh/start`.
    pub refresh_pages: u32,
}
