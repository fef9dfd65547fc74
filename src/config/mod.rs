use serde::Deserialize;

/// Which record store backs the dashboard.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local store. Nothing ingests into it over HTTP, so a server
    /// started this way always serves empty dashboards. For smoke tests of
    /// routing and auth; the test suite seeds it directly.
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string. Required for the postgres backend.
    pub database_url: Option<String>,

    /// HS256 secret shared with the account service that issues session tokens
    pub jwt_secret: String,

    #[serde(default)]
    pub store_backend: StoreBackend,

    /// Rows per page when the client does not ask for a limit
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_page_size() -> i64 {
    20
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
