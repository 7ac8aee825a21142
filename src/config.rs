use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// MySQL connection URL for the books database
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Upper bound on pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a connection before reporting the store unavailable
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Number of books shown for a user's top-rated list
    #[serde(default = "default_top_rated_limit")]
    pub top_rated_limit: usize,
}

fn default_database_url() -> String {
    "mysql://bookretailer@localhost:3306/booksdb".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_top_rated_limit() -> usize {
    crate::services::ranking::DEFAULT_TOP_RATED_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
            top_rated_limit: default_top_rated_limit(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
