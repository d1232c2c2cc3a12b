//! Storage configuration.

use serde::Deserialize;

use crate::adapter::outbound::sqlite::database::connection::{
    DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_POOL_SIZE,
};

/// URL that selects the in-memory store instead of SQLite.
pub const MEMORY_URL: &str = ":memory:";

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:` for a throwaway in-process store.
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// How long a writer waits on a locked database (milliseconds).
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_url() -> String {
    "parlay.db".into()
}

fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl DatabaseConfig {
    /// True when the configured URL selects the in-memory store.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_URL
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}
