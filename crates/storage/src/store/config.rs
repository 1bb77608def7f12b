#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_DB_FILE_NAME: &str = "job.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_STATEMENT_CACHE_CAPACITY: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub db_file_name: String,
    pub busy_timeout_ms: u64,
    /// Initial prepared-statement capacity. The cache grows past this when
    /// more distinct statement shapes show up.
    pub statement_cache_capacity: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            statement_cache_capacity: DEFAULT_STATEMENT_CACHE_CAPACITY,
        }
    }
}

impl RepositoryConfig {
    pub fn from_json(raw: &str) -> Result<Self, super::StoreError> {
        let config: Self = serde_json::from_str(raw)?;
        if config.db_file_name.trim().is_empty() {
            return Err(super::StoreError::InvalidInput(
                "db_file_name must not be empty",
            ));
        }
        Ok(config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
