#![forbid(unsafe_code)]

mod codec;
mod config;
mod error;
mod filters;
mod jobs;
mod query;
mod security;
mod stmt_cache;
mod support;
mod types;

pub use codec::JOB_COLUMNS;
pub use config::RepositoryConfig;
pub use error::StoreError;
pub use filters::apply_filter;
pub use query::{Insert, Select, Statement, Update};
pub use security::scope_to_caller;
pub use stmt_cache::StmtCache;
pub use types::*;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistence and query layer for batch-job rows.
///
/// Every public operation issues exactly one statement through the shared
/// [`StmtCache`]; the repository itself holds no per-call state and can be
/// shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct JobRepository {
    cache: StmtCache,
    storage_dir: Option<PathBuf>,
}

impl JobRepository {
    pub fn open(
        storage_dir: impl AsRef<Path>,
        config: &RepositoryConfig,
    ) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(&config.db_file_name);
        debug!(path = %db_path.display(), "opening job store");
        let conn = Connection::open(db_path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;

        let mut repo = Self::from_connection(conn, config)?;
        repo.storage_dir = Some(storage_dir);
        Ok(repo)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, &RepositoryConfig::default())
    }

    /// Wraps an already-open connection and installs the job table if it is
    /// missing.
    pub fn from_connection(conn: Connection, config: &RepositoryConfig) -> Result<Self, StoreError> {
        conn.busy_timeout(config.busy_timeout())?;

        let cache = StmtCache::new(conn, config.statement_cache_capacity);
        support::install_schema(&cache)?;

        Ok(Self {
            cache,
            storage_dir: None,
        })
    }

    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage_dir.as_deref()
    }

    /// Distinct statement shapes prepared over the repository's lifetime.
    pub fn statement_shapes(&self) -> Result<usize, StoreError> {
        self.cache.shape_count()
    }
}
