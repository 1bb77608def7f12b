#![forbid(unsafe_code)]

mod sql;

use super::super::StoreError;
use super::super::stmt_cache::StmtCache;

/// Creates the job table and its indexes when they are missing. Existing
/// tables are left untouched; schema migration happens elsewhere.
pub(in crate::store) fn install_schema(cache: &StmtCache) -> Result<(), StoreError> {
    cache.execute_batch(&sql::full_schema_sql())
}
