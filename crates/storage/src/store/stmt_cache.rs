#![forbid(unsafe_code)]

use super::StoreError;
use super::query::Statement;
use rusqlite::{Connection, Row, params_from_iter};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Shared connection plus prepared statements keyed by SQL text.
///
/// Statement shapes come from a fixed set of code paths, so the number of
/// distinct keys is bounded; the connection cache capacity is raised to the
/// known shape count so none of them is ever evicted.
#[derive(Debug)]
pub struct StmtCache {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    conn: Connection,
    shapes: HashSet<String>,
    capacity: usize,
}

impl Inner {
    /// Records the shape and returns whether it was already known.
    fn remember(&mut self, sql: &str) -> bool {
        if self.shapes.contains(sql) {
            return true;
        }
        self.shapes.insert(sql.to_string());
        if self.shapes.len() > self.capacity {
            self.capacity = self.shapes.len().next_power_of_two();
            self.conn
                .set_prepared_statement_cache_capacity(self.capacity);
        }
        false
    }
}

impl StmtCache {
    pub fn new(conn: Connection, initial_capacity: usize) -> Self {
        let capacity = initial_capacity.max(1);
        conn.set_prepared_statement_cache_capacity(capacity);
        Self {
            inner: Mutex::new(Inner {
                conn,
                shapes: HashSet::new(),
                capacity,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Number of distinct statement shapes prepared so far.
    pub fn shape_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.shapes.len())
    }

    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        self.lock()?.conn.execute_batch(sql)?;
        Ok(())
    }

    /// First row mapped through `map`, or `None` when the query is empty.
    pub fn query_row<T>(
        &self,
        stmt: &Statement,
        map: impl FnOnce(&Row<'_>) -> Result<T, StoreError>,
    ) -> Result<Option<T>, StoreError> {
        let mut inner = self.lock()?;
        let cached = inner.remember(&stmt.sql);
        debug!(sql = %stmt.sql, params = stmt.params.len(), cached, "query row");

        let mut prepared = inner.conn.prepare_cached(&stmt.sql)?;
        let mut rows = prepared.query(params_from_iter(stmt.params.iter()))?;
        match rows.next()? {
            Some(row) => map(row).map(Some),
            None => Ok(None),
        }
    }

    pub fn query_all<T>(
        &self,
        stmt: &Statement,
        mut map: impl FnMut(&Row<'_>) -> Result<T, StoreError>,
    ) -> Result<Vec<T>, StoreError> {
        let mut inner = self.lock()?;
        let cached = inner.remember(&stmt.sql);
        debug!(sql = %stmt.sql, params = stmt.params.len(), cached, "query all");

        let mut prepared = inner.conn.prepare_cached(&stmt.sql)?;
        let mut rows = prepared.query(params_from_iter(stmt.params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(map(row)?);
        }
        Ok(out)
    }

    /// Runs a write and returns the number of affected rows.
    pub fn exec(&self, stmt: &Statement) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let cached = inner.remember(&stmt.sql);
        debug!(sql = %stmt.sql, params = stmt.params.len(), cached, "exec");

        let mut prepared = inner.conn.prepare_cached(&stmt.sql)?;
        Ok(prepared.execute(params_from_iter(stmt.params.iter()))?)
    }

    /// Runs an INSERT and returns the new rowid. The rowid is read under
    /// the same lock, so a concurrent insert cannot interleave.
    pub fn insert(&self, stmt: &Statement) -> Result<i64, StoreError> {
        let mut inner = self.lock()?;
        let cached = inner.remember(&stmt.sql);
        debug!(sql = %stmt.sql, params = stmt.params.len(), cached, "insert");

        let mut prepared = inner.conn.prepare_cached(&stmt.sql)?;
        prepared.execute(params_from_iter(stmt.params.iter()))?;
        drop(prepared);
        Ok(inner.conn.last_insert_rowid())
    }
}
