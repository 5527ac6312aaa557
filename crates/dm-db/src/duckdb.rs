//! DuckDB executor implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Executor, Row, SqlParam};
use async_trait::async_trait;
use duckdb::types::{TimeUnit, Value};
use duckdb::{params_from_iter, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
///
/// The connection slot is emptied by [`Executor::close`].
pub struct DuckDbBackend {
    conn: Mutex<Option<Connection>>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::connected(conn)
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Self::connected(conn)
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Wrap an open connection after checking it answers `SELECT 1`
    fn connected(conn: Connection) -> DbResult<Self> {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(|e| DbError::ConnectionError(format!("ping failed: {e}")))?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str, params: &[SqlParam]) -> DbResult<usize> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(DbError::ConnectionClosed)?;
        conn.execute(sql, params_from_iter(to_values(params)))
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    /// Query rows synchronously
    fn query_sync(&self, sql: &str, params: &[SqlParam]) -> DbResult<Vec<Row>> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(DbError::ConnectionClosed)?;

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))?;
        let mut rows = stmt
            .query(params_from_iter(to_values(params)))
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let width = row.as_ref().column_count();
            let values = (0..width)
                .map(|i| row.get::<_, Option<String>>(i))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(Row::new(values));
        }
        Ok(out)
    }

    fn close_sync(&self) -> DbResult<()> {
        let mut guard = self.lock()?;
        match guard.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, e)| DbError::ConnectionError(format!("close failed: {e}"))),
            None => Ok(()),
        }
    }
}

fn to_values(params: &[SqlParam]) -> Vec<Value> {
    params
        .iter()
        .map(|p| match p {
            SqlParam::Text(s) => Value::Text(s.clone()),
            SqlParam::Timestamp(ts) => {
                Value::Timestamp(TimeUnit::Microsecond, ts.and_utc().timestamp_micros())
            }
        })
        .collect()
}

#[async_trait]
impl Executor for DuckDbBackend {
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> DbResult<usize> {
        self.execute_sync(sql, params)
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> DbResult<Vec<Row>> {
        self.query_sync(sql, params)
    }

    async fn close(&self) -> DbResult<()> {
        log::debug!("Closing {} connection", self.db_type());
        self.close_sync()
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
