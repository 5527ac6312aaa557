//! Executor trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Positional parameter bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// VARCHAR value
    Text(String),
    /// TIMESTAMP value with no time zone
    Timestamp(NaiveDateTime),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<NaiveDateTime> for SqlParam {
    fn from(value: NaiveDateTime) -> Self {
        SqlParam::Timestamp(value)
    }
}

/// One result row. Values are text; callers project VARCHAR columns
/// (casting with `strftime`/`CAST` where needed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<Option<String>>,
}

impl Row {
    /// Build a row from its column values
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Value at `idx`, or `None` for SQL NULL or an out-of-range index
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a zero-column row
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Connection capability the migration engine runs against.
///
/// The engine never opens connections itself; it receives an already
/// connected executor and closes it at the end of a run. Implementations
/// must be Send + Sync for async operation.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute a single statement, returns affected rows
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> DbResult<usize>;

    /// Run a single query and collect every row
    async fn query(&self, sql: &str, params: &[SqlParam]) -> DbResult<Vec<Row>>;

    /// Release the connection; later calls fail
    async fn close(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
