//! In-memory `QueryPort` used by the unit tests.

use crate::domain::entities::{FieldValue, ResultRow};
use crate::domain::errors::{ExportError, Result};
use crate::ports::query_port::{QueryPort, ResultCursor};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Canned result for one query text.
#[derive(Clone, Default)]
pub struct FakeResult {
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    /// Fail when executing the query.
    pub query_error: Option<String>,
    /// Fail when asked for the column list.
    pub columns_error: Option<String>,
    /// Fail when fetching the row at this zero-based index.
    pub fail_at_row: Option<usize>,
    /// Panic when fetching the first row.
    pub panic_on_fetch: bool,
}

impl FakeResult {
    pub fn table(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|r| {
                    r.into_iter()
                        .map(|v| FieldValue::from(v.map(str::to_string)))
                        .collect()
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            query_error: Some(reason.to_string()),
            ..Default::default()
        }
    }
}

/// Fake query port that also measures how many cursors are open at once.
#[derive(Default)]
pub struct FakeQueryPort {
    results: HashMap<String, FakeResult>,
    row_delay: Duration,
    active: AtomicUsize,
    max_active: AtomicUsize,
    executed: Mutex<Vec<String>>,
}

impl FakeQueryPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, query: &str, result: FakeResult) -> Self {
        self.results.insert(query.to_string(), result);
        self
    }

    /// Sleeps this long before handing out each row, to force overlap.
    pub fn with_row_delay(mut self, delay: Duration) -> Self {
        self.row_delay = delay;
        self
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct FakeCursor<'a> {
    result: &'a FakeResult,
    next: usize,
    row_delay: Duration,
}

impl ResultCursor for FakeCursor<'_> {
    fn columns(&self) -> Result<Vec<String>> {
        match &self.result.columns_error {
            Some(reason) => Err(ExportError::OracleError(reason.clone())),
            None => Ok(self.result.columns.clone()),
        }
    }

    fn next_row(&mut self) -> Result<Option<ResultRow>> {
        if self.result.panic_on_fetch {
            panic!("driver blew up");
        }
        if !self.row_delay.is_zero() {
            std::thread::sleep(self.row_delay);
        }
        if self.result.fail_at_row == Some(self.next) {
            return Err(ExportError::OracleError("ORA-03113: end-of-file on communication channel".into()));
        }
        let row = self.result.rows.get(self.next).cloned();
        self.next += 1;
        Ok(row)
    }
}

impl QueryPort for FakeQueryPort {
    fn with_cursor(
        &self,
        query: &str,
        f: &mut dyn FnMut(&mut dyn ResultCursor) -> Result<()>,
    ) -> Result<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        let _guard = ActiveGuard(&self.active);
        self.executed.lock().unwrap().push(query.to_string());

        let result = self.results.get(query).ok_or_else(|| ExportError::QueryError {
            query: query.to_string(),
            reason: "ORA-00942: table or view does not exist".to_string(),
        })?;
        if let Some(reason) = &result.query_error {
            return Err(ExportError::QueryError {
                query: query.to_string(),
                reason: reason.clone(),
            });
        }

        let mut cursor = FakeCursor {
            result,
            next: 0,
            row_delay: self.row_delay,
        };
        f(&mut cursor)
    }
}
