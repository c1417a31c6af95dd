// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Infrastructure adapter that runs queries on pooled Oracle connections.

use crate::domain::entities::{FieldValue, ResultRow};
use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::oracle::connection_manager::OracleConnectionManager;
use crate::ports::query_port::{QueryPort, ResultCursor};
use oracle::sql_type::OracleType;
use oracle::{ResultSet, Row};
use r2d2::Pool;
use std::sync::Arc;

/// Concrete implementation of `QueryPort` for Oracle databases.
///
/// Each `with_cursor` call checks one connection out of the shared pool and
/// returns it when the cursor is dropped.
pub struct OracleQueryAdapter {
    pool: Arc<Pool<OracleConnectionManager>>,
    prefetch_rows: u32,
}

impl OracleQueryAdapter {
    pub fn new(pool: Arc<Pool<OracleConnectionManager>>, prefetch_rows: u32) -> Self {
        Self {
            pool,
            prefetch_rows,
        }
    }
}

impl QueryPort for OracleQueryAdapter {
    fn with_cursor(
        &self,
        query: &str,
        f: &mut dyn FnMut(&mut dyn ResultCursor) -> Result<()>,
    ) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| ExportError::ConnectionError(e.to_string()))?;

        let mut stmt = conn
            .statement(query)
            .prefetch_rows(self.prefetch_rows)
            .build()
            .map_err(|e| query_error(query, e))?;
        let rows = stmt.query(&[]).map_err(|e| query_error(query, e))?;

        let mut cursor = OracleCursor::new(rows);
        f(&mut cursor)
    }
}

fn query_error(query: &str, e: oracle::Error) -> ExportError {
    ExportError::QueryError {
        query: query.to_string(),
        reason: e.to_string(),
    }
}

/// Columns whose values are fetched as bytes instead of strings.
fn is_binary(otype: &OracleType) -> bool {
    matches!(
        otype,
        OracleType::Raw(_) | OracleType::LongRaw | OracleType::BLOB
    )
}

struct OracleCursor<'a> {
    rows: ResultSet<'a, Row>,
    names: Vec<String>,
    binary: Vec<bool>,
}

impl<'a> OracleCursor<'a> {
    fn new(rows: ResultSet<'a, Row>) -> Self {
        let col_infos = rows.column_info();
        let names = col_infos.iter().map(|c| c.name().to_string()).collect();
        let binary = col_infos.iter().map(|c| is_binary(c.oracle_type())).collect();
        Self {
            rows,
            names,
            binary,
        }
    }
}

impl ResultCursor for OracleCursor<'_> {
    fn columns(&self) -> Result<Vec<String>> {
        Ok(self.names.clone())
    }

    fn next_row(&mut self) -> Result<Option<ResultRow>> {
        let row = match self.rows.next() {
            Some(row_res) => row_res?,
            None => return Ok(None),
        };

        let mut values = Vec::with_capacity(self.binary.len());
        for (i, binary) in self.binary.iter().enumerate() {
            let value = if *binary {
                let v: Option<Vec<u8>> = row.get(i)?;
                FieldValue::from(v)
            } else {
                let v: Option<String> = row.get(i)?;
                FieldValue::from(v)
            };
            values.push(value);
        }
        Ok(Some(values))
    }
}
