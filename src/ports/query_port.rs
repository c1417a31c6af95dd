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

//! # Query Port
//!
//! The contract for "something that can run a query and let us walk its
//! rows". The export writer only ever talks to this trait, so it does not care
//! whether rows come from Oracle or from an in-memory fake in a test.

use crate::domain::entities::ResultRow;
use crate::domain::errors::Result;

/// A live, forward-only handle over one query's result rows.
pub trait ResultCursor {
    /// Column names of the result set, in select-list order.
    fn columns(&self) -> Result<Vec<String>>;

    /// Fetches the next row, or `None` once the cursor is exhausted.
    ///
    /// Every returned row is freshly allocated and owned by the caller.
    fn next_row(&mut self) -> Result<Option<ResultRow>>;
}

/// `QueryPort` executes queries against the shared database handle.
///
/// `Send + Sync` because one port is shared by every extraction task.
pub trait QueryPort: Send + Sync {
    /// Executes `query` and hands its cursor to `f`.
    ///
    /// The cursor, and whatever connection backs it, is released as soon as
    /// `f` returns, whether it returned `Ok` or `Err`. Execution failures are
    /// reported as `ExportError::QueryError`.
    fn with_cursor(
        &self,
        query: &str,
        f: &mut dyn FnMut(&mut dyn ResultCursor) -> Result<()>,
    ) -> Result<()>;
}
