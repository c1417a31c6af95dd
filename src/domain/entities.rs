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

//! # Domain Entities
//!
//! The nouns of an extraction run: the jobs we are given, the raw values a
//! query hands back, and the per-job report card the scheduler produces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One query paired with the file its result set is written to.
///
/// Jobs are built positionally from the configured `queries` and `outfiles`
/// lists and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionJob {
    pub query: String,
    pub output_file: String,
}

impl ExtractionJob {
    pub fn new(query: impl Into<String>, output_file: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            output_file: output_file.into(),
        }
    }
}

/// A single raw column value as read from the query cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// SQL NULL.
    Null,
    /// Anything the driver can coerce to a string.
    Text(String),
    /// RAW / BLOB style columns.
    Binary(Vec<u8>),
}

impl From<Option<String>> for FieldValue {
    fn from(v: Option<String>) -> Self {
        v.map(FieldValue::Text).unwrap_or(FieldValue::Null)
    }
}

impl From<Option<Vec<u8>>> for FieldValue {
    fn from(v: Option<Vec<u8>>) -> Self {
        v.map(FieldValue::Binary).unwrap_or(FieldValue::Null)
    }
}

/// One row of a result set, in column order.
pub type ResultRow = Vec<FieldValue>;

/// Statistics returned by a successful export.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportStats {
    pub rows: u64,
    pub bytes: u64,
    pub duration: f64,
}

/// Final state of a single job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Success,
    Failed,
    /// Never admitted because an earlier job failed with `fail_fast` on.
    Skipped,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Success => write!(f, "SUCCESS"),
            TaskStatus::Failed => write!(f, "FAILED"),
            TaskStatus::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// `TaskResult` is the report card for one `ExtractionJob`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub output_file: String,
    pub query: String,
    /// Data rows written, header excluded.
    pub rows: u64,
    /// Field bytes written, before delimiters and quoting.
    pub bytes: u64,
    /// Seconds spent in the export itself.
    pub duration: f64,
    pub status: TaskStatus,
    pub error: Option<String>,
    pub completed_at: String,
}

impl TaskResult {
    pub fn success(job: &ExtractionJob, stats: ExportStats) -> Self {
        Self {
            output_file: job.output_file.clone(),
            query: job.query.clone(),
            rows: stats.rows,
            bytes: stats.bytes,
            duration: stats.duration,
            status: TaskStatus::Success,
            error: None,
            completed_at: chrono::Local::now().to_rfc3339(),
        }
    }

    pub fn failure(job: &ExtractionJob, error: String) -> Self {
        Self {
            output_file: job.output_file.clone(),
            query: job.query.clone(),
            rows: 0,
            bytes: 0,
            duration: 0.0,
            status: TaskStatus::Failed,
            error: Some(error),
            completed_at: chrono::Local::now().to_rfc3339(),
        }
    }

    pub fn skipped(job: &ExtractionJob) -> Self {
        Self {
            output_file: job.output_file.clone(),
            query: job.query.clone(),
            rows: 0,
            bytes: 0,
            duration: 0.0,
            status: TaskStatus::Skipped,
            error: None,
            completed_at: chrono::Local::now().to_rfc3339(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}

/// Lifecycle of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Connecting,
    Scheduling,
    AllSucceeded,
    OneOrMoreFailed,
    Terminated,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "Idle",
            RunState::Connecting => "Connecting",
            RunState::Scheduling => "Scheduling",
            RunState::AllSucceeded => "AllSucceeded",
            RunState::OneOrMoreFailed => "OneOrMoreFailed",
            RunState::Terminated => "Terminated",
        };
        write!(f, "{}", name)
    }
}
