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

//! Core error definitions for the extractor.
//!
//! Every stage of a run (config, connection, file, query, row stream) maps its
//! failures onto one variant of `ExportError`, so a task can hand a single
//! typed error back to the scheduler.

use thiserror::Error;

/// Error types encountered during an extraction run.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Could not connect to the database: {0}")]
    ConnectionError(String),

    #[error("Could not create file {path}: {source}")]
    FileCreateError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to execute the provided query '{query}': {reason}")]
    QueryError { query: String, reason: String },

    #[error("Columns could not be collected from the query result: {0}")]
    SchemaError(String),

    #[error("Column names could not be written to {path}: {reason}")]
    WriteError { path: String, reason: String },

    #[error("Row {row} could not be exported to {path}: {reason}")]
    RowProcessingError {
        path: String,
        row: u64,
        reason: String,
    },

    #[error("Error while finalizing export file {path}: {reason}")]
    FlushError { path: String, reason: String },

    #[error("Extraction task for {0} panicked")]
    TaskPanicked(String),

    #[error("Oracle error: {0}")]
    OracleError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<oracle::Error> for ExportError {
    fn from(e: oracle::Error) -> Self {
        ExportError::OracleError(e.to_string())
    }
}

impl ExportError {
    /// Short, stable name of the variant, used in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::ConfigError(_) => "CONFIG",
            ExportError::ConnectionError(_) => "CONNECTION",
            ExportError::FileCreateError { .. } => "FILE_CREATE",
            ExportError::QueryError { .. } => "QUERY",
            ExportError::SchemaError(_) => "SCHEMA",
            ExportError::WriteError { .. } => "WRITE",
            ExportError::RowProcessingError { .. } => "ROW_PROCESSING",
            ExportError::FlushError { .. } => "FLUSH",
            ExportError::TaskPanicked(_) => "PANIC",
            ExportError::OracleError(_) => "ORACLE",
            ExportError::IoError(_) => "IO",
        }
    }
}

/// A specialized Result type for the extractor.
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_names_query_and_cause() {
        let err = ExportError::QueryError {
            query: "SELECT * FROM missing".to_string(),
            reason: "ORA-00942: table or view does not exist".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SELECT * FROM missing"));
        assert!(msg.contains("ORA-00942"));
        assert_eq!(err.kind(), "QUERY");
    }

    #[test]
    fn test_file_create_error_names_path() {
        let err = ExportError::FileCreateError {
            path: "/no/such/dir/out.csv".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/no/such/dir/out.csv"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
