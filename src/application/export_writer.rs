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

//! # Export Writer
//!
//! Streams one query's result set into one delimited text file: a header
//! record of column names followed by one record per row, in cursor order.
//!
//! Partially written files are left on disk when a row fails; the file is a
//! diagnostic artifact, not a transaction.

use crate::domain::entities::ExportStats;
use crate::domain::errors::{ExportError, Result};
use crate::domain::row_serializer::serialize_row;
use crate::infrastructure::local_storage::output_file::OutputFile;
use crate::ports::query_port::{QueryPort, ResultCursor};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::debug;
use std::time::Instant;

/// Writes query results through a shared `QueryPort` using one delimiter.
pub struct ExportWriter<'a> {
    port: &'a dyn QueryPort,
    delimiter: u8,
}

impl<'a> ExportWriter<'a> {
    pub fn new(port: &'a dyn QueryPort, delimiter: u8) -> Self {
        Self { port, delimiter }
    }

    /// Runs `query` and writes its result set to `output_path`.
    ///
    /// The file is created (or truncated) before the query runs. The output
    /// file and the cursor are both released on every return path.
    pub fn export(&self, query: &str, output_path: &str) -> Result<ExportStats> {
        let start_time = Instant::now();
        debug!("Exporting '{}' to {}", query, output_path);

        let file = OutputFile::create(output_path).map_err(|source| {
            ExportError::FileCreateError {
                path: output_path.to_string(),
                source,
            }
        })?;

        let mut wtr = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .flexible(false)
            .from_writer(file);

        let mut stats = ExportStats::default();

        self.port
            .with_cursor(query, &mut |cursor: &mut dyn ResultCursor| -> Result<()> {
                let col_names = cursor
                    .columns()
                    .map_err(|e| ExportError::SchemaError(e.to_string()))?;

                wtr.write_record(&col_names)
                    .map_err(|e| ExportError::WriteError {
                        path: output_path.to_string(),
                        reason: e.to_string(),
                    })?;

                loop {
                    let row_num = stats.rows + 1;
                    let row_error = |reason: String| ExportError::RowProcessingError {
                        path: output_path.to_string(),
                        row: row_num,
                        reason,
                    };

                    let row = match cursor.next_row().map_err(|e| row_error(e.to_string()))? {
                        Some(row) => row,
                        None => break,
                    };

                    let record = serialize_row(&row);
                    wtr.write_record(&record)
                        .map_err(|e| row_error(e.to_string()))?;

                    stats.bytes += record.iter().map(|f| f.len() as u64).sum::<u64>();
                    stats.rows += 1;
                }

                Ok(())
            })?;

        let file = wtr.into_inner().map_err(|e| ExportError::FlushError {
            path: output_path.to_string(),
            reason: e.error().to_string(),
        })?;
        file.finish().map_err(|e| ExportError::FlushError {
            path: output_path.to_string(),
            reason: e.to_string(),
        })?;

        stats.duration = start_time.elapsed().as_secs_f64();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FieldValue;
    use crate::test_support::{FakeQueryPort, FakeResult};

    fn sample_port() -> FakeQueryPort {
        FakeQueryPort::new()
            .with_result(
                "SELECT a,b FROM t",
                FakeResult::table(
                    &["a", "b"],
                    vec![
                        vec![Some("1"), Some("x")],
                        vec![Some("2"), None],
                        vec![None, Some("z")],
                    ],
                ),
            )
            .with_result("SELECT x FROM empty", FakeResult::table(&["x"], vec![]))
    }

    #[test]
    fn test_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out1.csv");
        let out = out.to_str().unwrap();

        let port = sample_port();
        let stats = ExportWriter::new(&port, b',')
            .export("SELECT a,b FROM t", out)
            .unwrap();

        assert_eq!(stats.rows, 3);
        assert_eq!(stats.bytes, 4);
        let content = std::fs::read_to_string(out).unwrap();
        assert_eq!(content, "a,b\n1,x\n2,\n,z\n");

        let records: Vec<&str> = content.lines().collect();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.split(',').count() == 2));
    }

    #[test]
    fn test_custom_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.psv");
        let out = out.to_str().unwrap();

        let port = sample_port();
        ExportWriter::new(&port, b'|')
            .export("SELECT a,b FROM t", out)
            .unwrap();

        let content = std::fs::read_to_string(out).unwrap();
        assert_eq!(content, "a|b\n1|x\n2|\n|z\n");
        assert!(!content.contains(','));
    }

    #[test]
    fn test_empty_result_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.csv");
        let out = out.to_str().unwrap();

        let port = sample_port();
        let stats = ExportWriter::new(&port, b',')
            .export("SELECT x FROM empty", out)
            .unwrap();

        assert_eq!(stats.rows, 0);
        assert_eq!(std::fs::read_to_string(out).unwrap(), "x\n");
    }

    #[test]
    fn test_fields_containing_delimiter_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("quoted.csv");
        let out = out.to_str().unwrap();

        let port = FakeQueryPort::new().with_result(
            "q",
            FakeResult::table(&["name"], vec![vec![Some("Doe, John")], vec![Some("say \"hi\"")]]),
        );
        ExportWriter::new(&port, b',').export("q", out).unwrap();

        assert_eq!(
            std::fs::read_to_string(out).unwrap(),
            "name\n\"Doe, John\"\n\"say \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_binary_values_are_base64() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bin.csv");
        let out = out.to_str().unwrap();

        let mut result = FakeResult::table(&["id", "payload"], vec![]);
        result.rows.push(vec![
            FieldValue::Text("7".into()),
            FieldValue::Binary(vec![0xde, 0xad, 0xbe, 0xef]),
        ]);
        let port = FakeQueryPort::new().with_result("q", result);
        ExportWriter::new(&port, b',').export("q", out).unwrap();

        assert_eq!(std::fs::read_to_string(out).unwrap(), "id,payload\n7,3q2+7w==\n");
    }

    #[test]
    fn test_file_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("out.csv");
        let out = out.to_str().unwrap();

        let port = sample_port();
        let err = ExportWriter::new(&port, b',')
            .export("SELECT a,b FROM t", out)
            .unwrap_err();

        assert!(matches!(err, ExportError::FileCreateError { ref path, .. } if path == out));
        // The query must not run when the file cannot be created.
        assert!(port.executed().is_empty());
    }

    #[test]
    fn test_query_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bad.csv");
        let out = out.to_str().unwrap();

        let port = FakeQueryPort::new().with_result("SELECT nope", FakeResult::failing("ORA-00904"));
        let err = ExportWriter::new(&port, b',')
            .export("SELECT nope", out)
            .unwrap_err();

        match err {
            ExportError::QueryError { query, reason } => {
                assert_eq!(query, "SELECT nope");
                assert!(reason.contains("ORA-00904"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("schema.csv");
        let out = out.to_str().unwrap();

        let mut result = FakeResult::table(&["a"], vec![]);
        result.columns_error = Some("describe failed".into());
        let port = FakeQueryPort::new().with_result("q", result);

        let err = ExportWriter::new(&port, b',').export("q", out).unwrap_err();
        assert!(matches!(err, ExportError::SchemaError(_)));
    }

    #[test]
    fn test_mid_stream_failure_keeps_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("partial.csv");
        let out = out.to_str().unwrap();

        let mut result = FakeResult::table(
            &["n"],
            vec![vec![Some("1")], vec![Some("2")], vec![Some("3")]],
        );
        result.fail_at_row = Some(2);
        let port = FakeQueryPort::new().with_result("q", result);

        let err = ExportWriter::new(&port, b',').export("q", out).unwrap_err();
        match err {
            ExportError::RowProcessingError { path, row, reason } => {
                assert_eq!(path, out);
                assert_eq!(row, 3);
                assert!(reason.contains("ORA-03113"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Dropping the writer flushed what was buffered; nothing is cleaned up.
        assert_eq!(std::fs::read_to_string(out).unwrap(), "n\n1\n2\n");
    }

    #[test]
    fn test_row_width_mismatch_is_row_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("ragged.csv");
        let out = out.to_str().unwrap();

        let port = FakeQueryPort::new().with_result(
            "q",
            FakeResult::table(&["a", "b"], vec![vec![Some("1")]]),
        );
        let err = ExportWriter::new(&port, b',').export("q", out).unwrap_err();
        assert!(matches!(err, ExportError::RowProcessingError { row: 1, .. }));
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("again.csv");
        let out = out.to_str().unwrap();

        let port = sample_port();
        let writer = ExportWriter::new(&port, b',');
        writer.export("SELECT a,b FROM t", out).unwrap();
        let first = std::fs::read(out).unwrap();
        writer.export("SELECT a,b FROM t", out).unwrap();
        let second = std::fs::read(out).unwrap();

        assert_eq!(first, second);
    }
}
