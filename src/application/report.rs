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

//! JSON run report: summary totals plus one entry per job.

use crate::domain::entities::{TaskResult, TaskStatus};
use crate::domain::errors::{ExportError, Result};
use serde_json::json;
use std::path::Path;

pub fn write_report(path: &str, results: &[TaskResult], duration_secs: f64) -> Result<()> {
    let count = |status: TaskStatus| results.iter().filter(|r| r.status == status).count();
    let total_rows: u64 = results.iter().map(|r| r.rows).sum();
    let total_bytes: u64 = results.iter().map(|r| r.bytes).sum();

    let report = json!({
        "summary": {
            "total_tasks": results.len(),
            "success": count(TaskStatus::Success),
            "failed": count(TaskStatus::Failed),
            "skipped": count(TaskStatus::Skipped),
            "total_rows": total_rows,
            "total_bytes": total_bytes,
            "total_duration_seconds": duration_secs,
            "generated_at": chrono::Local::now().to_rfc3339(),
        },
        "details": results
    });

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &report)
        .map_err(|e| ExportError::IoError(std::io::Error::other(e)))?;

    Ok(())
}
