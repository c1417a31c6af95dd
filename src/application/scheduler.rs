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

//! # Extraction Scheduler
//!
//! Runs one export per job on its own thread while never letting more than
//! `concurrency_limit` exports be active at once.
//!
//! The admission gate is a bounded channel: sending a token takes a slot and
//! blocks while the gate is full, receiving a token gives it back. The slot
//! is returned the moment the export itself returns, so the gate counts
//! active exports rather than spawned threads. The thread scope is the join
//! barrier: `execute` returns only once every launched task has settled.

use crate::application::export_writer::ExportWriter;
use crate::domain::entities::{ExtractionJob, TaskResult};
use crate::domain::errors::{ExportError, Result};
use crate::ports::query_port::QueryPort;
use crossbeam_channel::{bounded, Receiver};
use log::{error, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Per-job results of one scheduler pass.
#[derive(Debug)]
pub struct RunOutcome {
    /// One entry per job, in job order.
    pub results: Vec<TaskResult>,
    /// The first failure, in completion order.
    pub first_error: Option<ExportError>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.first_error.is_none()
    }

    pub fn into_result(self) -> Result<()> {
        match self.first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Holds one gate slot; dropping it hands the slot back.
struct GateSlot<'a> {
    gate: &'a Receiver<()>,
}

impl Drop for GateSlot<'_> {
    fn drop(&mut self) {
        // Our own token is in the channel, so this never blocks.
        let _ = self.gate.recv();
    }
}

enum Launched<'scope> {
    Running(thread::ScopedJoinHandle<'scope, TaskResult>),
    Skipped(TaskResult),
}

/// Owns the shared query port and the concurrency policy for a run.
pub struct ExtractionScheduler {
    port: Arc<dyn QueryPort>,
    delimiter: u8,
    concurrency_limit: usize,
    fail_fast: bool,
}

impl ExtractionScheduler {
    pub fn new(
        port: Arc<dyn QueryPort>,
        delimiter: u8,
        concurrency_limit: usize,
        fail_fast: bool,
    ) -> Self {
        Self {
            port,
            delimiter,
            concurrency_limit,
            fail_fast,
        }
    }

    /// Runs every job and fails with the first error any of them reported.
    pub fn run(&self, jobs: &[ExtractionJob]) -> Result<()> {
        self.execute(jobs)?.into_result()
    }

    /// Runs every job and reports each outcome.
    ///
    /// With `fail_fast` set, the first failure stops further admissions:
    /// jobs still waiting for a slot are reported as skipped, while exports
    /// already running are left to finish.
    pub fn execute(&self, jobs: &[ExtractionJob]) -> Result<RunOutcome> {
        if self.concurrency_limit == 0 {
            return Err(ExportError::ConfigError(
                "concurrency limit must be at least 1".to_string(),
            ));
        }

        info!(
            "Scheduling {} extraction(s) with at most {} running at once",
            jobs.len(),
            self.concurrency_limit
        );

        let (gate_tx, gate_rx) = bounded::<()>(self.concurrency_limit);
        let cancelled = AtomicBool::new(false);
        let first_error: Mutex<Option<ExportError>> = Mutex::new(None);
        let writer = ExportWriter::new(self.port.as_ref(), self.delimiter);

        let record_error = |e: ExportError| {
            let mut guard = first_error.lock().unwrap_or_else(|p| p.into_inner());
            if guard.is_none() {
                *guard = Some(e);
            }
        };

        let results = thread::scope(|s| {
            let mut launched = Vec::with_capacity(jobs.len());

            for job in jobs {
                // Blocks while the gate is full. The receiver lives in this
                // frame, so the channel cannot be disconnected here.
                let _ = gate_tx.send(());
                let slot = GateSlot { gate: &gate_rx };

                if self.fail_fast && cancelled.load(Ordering::SeqCst) {
                    drop(slot);
                    warn!("Skipping extraction for {} after an earlier failure", job.output_file);
                    launched.push(Launched::Skipped(TaskResult::skipped(job)));
                    continue;
                }

                let writer = &writer;
                let cancelled = &cancelled;
                let record_error = &record_error;
                let handle = s.spawn(move || {
                    let outcome = {
                        let _slot = slot;
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                            writer.export(&job.query, &job.output_file)
                        }));
                        // Raised before the slot is released, so the next
                        // admission already sees it.
                        if !matches!(outcome, Ok(Ok(_))) {
                            cancelled.store(true, Ordering::SeqCst);
                        }
                        outcome
                    };

                    match outcome {
                        Ok(Ok(stats)) => {
                            info!(
                                "Extraction completed for {} ({} rows in {:.2}s)",
                                job.output_file, stats.rows, stats.duration
                            );
                            TaskResult::success(job, stats)
                        }
                        Ok(Err(e)) => {
                            error!("Extraction failed for {}: {}", job.output_file, e);
                            let result = TaskResult::failure(job, e.to_string());
                            record_error(e);
                            result
                        }
                        Err(_) => {
                            let e = ExportError::TaskPanicked(job.output_file.clone());
                            error!("{}", e);
                            let result = TaskResult::failure(job, e.to_string());
                            record_error(e);
                            result
                        }
                    }
                });
                launched.push(Launched::Running(handle));
            }

            launched
                .into_iter()
                .zip(jobs)
                .map(|(l, job)| match l {
                    Launched::Skipped(result) => result,
                    Launched::Running(handle) => handle.join().unwrap_or_else(|_| {
                        let e = ExportError::TaskPanicked(job.output_file.clone());
                        let result = TaskResult::failure(job, e.to_string());
                        record_error(e);
                        result
                    }),
                })
                .collect::<Vec<_>>()
        });

        Ok(RunOutcome {
            results,
            first_error: first_error.into_inner().unwrap_or_else(|p| p.into_inner()),
        })
    }
}
