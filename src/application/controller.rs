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

//! # Run Controller
//!
//! Drives one whole run: connect, schedule every job, time it, and decide
//! whether the run as a whole succeeded.
//!
//! `Idle -> Connecting -> Scheduling -> {AllSucceeded | OneOrMoreFailed} -> Terminated`
//!
//! A connection failure jumps straight to `Terminated`. There is no retry.

use crate::application::report::write_report;
use crate::application::scheduler::ExtractionScheduler;
use crate::config::AppConfig;
use crate::domain::entities::{RunState, TaskResult};
use crate::domain::errors::{ExportError, Result};
use crate::ports::query_port::QueryPort;
use log::{error, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Wall-clock timer for a run.
pub struct RunTimer {
    start: Instant,
}

impl RunTimer {
    pub fn start(database: &str, server: &str) -> Self {
        info!("Begin extraction process for {} on {}.", database, server);
        Self {
            start: Instant::now(),
        }
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        info!("Completed extraction process in {:?}", elapsed);
        elapsed
    }
}

/// What a run did and how it ended.
#[derive(Debug)]
pub struct RunSummary {
    /// Every state the run passed through, in order.
    pub states: Vec<RunState>,
    pub results: Vec<TaskResult>,
    pub elapsed: Duration,
    /// The first error of the run, if any.
    pub error: Option<ExportError>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<TaskResult>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.results),
        }
    }
}

pub struct RunController {
    config: AppConfig,
}

impl RunController {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Runs every configured job.
    ///
    /// `connect` opens the shared query port; it is called once.
    pub fn run<F>(&self, connect: F) -> RunSummary
    where
        F: FnOnce(&AppConfig) -> Result<Arc<dyn QueryPort>>,
    {
        let mut states = vec![RunState::Idle];
        let timer = RunTimer::start(&self.config.database, &self.config.server);

        let (results, error) = match self.connect_and_schedule(connect, &mut states) {
            Ok((results, first_error)) => (results, first_error),
            Err(e) => (Vec::new(), Some(e)),
        };

        let elapsed = timer.finish();

        if let Some(path) = &self.config.report_file {
            match write_report(path, &results, elapsed.as_secs_f64()) {
                Ok(()) => info!("Run report written to {}", path),
                Err(e) => error!("Could not write run report {}: {}", path, e),
            }
        }

        transition(&mut states, RunState::Terminated);
        RunSummary {
            states,
            results,
            elapsed,
            error,
        }
    }

    fn connect_and_schedule<F>(
        &self,
        connect: F,
        states: &mut Vec<RunState>,
    ) -> Result<(Vec<TaskResult>, Option<ExportError>)>
    where
        F: FnOnce(&AppConfig) -> Result<Arc<dyn QueryPort>>,
    {
        transition(states, RunState::Connecting);
        let delimiter = self.config.delimiter_byte()?;
        let port = connect(&self.config)?;

        transition(states, RunState::Scheduling);
        let scheduler = ExtractionScheduler::new(
            port,
            delimiter,
            self.config.concurrency_limit(),
            self.config.is_fail_fast(),
        );
        let outcome = scheduler.execute(&self.config.jobs())?;

        let succeeded = outcome.results.iter().filter(|r| r.is_success()).count();
        info!(
            "Extraction finished. {}/{} outputs successful.",
            succeeded,
            outcome.results.len()
        );
        if outcome.is_success() {
            transition(states, RunState::AllSucceeded);
        } else {
            transition(states, RunState::OneOrMoreFailed);
        }

        Ok((outcome.results, outcome.first_error))
    }
}

fn transition(states: &mut Vec<RunState>, next: RunState) {
    if let Some(prev) = states.last() {
        info!("Run state {} -> {}", prev, next);
    }
    states.push(next);
}
