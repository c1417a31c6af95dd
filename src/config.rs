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

use crate::domain::entities::ExtractionJob;
use crate::domain::errors::{ExportError, Result};
use clap::Parser;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_MAX_CONCURRENT: usize = 10;
pub const DEFAULT_PREFETCH_ROWS: u32 = 5000;

/// Run configuration, read from YAML (or JSON).
///
/// `queries[i]` is written to `outfiles[i]`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub delimiter: String,
    pub server: String,
    pub database: String,
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub outfiles: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub max_concurrent: Option<usize>,
    pub prefetch_rows: Option<u32>,
    pub fail_fast: Option<bool>,
    pub report_file: Option<String>,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// A YAML (or JSON) file with the list of queries to extract
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    // Overrides for ad-hoc runs
    #[arg(long)]
    pub parallel: Option<usize>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub report: Option<String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ExportError::ConfigError(format!("cannot open {}: {}", path, e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ExportError::ConfigError(format!("cannot read {}: {}", path, e)))?;

        let config: AppConfig = if path.ends_with(".json") {
            serde_json::from_str(&contents)
                .map_err(|e| ExportError::ConfigError(format!("{}: {}", path, e)))?
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|e| ExportError::ConfigError(format!("{}: {}", path, e)))?
        };

        Ok(config)
    }

    pub fn merge_cli(&mut self, args: &CliArgs) {
        if let Some(p) = args.parallel { self.max_concurrent = Some(p); }
        if let Some(u) = &args.username { self.username = Some(u.clone()); }
        if let Some(p) = &args.password { self.password = Some(p.clone()); }
        if let Some(r) = &args.report { self.report_file = Some(r.clone()); }
    }

    /// Checks everything the run relies on before any connection is made.
    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;

        if self.server.trim().is_empty() {
            return Err(ExportError::ConfigError("server must not be empty".into()));
        }
        if self.database.trim().is_empty() {
            return Err(ExportError::ConfigError("database must not be empty".into()));
        }
        if self.queries.len() != self.outfiles.len() {
            return Err(ExportError::ConfigError(format!(
                "{} queries but {} outfiles; each query needs exactly one output file",
                self.queries.len(),
                self.outfiles.len()
            )));
        }
        if self.concurrency_limit() == 0 {
            return Err(ExportError::ConfigError("max_concurrent must be at least 1".into()));
        }

        let mut seen = HashSet::new();
        for out in &self.outfiles {
            if !seen.insert(out.as_str()) {
                return Err(ExportError::ConfigError(format!(
                    "output file {} is used by more than one query",
                    out
                )));
            }
        }

        Ok(())
    }

    /// The field delimiter as a single byte.
    pub fn delimiter_byte(&self) -> Result<u8> {
        let mut chars = self.delimiter.chars();
        let c = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(ExportError::ConfigError(format!(
                    "delimiter must be exactly one character, got {:?}",
                    self.delimiter
                )))
            }
        };
        if !c.is_ascii() || matches!(c, '"' | '\r' | '\n') {
            return Err(ExportError::ConfigError(format!(
                "delimiter {:?} is not usable as a field separator",
                c
            )));
        }
        Ok(c as u8)
    }

    pub fn jobs(&self) -> Vec<ExtractionJob> {
        self.queries
            .iter()
            .zip(&self.outfiles)
            .map(|(q, o)| ExtractionJob::new(q.as_str(), o.as_str()))
            .collect()
    }

    pub fn concurrency_limit(&self) -> usize {
        self.max_concurrent.unwrap_or(DEFAULT_MAX_CONCURRENT)
    }

    pub fn prefetch(&self) -> u32 {
        self.prefetch_rows.unwrap_or(DEFAULT_PREFETCH_ROWS)
    }

    pub fn is_fail_fast(&self) -> bool {
        self.fail_fast.unwrap_or(true)
    }
}
