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

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use sql_extract::application::controller::RunController;
use sql_extract::application::runtime::RuntimeContext;
use sql_extract::config::{AppConfig, CliArgs};
use std::process;

fn main() {
    // 1. Initialize Logging
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // 2. Parse Arguments
    let args = CliArgs::parse();

    // 3. Load Config
    let mut config = match AppConfig::from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            process::exit(1);
        }
    };

    // Merge CLI overrides
    config.merge_cli(&args);

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    // 4. Run
    let summary = RunController::new(config)
        .run(|cfg| RuntimeContext::init(cfg).map(|ctx| ctx.query_port()));

    match summary.into_result() {
        Ok(results) => {
            info!("All {} extraction(s) completed successfully.", results.len());
        }
        Err(e) => {
            error!("Extraction failed: {}", e);
            process::exit(1);
        }
    }
}
