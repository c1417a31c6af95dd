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

//! # Runtime Context
//!
//! Sets up the resources shared by every extraction task: the Oracle
//! connection pool and the query port built on top of it.

use crate::config::AppConfig;
use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::oracle::connection_manager::{
    build_connect_string, OracleConnectionManager,
};
use crate::infrastructure::oracle::oracle_query_adapter::OracleQueryAdapter;
use crate::ports::query_port::QueryPort;
use log::info;
use r2d2::Pool;
use std::sync::Arc;

/// `RuntimeContext` holds shared resources that exist for the whole run.
pub struct RuntimeContext {
    pub pool: Arc<Pool<OracleConnectionManager>>,
    pub prefetch_rows: u32,
}

impl RuntimeContext {
    /// Connects to the database described by `config`.
    ///
    /// The pool is sized to the concurrency limit, so every active export can
    /// hold one connection. Building it opens a connection up front, which
    /// surfaces an unreachable server here rather than in the first task.
    pub fn init(config: &AppConfig) -> Result<Self> {
        let conn_str = build_connect_string(&config.server, &config.database);
        let username = config.username.clone().unwrap_or_default();
        let password = resolve_password(config);

        info!("Initializing connection pool for {}...", conn_str);

        let manager = OracleConnectionManager::new(&username, &password, &conn_str);
        let pool_size = config.concurrency_limit().max(1) as u32;

        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| {
                ExportError::ConnectionError(format!("{} on {}: {}", config.database, config.server, e))
            })?;

        Ok(Self {
            pool: Arc::new(pool),
            prefetch_rows: config.prefetch(),
        })
    }

    pub fn query_port(&self) -> Arc<dyn QueryPort> {
        Arc::new(OracleQueryAdapter::new(self.pool.clone(), self.prefetch_rows))
    }
}

/// The config password wins; otherwise `ORACLE_PASSWORD`, otherwise empty.
fn resolve_password(config: &AppConfig) -> String {
    config
        .password
        .clone()
        .or_else(|| std::env::var("ORACLE_PASSWORD").ok())
        .unwrap_or_default()
}
