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

use oracle::{Connection, Connector, Error};
use r2d2::ManageConnection;

/// R2D2 connection manager for Oracle.
///
/// An empty user name switches to external (OS) authentication, the
/// equivalent of an integrated login.
#[derive(Debug)]
pub struct OracleConnectionManager {
    user: String,
    pass: String,
    conn_str: String,
}

impl OracleConnectionManager {
    pub fn new(user: &str, pass: &str, conn_str: &str) -> Self {
        Self {
            user: user.to_string(),
            pass: pass.to_string(),
            conn_str: conn_str.to_string(),
        }
    }

    pub fn uses_external_auth(&self) -> bool {
        self.user.is_empty()
    }
}

impl ManageConnection for OracleConnectionManager {
    type Connection = Connection;
    type Error = Error;

    fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        let mut connector = Connector::new(&self.user, &self.pass, &self.conn_str);
        if self.uses_external_auth() {
            connector.external_auth(true);
        }
        connector.connect()
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.ping()
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// Builds an Easy Connect string from the configured server and database.
///
/// `server` may already be a full descriptor (`//host:port/service`), in which
/// case it is kept and `database` is only appended when no service is present.
pub fn build_connect_string(server: &str, database: &str) -> String {
    let server = server.trim();
    let database = database.trim();
    let base = server.trim_start_matches("//");
    if base.contains('/') || database.is_empty() {
        format!("//{}", base)
    } else {
        format!("//{}/{}", base, database)
    }
}
