use anyhow::Result;
use tiberius::Query;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::config::ConnectionSettings;
use crate::db::client;
use crate::db::connection::describe_target;
use crate::db::executor::{self, SqlClient};
use crate::db::queries;
use crate::db::types::{ResultSet, RowRef};
use crate::error::AppError;
use crate::graph::{LockDetail, LockId, LockItem, LockRecord};
use crate::source::{IsolationLevel, LockSource, ServerSession, SessionControl};

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub database: Option<String>,
    pub login: Option<String>,
    pub host: Option<String>,
    pub status: Option<String>,
    pub blocked_only: bool,
    pub limit: u64,
}

/// Live connection to a SQL Server instance.
pub struct SqlServerSource {
    runtime: Runtime,
    client: SqlClient,
    target: String,
    database_filter: Option<String>,
}

impl SqlServerSource {
    pub fn connect(settings: &ConnectionSettings, database_filter: Option<String>) -> Result<Self> {
        let runtime = Runtime::new()?;
        let client = runtime.block_on(client::connect(settings))?;
        Ok(Self {
            runtime,
            client,
            target: describe_target(settings),
            database_filter,
        })
    }

    pub fn fetch_sessions(&mut self, filter: &SessionFilter) -> Result<Vec<ServerSession>> {
        let client = &mut self.client;
        let result_set = self.runtime.block_on(async {
            let mut query = Query::new(queries::SESSIONS);
            query.bind(filter.database.as_deref());
            query.bind(filter.login.as_deref());
            query.bind(filter.host.as_deref());
            query.bind(filter.status.as_deref());
            query.bind(i32::from(filter.blocked_only));
            query.bind(filter.limit as i64);
            executor::run_single(query, client).await
        })?;
        Ok(sessions_from_result_set(&result_set))
    }

    /// The server-side session id of this connection.
    pub fn own_session_id(&mut self) -> Result<Option<LockId>> {
        let client = &mut self.client;
        let result_set = self.runtime.block_on(async {
            executor::run_single(Query::new(queries::STATUS), client).await
        })?;
        Ok(result_set
            .rows()
            .next()
            .and_then(|row| row.i64("sessionId"))
            .map(LockId))
    }
}

impl LockSource for SqlServerSource {
    fn describe(&self) -> String {
        self.target.clone()
    }

    fn fetch_locks(&mut self) -> Result<Vec<LockRecord>> {
        let client = &mut self.client;
        let database_filter = self.database_filter.as_deref();
        let result_set = self.runtime.block_on(async {
            let mut query = Query::new(queries::LOCK_ROWS);
            query.bind(database_filter);
            executor::run_single(query, client).await
        })?;
        let records = records_from_result_set(&result_set);
        info!(rows = records.len(), source = %self.target, "fetched lock rows");
        Ok(records)
    }

    fn fetch_lock_items(&mut self, key: LockId) -> Result<Vec<LockItem>> {
        let client = &mut self.client;
        let result_set = self.runtime.block_on(async {
            let mut query = Query::new(queries::LOCK_ITEMS);
            query.bind(key.get());
            executor::run_single(query, client).await
        })?;
        Ok(result_set
            .rows()
            .map(|row| LockItem {
                session_id: row.i64("sessionId").map(LockId).unwrap_or(key),
                resource_type: row.text("resourceType"),
                resource_description: row.text("resourceDescription"),
                request_mode: row.text("requestMode"),
                request_status: row.text("requestStatus"),
                object_name: row.text("objectName"),
            })
            .collect())
    }
}

impl SessionControl for SqlServerSource {
    fn terminate_session(&mut self, id: LockId) -> Result<()> {
        if id.get() <= 0 {
            return Err(AppError::input(format!("Invalid session id: {}", id)).into());
        }
        let sql = queries::kill_session(id.get());
        self.runtime
            .block_on(executor::run_statement(&sql, &mut self.client))?;
        info!(session = %id, "terminated session");
        Ok(())
    }
}

/// Decode lock rows; a missing or zero holder means the row is not waiting.
pub(crate) fn records_from_result_set(result_set: &ResultSet) -> Vec<LockRecord> {
    result_set
        .rows()
        .filter_map(|row| {
            let Some(id) = row.i64("id") else {
                debug!(holder = ?row.i64("holderId"), "skipping lock row without a session id");
                return None;
            };
            let holder_id = row.i64("holderId").filter(|h| *h != 0).map(LockId);
            Some(LockRecord::new(id, holder_id).with_detail(detail_from_row(&row)))
        })
        .collect()
}

fn detail_from_row(row: &RowRef<'_>) -> LockDetail {
    LockDetail {
        login: row.text("login"),
        host: row.text("host"),
        program: row.text("program"),
        database: row.text("databaseName"),
        command: row.text("command"),
        status: row.text("status"),
        wait_type: row.text("waitType"),
        wait_time_ms: row.i64("waitTimeMs"),
        wait_resource: row.text("waitResource"),
        resource_type: row.text("resourceType"),
        lock_mode: row.text("lockMode"),
        object_name: row.text("objectName"),
    }
}

fn sessions_from_result_set(result_set: &ResultSet) -> Vec<ServerSession> {
    result_set
        .rows()
        .filter_map(|row| {
            Some(ServerSession {
                id: LockId(row.i64("sessionId")?),
                login: row.text("loginName"),
                host: row.text("hostName"),
                program: row.text("programName"),
                database: row.text("databaseName"),
                status: row.text("status"),
                command: row.text("command"),
                wait_type: row.text("waitType"),
                blocked_by: row.i64("blockedBy").filter(|h| *h != 0).map(LockId),
                elapsed_ms: row.i64("elapsedMs"),
                isolation_level: IsolationLevel::from_code(
                    row.i64("isolationLevel").unwrap_or(0),
                ),
                login_time: row.text("loginTime"),
                active_query: row.text("activeQuery"),
            })
        })
        .collect()
}
