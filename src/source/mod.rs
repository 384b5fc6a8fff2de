//! Where lock rows come from.
//!
//! The graph only sees decoded [`LockRecord`]s. Each source implements the
//! capabilities it actually has: every source can produce lock rows and lock
//! items, only a live connection can terminate a session.

mod snapshot;
mod sqlserver;

use anyhow::Result;
use serde::Serialize;

use crate::graph::{LockId, LockItem, LockRecord};

pub use snapshot::{SnapshotRow, SnapshotSource};
pub use sqlserver::{SessionFilter, SqlServerSource};

pub trait LockSource {
    /// Short label for logs and output, e.g. `db.example:1433/master`.
    fn describe(&self) -> String;

    fn fetch_locks(&mut self) -> Result<Vec<LockRecord>>;

    /// Locks requested or granted to the owner identified by `key`.
    fn fetch_lock_items(&mut self, key: LockId) -> Result<Vec<LockItem>>;
}

pub trait SessionControl {
    fn terminate_session(&mut self, id: LockId) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    Unspecified,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
    Snapshot,
}

impl IsolationLevel {
    /// Maps `sys.dm_exec_sessions.transaction_isolation_level`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => IsolationLevel::ReadUncommitted,
            2 => IsolationLevel::ReadCommitted,
            3 => IsolationLevel::RepeatableRead,
            4 => IsolationLevel::Serializable,
            5 => IsolationLevel::Snapshot,
            _ => IsolationLevel::Unspecified,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            IsolationLevel::Unspecified => "Unspecified",
            IsolationLevel::ReadUncommitted => "Read Uncommitted",
            IsolationLevel::ReadCommitted => "Read Committed",
            IsolationLevel::RepeatableRead => "Repeatable Read",
            IsolationLevel::Serializable => "Serializable",
            IsolationLevel::Snapshot => "Snapshot",
        }
    }
}

impl Serialize for IsolationLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSession {
    pub id: LockId,
    pub login: Option<String>,
    pub host: Option<String>,
    pub program: Option<String>,
    pub database: Option<String>,
    pub status: Option<String>,
    pub command: Option<String>,
    pub wait_type: Option<String>,
    pub blocked_by: Option<LockId>,
    pub elapsed_ms: Option<i64>,
    pub isolation_level: IsolationLevel,
    pub login_time: Option<String>,
    pub active_query: Option<String>,
}
