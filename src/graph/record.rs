use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a lock owner (a SQL Server session id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockId(pub i64);

impl LockId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for LockId {
    fn from(value: i64) -> Self {
        LockId(value)
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session and lock metadata carried by a lock row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_time_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
}

impl LockDetail {
    /// Fill fields that are still empty from `other`. Populated fields are kept.
    pub fn enrich(&mut self, other: &LockDetail) {
        fill(&mut self.login, &other.login);
        fill(&mut self.host, &other.host);
        fill(&mut self.program, &other.program);
        fill(&mut self.database, &other.database);
        fill(&mut self.command, &other.command);
        fill(&mut self.status, &other.status);
        fill(&mut self.wait_type, &other.wait_type);
        fill(&mut self.wait_time_ms, &other.wait_time_ms);
        fill(&mut self.wait_resource, &other.wait_resource);
        fill(&mut self.resource_type, &other.resource_type);
        fill(&mut self.lock_mode, &other.lock_mode);
        fill(&mut self.object_name, &other.object_name);
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(value);
    }
}

/// One row fetched from the engine's lock and session views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    pub id: LockId,
    pub holder_id: Option<LockId>,
    pub detail: LockDetail,
}

impl LockRecord {
    pub fn new(id: impl Into<LockId>, holder_id: Option<LockId>) -> Self {
        Self {
            id: id.into(),
            holder_id,
            detail: LockDetail::default(),
        }
    }

    pub fn with_detail(mut self, detail: LockDetail) -> Self {
        self.detail = detail;
        self
    }
}

/// A single granted or requested lock, used for the node detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockItem {
    pub session_id: LockId,
    pub resource_type: Option<String>,
    pub resource_description: Option<String>,
    pub request_mode: Option<String>,
    pub request_status: Option<String>,
    pub object_name: Option<String>,
}
