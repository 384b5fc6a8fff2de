use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AppError;
use crate::graph::{LockDetail, LockId, LockItem, LockRecord};
use crate::source::LockSource;

/// Flat lock row as stored in CSV or JSON snapshot files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRow {
    pub id: i64,
    #[serde(default)]
    pub holder_id: Option<i64>,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub wait_type: Option<String>,
    #[serde(default)]
    pub wait_time_ms: Option<i64>,
    #[serde(default)]
    pub wait_resource: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_description: Option<String>,
    #[serde(default)]
    pub lock_mode: Option<String>,
    #[serde(default)]
    pub request_status: Option<String>,
    #[serde(default)]
    pub object_name: Option<String>,
}

impl SnapshotRow {
    pub fn to_record(&self) -> LockRecord {
        let holder_id = self.holder_id.filter(|h| *h != 0).map(LockId);
        LockRecord::new(self.id, holder_id).with_detail(LockDetail {
            login: non_empty(&self.login),
            host: non_empty(&self.host),
            program: non_empty(&self.program),
            database: non_empty(&self.database),
            command: non_empty(&self.command),
            status: non_empty(&self.status),
            wait_type: non_empty(&self.wait_type),
            wait_time_ms: self.wait_time_ms,
            wait_resource: non_empty(&self.wait_resource),
            resource_type: non_empty(&self.resource_type),
            lock_mode: non_empty(&self.lock_mode),
            object_name: non_empty(&self.object_name),
        })
    }

    /// `None` for rows that describe a session but carry no lock.
    pub fn to_lock_item(&self) -> Option<LockItem> {
        let resource_type = non_empty(&self.resource_type);
        let request_mode = non_empty(&self.lock_mode);
        if resource_type.is_none() && request_mode.is_none() {
            return None;
        }
        Some(LockItem {
            session_id: LockId(self.id),
            resource_type,
            resource_description: non_empty(&self.resource_description),
            request_mode,
            request_status: non_empty(&self.request_status),
            object_name: non_empty(&self.object_name),
        })
    }
}

impl From<&LockRecord> for SnapshotRow {
    fn from(record: &LockRecord) -> Self {
        let detail = &record.detail;
        Self {
            id: record.id.get(),
            holder_id: record.holder_id.map(LockId::get),
            login: detail.login.clone(),
            host: detail.host.clone(),
            program: detail.program.clone(),
            database: detail.database.clone(),
            command: detail.command.clone(),
            status: detail.status.clone(),
            wait_type: detail.wait_type.clone(),
            wait_time_ms: detail.wait_time_ms,
            wait_resource: detail.wait_resource.clone(),
            resource_type: detail.resource_type.clone(),
            resource_description: None,
            lock_mode: detail.lock_mode.clone(),
            request_status: None,
            object_name: detail.object_name.clone(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSnapshot {
    Rows(Vec<SnapshotRow>),
    Wrapped { records: Vec<SnapshotRow> },
}

/// Lock rows replayed from a file captured earlier (`locks --csv` or `locks --json`).
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
    rows: Vec<SnapshotRow>,
}

impl SnapshotSource {
    pub fn open(path: &Path) -> Result<Self> {
        let rows = read_rows(path)?;
        info!(rows = rows.len(), path = %path.display(), "loaded lock snapshot");
        Ok(Self {
            path: path.to_path_buf(),
            rows,
        })
    }

    /// Keep only rows captured in `database` (case-insensitive), as the live query filters.
    pub fn with_database_filter(mut self, database: Option<&str>) -> Self {
        if let Some(name) = database {
            let before = self.rows.len();
            self.rows.retain(|row| {
                row.database
                    .as_deref()
                    .is_some_and(|db| db.trim().eq_ignore_ascii_case(name))
            });
            debug!(database = name, kept = self.rows.len(), before, "filtered lock snapshot");
        }
        self
    }
}

impl LockSource for SnapshotSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_locks(&mut self) -> Result<Vec<LockRecord>> {
        Ok(self.rows.iter().map(SnapshotRow::to_record).collect())
    }

    fn fetch_lock_items(&mut self, key: LockId) -> Result<Vec<LockItem>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.id == key.get())
            .filter_map(SnapshotRow::to_lock_item)
            .collect())
    }
}

fn read_rows(path: &Path) -> Result<Vec<SnapshotRow>> {
    if !path.is_file() {
        return Err(AppError::input(format!("Snapshot file not found: {}", path.display())).into());
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => read_csv(path),
        Some("json") => read_json(path),
        _ => Err(AppError::input(format!(
            "Unsupported snapshot extension (expected .csv or .json): {}",
            path.display()
        ))
        .into()),
    }
}

fn read_csv(path: &Path) -> Result<Vec<SnapshotRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open snapshot: {}", path.display()))?;
    let mut rows = Vec::new();
    for (line, row) in reader.deserialize::<SnapshotRow>().enumerate() {
        let row = row.map_err(|err| {
            AppError::input(format!(
                "Invalid snapshot row {} in {}: {}",
                line + 1,
                path.display(),
                err
            ))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_json(path: &Path) -> Result<Vec<SnapshotRow>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    let snapshot: JsonSnapshot = serde_json::from_str(&content).map_err(|err| {
        AppError::input(format!("Invalid JSON snapshot {}: {}", path.display(), err))
    })?;
    Ok(match snapshot {
        JsonSnapshot::Rows(rows) => rows,
        JsonSnapshot::Wrapped { records } => records,
    })
}
