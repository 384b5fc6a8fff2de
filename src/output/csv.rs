use std::path::Path;

use anyhow::{Context, Result};

use crate::graph::LockRecord;
use crate::source::SnapshotRow;

/// Write lock rows in the snapshot layout `SnapshotSource` reads back.
pub fn write_lock_records(path: &Path, records: &[LockRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for record in records {
        writer.serialize(SnapshotRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}
