//! CSV export
//!
//! Written once at the end of a run: a header row (unnamed leading index
//! column plus the record fields in declaration order), then one row per
//! record.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::ScrapeError;
use crate::player::{PlayerRecord, FIELD_NAMES};

pub fn write_csv<'a, I>(path: &Path, records: I) -> Result<PathBuf, ScrapeError>
where
    I: IntoIterator<Item = &'a PlayerRecord>,
{
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = Vec::with_capacity(FIELD_NAMES.len() + 1);
    header.push("");
    header.extend(FIELD_NAMES);
    writer.write_record(&header)?;

    for (index, record) in records.into_iter().enumerate() {
        let mut row = Vec::with_capacity(FIELD_NAMES.len() + 1);
        row.push(index.to_string());
        row.extend(record.to_row());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(path.to_path_buf())
}

/// Debug-mode companion dump: the raw records as timestamped pretty JSON
/// beside the CSV. Failures are logged, never fatal.
pub fn dump_debug_json<'a, I>(csv_path: &Path, records: I)
where
    I: IntoIterator<Item = &'a PlayerRecord>,
{
    let dir = csv_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("players_{}.json", timestamp));

    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Failed to create dump directory: {}", e);
        return;
    }

    let records: Vec<&PlayerRecord> = records.into_iter().collect();
    match serde_json::to_string_pretty(&records) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&path, json) {
                error!("Failed to save debug dump: {}", e);
            } else {
                info!("Saved debug dump to {:?}", path);
            }
        }
        Err(e) => error!("Failed to serialize records: {}", e),
    }
}
