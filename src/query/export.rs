use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value};
use std::io;
use std::path::Path;
use tracing::{error, info};
use uuid::Uuid;

/// A rendered CSV ready for the response (base64) and, optionally, disk.
pub struct CsvExport {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl CsvExport {
    pub fn base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// Renders flattened records as CSV. The header is the union of record keys
/// in first-seen order; null or missing values render as empty cells, strings
/// render bare, everything else renders as its JSON text. Returns None when
/// there are no rows.
pub fn export(records: &[Map<String, Value>]) -> Result<Option<CsvExport>, csv::Error> {
    if records.is_empty() {
        return Ok(None);
    }

    let headers = collect_headers(records);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for record in records {
        let row: Vec<String> = headers.iter().map(|h| cell(record.get(h))).collect();
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(io::Error::other(e.to_string())))?;

    let filename = format!("result_{}.csv", &Uuid::new_v4().simple().to_string()[..8]);

    Ok(Some(CsvExport { bytes, filename }))
}

/// Fire-and-forget disk copy; failures are logged, never surfaced. Filenames
/// are randomized per write, so no locking is needed.
pub fn write_to_dir(export: &CsvExport, dir: &Path) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        error!("failed to create CSV export directory {}: {}", dir.display(), e);
        return;
    }
    let path = dir.join(&export.filename);
    match std::fs::write(&path, &export.bytes) {
        Ok(()) => info!("wrote CSV export to {}", path.display()),
        Err(e) => error!("failed to write CSV export to {}: {}", path.display(), e),
    }
}

fn collect_headers(records: &[Map<String, Value>]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
