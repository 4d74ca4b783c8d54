use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::dataset::Dataset;

/// Read a delimited text file into a `Dataset`. The first record is the
/// header; the delimiter comes from the file extension (`.tsv`/`.tab` uses a
/// tab, anything else a comma).
pub fn load_path(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header from {}", path.display()))?
        .clone();
    if headers.is_empty() {
        anyhow::bail!("{}: a header row is required", path.display());
    }
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("failed to parse record in {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(rows = rows.len(), columns = columns.len(), "dataset loaded");
    Ok(Dataset::new(columns, rows))
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}
