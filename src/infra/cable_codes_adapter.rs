use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::{PackerError, Result};
use crate::pipeline::processing::packaging::CableCodeSet;

/// Loads the cable reference list. An unreadable file aborts the batch.
pub fn read_cable_codes(path: &Path) -> Result<CableCodeSet> {
    let file = File::open(path)
        .map_err(|e| PackerError::ReferenceList(format!("{}: {}", path.display(), e)))?;
    let codes = read_cable_codes_from(file)?;
    info!("Loaded {} cable codes from {}", codes.len(), path.display());
    Ok(codes)
}

/// First column of every record. A header line, if present, is just one more code that
/// never matches an item.
pub fn read_cable_codes_from<R: Read>(reader: R) -> Result<CableCodeSet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut codes = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(code) = record.get(0) {
            codes.push(code.to_string());
        }
    }
    Ok(CableCodeSet::new(codes))
}
