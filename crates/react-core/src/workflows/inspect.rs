use crate::core::io::read_output;
use crate::core::io::xyz::XyzFile;
use crate::core::models::record::OutputRecord;
use crate::engine::error::EngineError;
use std::path::Path;
use tracing::{info, instrument};

/// Extracts the record of a single output file.
#[instrument(skip_all, name = "inspect_workflow", fields(path = %path.display()))]
pub fn run(path: &Path) -> Result<OutputRecord, EngineError> {
    let record = read_output(path).map_err(|source| EngineError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        software = %record.software,
        geometries = record.geometries.len(),
        vibrations = record.vibrations.len(),
        "Extracted output record."
    );
    Ok(record)
}

/// Writes the last geometry of `record` to `destination` as XYZ.
pub fn export_final_geometry(
    record: &OutputRecord,
    source: &Path,
    destination: &Path,
) -> Result<(), EngineError> {
    let geometry = record
        .final_geometry()
        .ok_or_else(|| EngineError::MissingGeometry {
            path: source.to_path_buf(),
        })?;
    let comment = format!("Final geometry from {}", source.display());
    XyzFile::write_to_path(geometry, &comment, destination).map_err(|source| EngineError::Write {
        path: destination.to_path_buf(),
        source,
    })
}
