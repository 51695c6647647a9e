//! Provides extraction of normalized records from quantum-chemistry output files.
//!
//! Gaussian and ORCA outputs are read through the [`traits::OutputFormat`] trait;
//! [`read_output`] sniffs the format of an arbitrary file first and dispatches to
//! the matching reader. Geometries can be written back out as XYZ, or as the
//! coordinate section of a new ORCA input.

pub mod detect;
pub mod gaussian;
pub mod orca;
pub mod orca_input;
pub(crate) mod scan;
pub mod traits;
pub mod xyz;

use crate::core::models::record::OutputRecord;
use detect::{Detection, detect_path};
use gaussian::GaussianOutput;
use orca::OrcaOutput;
use std::path::Path;
use tracing::debug;
use traits::{OutputError, OutputFormat};

/// Detects the program that wrote `path` and extracts its record.
///
/// # Errors
///
/// Returns [`OutputError::UnknownFormat`] if the file is neither Gaussian nor ORCA
/// output, and propagates reader errors otherwise.
pub fn read_output<P: AsRef<Path>>(path: P) -> Result<OutputRecord, OutputError> {
    let path = path.as_ref();
    let detection = detect_path(path);
    debug!(path = %path.display(), ?detection, "Detected output format.");
    match detection {
        Detection::Gaussian => GaussianOutput::read_from_path(path),
        Detection::Orca => OrcaOutput::read_from_path(path),
        Detection::Unknown => {
            if !path.exists() {
                return Err(OutputError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                )));
            }
            Err(OutputError::UnknownFormat {
                path: path.to_path_buf(),
            })
        }
    }
}
