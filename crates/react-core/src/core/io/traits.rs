use crate::core::models::record::{OutputRecord, Software};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Could not identify '{path}' as a Gaussian or ORCA file", path = path.display())]
    UnknownFormat { path: PathBuf },
    #[error("No atomic coordinates found in {software} output")]
    NoGeometry { software: Software },
}

/// Defines the interface for extracting an [`OutputRecord`] from a program's text output.
///
/// Implementors scan the output line by line and fill the record opportunistically.
/// A section that is missing from the file leaves its field empty; only I/O failures
/// and files without any coordinates are reported as errors.
pub trait OutputFormat {
    /// The program whose output this format understands.
    const SOFTWARE: Software;

    /// Reads an output record from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or no geometry could be found.
    fn read_from(reader: &mut impl BufRead) -> Result<OutputRecord, OutputError>;

    /// Reads an output record from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or [`OutputFormat::read_from`] fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<OutputRecord, OutputError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
