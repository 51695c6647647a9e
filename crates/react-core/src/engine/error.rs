use thiserror::Error;

use super::config::ConfigError;
use super::scan::ScanError;
use super::vibration::VibrationError;
use crate::core::io::orca_input::ConstraintParseError;
use crate::core::io::traits::OutputError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: OutputError,
    },

    #[error("Vibration error: {0}")]
    Vibration(#[from] VibrationError),

    #[error("Bond scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Invalid constraint: {0}")]
    Constraint(#[from] ConstraintParseError),

    #[error("Constraint refers to atom {atom} but the geometry has {atoms} atoms")]
    ConstraintOutOfRange { atom: usize, atoms: usize },

    #[error("{path:?} contains no geometry")]
    MissingGeometry { path: PathBuf },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}
