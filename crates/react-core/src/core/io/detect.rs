//! Best-effort identification of the program that wrote a file.
//!
//! This is a heuristic classifier, not a grammar: each of the first
//! [`LINES_TO_CHECK`] lines is matched against static marker tables and the
//! program with the higher score wins.

use super::scan::LossyLines;
use crate::core::models::record::Software;
use phf::phf_map;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

pub const LINES_TO_CHECK: usize = 100;

const ROUTE_CARD_LINES: usize = 10;
const SIMPLE_INPUT_LINES: usize = 20;
const ROUTE_CARD_WEIGHT: u32 = 2;
const SIMPLE_INPUT_WEIGHT: u32 = 3;

/// Lower-cased Gaussian markers and the score a matching line earns.
static GAUSSIAN_MARKERS: phf::Map<&'static str, u32> = phf_map! {
    "gaussian(r) 16" => 3,
    "gaussian(r) 09" => 3,
    "gaussian, inc." => 3,
    " entering gaussian system" => 3,
    "gaussian 09" => 3,
    "gaussian 16" => 3,
    "%chk=" => 1,
    "%mem=" => 1,
    "%nproc=" => 1,
    "entering link 1" => 1,
    "l1.exe" => 1,
    "l9.exe" => 1,
    "g16" => 1,
    "g09" => 1,
};

/// Lower-cased ORCA markers and the score a matching line earns.
static ORCA_MARKERS: phf::Map<&'static str, u32> = phf_map! {
    "o   r   c   a" => 4,
    "* o r c a *" => 4,
    "an ab initio, dft and semiempirical electronic structure package" => 1,
    "%pal" => 1,
    "%maxcore" => 1,
    "* xyz" => 1,
    "*xyz" => 1,
    "%method" => 1,
    "%scf" => 1,
    "%basis" => 1,
    "orca terminated normally" => 1,
    "max planck institute fuer kohlenforschung" => 1,
    "department of theory and spectroscopy" => 1,
    "directorship and core code : frank neese" => 1,
    "orca geometry:" => 1,
    "final single point energy" => 1,
    "---an ab initio" => 1,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Gaussian,
    Orca,
    Unknown,
}

impl Detection {
    pub fn software(self) -> Option<Software> {
        match self {
            Detection::Gaussian => Some(Software::Gaussian),
            Detection::Orca => Some(Software::Orca),
            Detection::Unknown => None,
        }
    }
}

fn best_marker(table: &phf::Map<&'static str, u32>, line_lower: &str) -> u32 {
    table
        .entries()
        .filter(|(marker, _)| line_lower.contains(**marker))
        .map(|(_, weight)| *weight)
        .max()
        .unwrap_or(0)
}

/// Classifies a file from its leading lines. Only the first [`LINES_TO_CHECK`] are read.
pub fn detect_software<I, S>(lines: I) -> Detection
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut gaussian_score = 0u32;
    let mut orca_score = 0u32;

    for (i, line) in lines.into_iter().take(LINES_TO_CHECK).enumerate() {
        let line = line.as_ref();
        let lower = line.to_lowercase();
        let stripped = line.trim();

        gaussian_score += best_marker(&GAUSSIAN_MARKERS, &lower);

        if i < SIMPLE_INPUT_LINES && stripped.starts_with('!') {
            orca_score += SIMPLE_INPUT_WEIGHT;
        }

        if i < ROUTE_CARD_LINES && orca_score == 0 && stripped.starts_with('#') {
            gaussian_score += ROUTE_CARD_WEIGHT;
        }

        orca_score += best_marker(&ORCA_MARKERS, &lower);
    }

    debug!(gaussian_score, orca_score, "Software detection scores.");

    if gaussian_score > orca_score {
        Detection::Gaussian
    } else if orca_score > gaussian_score {
        Detection::Orca
    } else {
        Detection::Unknown
    }
}

/// Classifies a file on disk. Unreadable files are reported as [`Detection::Unknown`].
pub fn detect_path<P: AsRef<Path>>(path: P) -> Detection {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Could not open {:?} for format detection: {}", path, e);
            return Detection::Unknown;
        }
    };
    let lines = LossyLines::new(BufReader::new(file)).map_while(Result::ok);
    detect_software(lines)
}
