//! Geometries along a bond stretch or compression.
//!
//! Each point moves the second atom of the bond along the bond axis by a multiple
//! of the increment, or both atoms by half of it in opposite directions. The rest
//! of the molecule stays where it is.

use crate::core::models::atom::Atom;
use crate::core::models::geometry::Geometry;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Distances below this (in Angstroms) are treated as coincident atoms.
const MIN_DISTANCE: f64 = 1e-6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScanError {
    #[error("Atom {atom} does not exist (the geometry has {atoms} atoms)")]
    AtomOutOfRange { atom: usize, atoms: usize },
    #[error("A bond scan needs two different atoms, got {0} twice")]
    SameAtom(usize),
    #[error("Atoms {0} and {1} are at the same position")]
    CoincidentAtoms(usize, usize),
    #[error("Scan increment must be positive and finite, got {0}")]
    InvalidIncrement(f64),
    #[error("A scan needs at least one step")]
    ZeroSteps,
    #[error("Compressing the bond by {offset:.4} Å would cross the other atom ({distance:.4} Å apart)")]
    BondCollapsed { distance: f64, offset: f64 },
    #[error("Unknown scan direction '{0}' (expected +, - or +/-)")]
    UnknownDirection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanDirection {
    #[default]
    Stretch,
    Compress,
    Both,
}

impl fmt::Display for ScanDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            Self::Stretch => "+",
            Self::Compress => "-",
            Self::Both => "+/-",
        };
        write!(f, "{}", symbol)
    }
}

impl FromStr for ScanDirection {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "+" | "stretch" => Ok(Self::Stretch),
            "-" | "compress" => Ok(Self::Compress),
            "+/-" | "+-" | "both" => Ok(Self::Both),
            other => Err(ScanError::UnknownDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BondScan {
    /// First atom of the bond, 1-based. Stays fixed unless `move_both` is set.
    pub first: usize,
    /// Second atom of the bond, 1-based.
    pub second: usize,
    /// Change of the bond length per step, in Angstroms.
    pub increment: f64,
    /// Points on each side that is scanned.
    pub steps: usize,
    pub direction: ScanDirection,
    pub move_both: bool,
}

/// One geometry of a scan and its bond length.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPoint {
    pub distance: f64,
    pub geometry: Geometry,
}

impl BondScan {
    /// Signed length changes in scan order: compressions from the largest down,
    /// then stretches from the smallest up. The starting geometry is not included.
    pub fn offsets(&self) -> Vec<f64> {
        let stretch = (1..=self.steps).map(|k| k as f64 * self.increment);
        let compress = (1..=self.steps).rev().map(|k| -(k as f64) * self.increment);
        match self.direction {
            ScanDirection::Stretch => stretch.collect(),
            ScanDirection::Compress => compress.collect(),
            ScanDirection::Both => compress.chain(stretch).collect(),
        }
    }

    pub fn points(&self, geometry: &Geometry) -> Result<Vec<ScanPoint>, ScanError> {
        if self.steps == 0 {
            return Err(ScanError::ZeroSteps);
        }
        if !(self.increment.is_finite() && self.increment > 0.0) {
            return Err(ScanError::InvalidIncrement(self.increment));
        }
        if self.first == self.second {
            return Err(ScanError::SameAtom(self.first));
        }
        let a = self.atom(geometry, self.first)?;
        let b = self.atom(geometry, self.second)?;

        let axis = b.position - a.position;
        let distance = axis.norm();
        if distance < MIN_DISTANCE {
            return Err(ScanError::CoincidentAtoms(self.first, self.second));
        }
        let unit = axis / distance;

        self.offsets()
            .into_iter()
            .map(|offset| {
                if distance + offset < MIN_DISTANCE {
                    return Err(ScanError::BondCollapsed { distance, offset });
                }
                let (shift_a, shift_b) = if self.move_both {
                    (-0.5 * offset, 0.5 * offset)
                } else {
                    (0.0, offset)
                };
                let geometry = geometry
                    .atoms()
                    .iter()
                    .enumerate()
                    .map(|(i, atom)| {
                        let shift = if i + 1 == self.first {
                            shift_a
                        } else if i + 1 == self.second {
                            shift_b
                        } else {
                            return atom.clone();
                        };
                        Atom::new(&atom.element, atom.position + unit * shift)
                    })
                    .collect();
                Ok(ScanPoint {
                    distance: distance + offset,
                    geometry,
                })
            })
            .collect()
    }

    fn atom<'a>(&self, geometry: &'a Geometry, number: usize) -> Result<&'a Atom, ScanError> {
        number
            .checked_sub(1)
            .and_then(|i| geometry.atoms().get(i))
            .ok_or(ScanError::AtomOutOfRange {
                atom: number,
                atoms: geometry.len(),
            })
    }
}
