//! Snapshots of a geometry displaced along a vibrational normal mode.
//!
//! Frame `k` of an animation with `n` steps places every atom at
//! `equilibrium + sin(2πk/n) · scale · displacement`, so one full period is covered
//! and the animation loops smoothly when replayed.

use crate::core::models::geometry::Geometry;
use crate::core::models::record::{NormalMode, OutputRecord};
use std::f64::consts::TAU;
use thiserror::Error;

/// Two frequencies closer than this (in cm^-1) denote the same mode.
pub const FREQUENCY_TOLERANCE: f64 = 0.01;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VibrationError {
    #[error("An animation needs at least one step")]
    ZeroSteps,
    #[error("Scale factor must be finite, got {0}")]
    InvalidScale(f64),
    #[error("Geometry has {atoms} atoms but the normal mode has {vectors} displacement vectors")]
    AtomCountMismatch { atoms: usize, vectors: usize },
    #[error("No normal mode with frequency {0:.4} cm^-1")]
    ModeNotFound(f64),
}

/// Returns the normal mode whose frequency matches `frequency` within
/// [`FREQUENCY_TOLERANCE`]. The sign is significant: an imaginary mode at
/// `-412.7` is never matched by `412.7`.
pub fn select_mode(record: &OutputRecord, frequency: f64) -> Result<&NormalMode, VibrationError> {
    record
        .normal_modes
        .iter()
        .find(|m| (m.frequency - frequency).abs() < FREQUENCY_TOLERANCE)
        .ok_or(VibrationError::ModeNotFound(frequency))
}

/// A restartable, finite sequence of displaced geometries.
#[derive(Debug, Clone)]
pub struct DisplacementAnimation {
    equilibrium: Geometry,
    mode: NormalMode,
    steps: usize,
    scale: f64,
}

impl DisplacementAnimation {
    pub fn new(
        equilibrium: Geometry,
        mode: NormalMode,
        steps: usize,
        scale: f64,
    ) -> Result<Self, VibrationError> {
        if steps == 0 {
            return Err(VibrationError::ZeroSteps);
        }
        if !scale.is_finite() {
            return Err(VibrationError::InvalidScale(scale));
        }
        if equilibrium.len() != mode.displacements.len() {
            return Err(VibrationError::AtomCountMismatch {
                atoms: equilibrium.len(),
                vectors: mode.displacements.len(),
            });
        }
        Ok(Self {
            equilibrium,
            mode,
            steps,
            scale,
        })
    }

    pub fn len(&self) -> usize {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    pub fn frequency(&self) -> f64 {
        self.mode.frequency
    }

    pub fn frame(&self, k: usize) -> Geometry {
        let phase = (TAU * k as f64 / self.steps as f64).sin();
        self.equilibrium
            .displaced(&self.mode.displacements, phase * self.scale)
    }

    /// A fresh iterator over all frames. Each call starts again at frame 0.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = Geometry> + '_ {
        (0..self.steps).map(move |k| self.frame(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::record::Software;
    use nalgebra::{Point3, Vector3};

    fn diatomic() -> Geometry {
        Geometry::new(vec![
            Atom::new("H", Point3::new(0.0, 0.0, 0.0)),
            Atom::new("H", Point3::new(0.0, 0.0, 0.74)),
        ])
    }

    fn stretch(frequency: f64) -> NormalMode {
        NormalMode {
            frequency,
            displacements: vec![Vector3::new(0.0, 0.0, -0.5), Vector3::new(0.0, 0.0, 0.5)],
        }
    }

    #[test]
    fn frame_count_matches_steps() {
        let animation = DisplacementAnimation::new(diatomic(), stretch(4400.0), 10, 0.75).unwrap();
        assert_eq!(animation.len(), 10);
        assert_eq!(animation.frames().len(), 10);
        assert_eq!(animation.frames().count(), 10);
    }

    #[test]
    fn first_frame_is_equilibrium_and_quarter_period_is_full_amplitude() {
        let animation = DisplacementAnimation::new(diatomic(), stretch(4400.0), 4, 0.5).unwrap();
        let frames: Vec<Geometry> = animation.frames().collect();
        assert_eq!(frames[0], diatomic());

        let quarter = &frames[1];
        assert!((quarter.atoms()[1].position.z - (0.74 + 0.25)).abs() < 1e-12);
        let three_quarter = &frames[3];
        assert!((three_quarter.atoms()[1].position.z - (0.74 - 0.25)).abs() < 1e-12);
    }

    #[test]
    fn frames_are_restartable() {
        let animation = DisplacementAnimation::new(diatomic(), stretch(4400.0), 6, 1.0).unwrap();
        let first: Vec<Geometry> = animation.frames().collect();
        let second: Vec<Geometry> = animation.frames().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert_eq!(
            DisplacementAnimation::new(diatomic(), stretch(1.0), 0, 1.0).unwrap_err(),
            VibrationError::ZeroSteps
        );
        assert!(matches!(
            DisplacementAnimation::new(diatomic(), stretch(1.0), 5, f64::NAN),
            Err(VibrationError::InvalidScale(_))
        ));
        let mut mode = stretch(1.0);
        mode.displacements.pop();
        assert_eq!(
            DisplacementAnimation::new(diatomic(), mode, 5, 1.0).unwrap_err(),
            VibrationError::AtomCountMismatch {
                atoms: 2,
                vectors: 1
            }
        );
    }

    #[test]
    fn select_mode_is_sign_sensitive() {
        let mut record = OutputRecord::new(Software::Gaussian);
        record.normal_modes = vec![stretch(-412.7), stretch(1634.75)];

        assert_eq!(select_mode(&record, -412.7).unwrap().frequency, -412.7);
        assert_eq!(select_mode(&record, 1634.751).unwrap().frequency, 1634.75);
        assert_eq!(
            select_mode(&record, 412.7).unwrap_err(),
            VibrationError::ModeNotFound(412.7)
        );
    }
}
