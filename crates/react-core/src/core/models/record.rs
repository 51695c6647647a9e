use super::geometry::Geometry;
use nalgebra::Vector3;
use std::fmt;

/// The quantum-chemistry package that produced an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Software {
    Gaussian,
    Orca,
}

impl fmt::Display for Software {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Software::Gaussian => write!(f, "Gaussian"),
            Software::Orca => write!(f, "ORCA"),
        }
    }
}

/// Thermochemistry corrections from a frequency calculation, in Hartree.
///
/// Every value is a correction to the electronic energy of the same file, never an
/// absolute energy, so that corrections from different levels of theory can be
/// composed with electronic energies from another file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThermalCorrections {
    pub zero_point: Option<f64>,
    pub energy: Option<f64>,
    pub enthalpy: Option<f64>,
    pub gibbs: Option<f64>,
}

/// A harmonic vibration. Imaginary modes carry a negative frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vibration {
    /// Frequency in cm^-1.
    pub frequency: f64,
    /// IR intensity in km/mol.
    pub ir_intensity: f64,
}

impl Vibration {
    pub fn is_imaginary(&self) -> bool {
        self.frequency < 0.0
    }
}

/// The Cartesian displacement vectors of one normal mode, one vector per atom.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalMode {
    pub frequency: f64,
    pub displacements: Vec<Vector3<f64>>,
}

/// One geometry-convergence criterion as printed across an optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceCriterion {
    pub name: String,
    /// Printed values in file order, one per optimization step.
    pub values: Vec<f64>,
    pub threshold: Option<f64>,
    /// The YES/NO flag of the most recent table.
    pub converged: bool,
}

/// SCF energies and convergence criteria in the order they appear in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizationTrace {
    pub scf_energies: Vec<f64>,
    pub criteria: Vec<ConvergenceCriterion>,
}

impl OptimizationTrace {
    pub(crate) fn record_criterion(
        &mut self,
        name: &str,
        value: Option<f64>,
        threshold: Option<f64>,
        converged: bool,
    ) {
        let idx = match self.criteria.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.criteria.push(ConvergenceCriterion {
                    name: name.to_string(),
                    values: Vec::new(),
                    threshold: None,
                    converged: false,
                });
                self.criteria.len() - 1
            }
        };
        let criterion = &mut self.criteria[idx];
        if let Some(v) = value {
            criterion.values.push(v);
        }
        if threshold.is_some() {
            criterion.threshold = threshold;
        }
        criterion.converged = converged;
    }

    /// `None` if no convergence table was printed, otherwise whether every
    /// criterion was met in its latest table.
    pub fn converged(&self) -> Option<bool> {
        if self.criteria.is_empty() {
            None
        } else {
            Some(self.criteria.iter().all(|c| c.converged))
        }
    }
}

/// The normalized data extracted from one Gaussian or ORCA output file.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub software: Software,
    /// Final electronic energy in Hartree.
    pub energy: Option<f64>,
    /// `None` when the file is not a geometry optimization.
    pub converged: Option<bool>,
    pub solvent: Option<String>,
    pub charge: Option<i32>,
    pub multiplicity: Option<u32>,
    pub thermal: ThermalCorrections,
    /// Sorted by ascending frequency.
    pub vibrations: Vec<Vibration>,
    pub normal_modes: Vec<NormalMode>,
    pub geometries: Vec<Geometry>,
    pub trace: OptimizationTrace,
}

impl OutputRecord {
    pub fn new(software: Software) -> Self {
        Self {
            software,
            energy: None,
            converged: None,
            solvent: None,
            charge: None,
            multiplicity: None,
            thermal: ThermalCorrections::default(),
            vibrations: Vec::new(),
            normal_modes: Vec::new(),
            geometries: Vec::new(),
            trace: OptimizationTrace::default(),
        }
    }

    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn with_solvent(mut self, solvent: &str) -> Self {
        self.solvent = Some(solvent.to_string());
        self
    }

    pub fn with_thermal(mut self, thermal: ThermalCorrections) -> Self {
        self.thermal = thermal;
        self
    }

    pub fn with_vibrations(mut self, mut vibrations: Vec<Vibration>) -> Self {
        vibrations.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        self.vibrations = vibrations;
        self
    }

    pub fn has_solvent(&self) -> bool {
        self.solvent.is_some()
    }

    pub fn has_frequencies(&self) -> bool {
        self.thermal.zero_point.is_some() || !self.vibrations.is_empty()
    }

    pub fn thermal_dg(&self) -> Option<f64> {
        self.gated(self.thermal.gibbs)
    }

    pub fn thermal_dh(&self) -> Option<f64> {
        self.gated(self.thermal.enthalpy)
    }

    pub fn thermal_de(&self) -> Option<f64> {
        self.gated(self.thermal.energy)
    }

    pub fn zero_point(&self) -> Option<f64> {
        self.gated(self.thermal.zero_point)
    }

    fn gated(&self, value: Option<f64>) -> Option<f64> {
        if self.has_frequencies() { value } else { None }
    }

    /// Vibrations with a negative (imaginary) frequency.
    pub fn imaginary(&self) -> impl Iterator<Item = &Vibration> {
        self.vibrations.iter().filter(|v| v.is_imaginary())
    }

    pub fn final_geometry(&self) -> Option<&Geometry> {
        self.geometries.last()
    }
}
