use super::scan::{self, LossyLines};
use super::traits::{OutputError, OutputFormat};
use crate::core::models::atom::Atom;
use crate::core::models::geometry::Geometry;
use crate::core::models::record::{NormalMode, OutputRecord, Software, Vibration};
use nalgebra::{Point3, Vector3};
use std::io::BufRead;

/// Reader for Gaussian 09/16 `.log`/`.out` files.
pub struct GaussianOutput;

impl OutputFormat for GaussianOutput {
    const SOFTWARE: Software = Software::Gaussian;

    fn read_from(reader: &mut impl BufRead) -> Result<OutputRecord, OutputError> {
        let mut scanner = Scanner::new();
        for line in LossyLines::new(reader) {
            scanner.feed(&line?);
        }
        scanner.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Standard,
    Input,
}

#[derive(Debug)]
struct OrientationBlock {
    kind: Orientation,
    dashes: u8,
    geometry: Geometry,
}

#[derive(Debug, Default)]
struct FrequencyBlock {
    frequencies: Vec<Option<f64>>,
    intensities: Vec<Option<f64>>,
    displacements: Vec<Vec<Vector3<f64>>>,
    reading_rows: bool,
}

struct Scanner {
    record: OutputRecord,
    standard: Vec<Geometry>,
    input: Vec<Geometry>,
    orientation: Option<OrientationBlock>,
    in_convergence_table: bool,
    optimization_completed: bool,
    frequency_block: Option<FrequencyBlock>,
}

impl Scanner {
    fn new() -> Self {
        Self {
            record: OutputRecord::new(Software::Gaussian),
            standard: Vec::new(),
            input: Vec::new(),
            orientation: None,
            in_convergence_table: false,
            optimization_completed: false,
            frequency_block: None,
        }
    }

    fn feed(&mut self, line: &str) {
        let trimmed = line.trim();

        if self.orientation.is_some() {
            self.feed_orientation(trimmed);
            return;
        }

        if let Some(block) = self.frequency_block.as_mut() {
            if block.reading_rows {
                if let Some(vectors) = mode_row(trimmed, block.frequencies.len()) {
                    for (column, vector) in block.displacements.iter_mut().zip(vectors) {
                        column.push(vector);
                    }
                    return;
                }
                self.flush_frequency_block();
            }
        }

        if self.in_convergence_table {
            if let Some((name, value, threshold, flag)) = scan::convergence_row(trimmed) {
                self.record
                    .trace
                    .record_criterion(&name, value, threshold, flag);
                return;
            }
            self.in_convergence_table = false;
        }

        if line.contains("SCF Done:") {
            if let Some(energy) = scan::float_after(line, "=") {
                self.record.energy = Some(energy);
                self.record.trace.scf_energies.push(energy);
            }
        } else if line.contains("Standard orientation:") {
            self.start_orientation(Orientation::Standard);
        } else if line.contains("Input orientation:") {
            self.start_orientation(Orientation::Input);
        } else if trimmed.ends_with("Converged?") {
            self.in_convergence_table = true;
        } else if line.contains("Optimization completed") {
            self.optimization_completed = true;
        } else if trimmed.starts_with("Solvent") && trimmed.contains(':') {
            self.read_solvent(trimmed);
        } else if trimmed.starts_with("Charge =") && trimmed.contains("Multiplicity =") {
            self.read_charge_multiplicity(trimmed);
        } else if line.contains("Zero-point correction=") {
            self.record.thermal.zero_point = scan::float_after(line, "=");
        } else if line.contains("Thermal correction to Energy=") {
            self.record.thermal.energy = scan::float_after(line, "=");
        } else if line.contains("Thermal correction to Enthalpy=") {
            self.record.thermal.enthalpy = scan::float_after(line, "=");
        } else if line.contains("Thermal correction to Gibbs Free Energy=") {
            self.record.thermal.gibbs = scan::float_after(line, "=");
        } else if trimmed.starts_with("Harmonic frequencies") {
            self.flush_frequency_block();
            self.record.vibrations.clear();
            self.record.normal_modes.clear();
        } else if let Some(rest) = trimmed.strip_prefix("Frequencies --") {
            // "Frequencies ---" is the high-precision block, which repeats the same modes.
            if !rest.starts_with('-') {
                self.flush_frequency_block();
                self.frequency_block = Some(FrequencyBlock {
                    frequencies: rest.split_whitespace().map(scan::parse_float).collect(),
                    ..Default::default()
                });
            }
        } else if trimmed.starts_with("IR Inten") {
            if let (Some(block), Some(pos)) = (self.frequency_block.as_mut(), trimmed.find("--")) {
                block.intensities = trimmed[pos + 2..]
                    .split_whitespace()
                    .map(scan::parse_float)
                    .collect();
            }
        } else if trimmed.starts_with("Atom  AN") {
            if let Some(block) = self.frequency_block.as_mut() {
                block.reading_rows = true;
                block.displacements = vec![Vec::new(); block.frequencies.len()];
            }
        }
    }

    fn start_orientation(&mut self, kind: Orientation) {
        self.orientation = Some(OrientationBlock {
            kind,
            dashes: 0,
            geometry: Geometry::default(),
        });
    }

    fn feed_orientation(&mut self, trimmed: &str) {
        let Some(block) = self.orientation.as_mut() else {
            return;
        };
        if trimmed.starts_with("---") {
            block.dashes += 1;
            if block.dashes == 3 {
                self.finish_orientation();
            }
            return;
        }
        if block.dashes == 2 {
            if let Some(atom) = orientation_row(trimmed) {
                block.geometry.push(atom);
            }
        }
    }

    fn finish_orientation(&mut self) {
        if let Some(block) = self.orientation.take() {
            if block.geometry.is_empty() {
                return;
            }
            match block.kind {
                Orientation::Standard => self.standard.push(block.geometry),
                Orientation::Input => self.input.push(block.geometry),
            }
        }
    }

    fn read_solvent(&mut self, trimmed: &str) {
        let Some((_, rest)) = trimmed.split_once(':') else {
            return;
        };
        let name = rest.split(',').next().unwrap_or("").trim();
        if !name.is_empty() {
            self.record.solvent = Some(name.to_string());
        }
    }

    fn read_charge_multiplicity(&mut self, trimmed: &str) {
        if self.record.charge.is_some() {
            return;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        self.record.charge = tokens
            .iter()
            .position(|t| *t == "Charge")
            .and_then(|i| tokens.get(i + 2))
            .and_then(|t| t.parse().ok());
        self.record.multiplicity = tokens
            .iter()
            .position(|t| *t == "Multiplicity")
            .and_then(|i| tokens.get(i + 2))
            .and_then(|t| t.parse().ok());
    }

    fn flush_frequency_block(&mut self) {
        let Some(block) = self.frequency_block.take() else {
            return;
        };
        for (i, frequency) in block.frequencies.iter().enumerate() {
            let Some(frequency) = *frequency else {
                continue;
            };
            let ir_intensity = block.intensities.get(i).copied().flatten().unwrap_or(0.0);
            self.record.vibrations.push(Vibration {
                frequency,
                ir_intensity,
            });
            if let Some(displacements) = block.displacements.get(i) {
                if !displacements.is_empty() {
                    self.record.normal_modes.push(NormalMode {
                        frequency,
                        displacements: displacements.clone(),
                    });
                }
            }
        }
    }

    fn finish(mut self) -> Result<OutputRecord, OutputError> {
        self.flush_frequency_block();
        if self.orientation.as_ref().is_some_and(|b| b.dashes == 2) {
            self.finish_orientation();
        }

        let mut record = self.record;
        record.geometries = if self.standard.is_empty() {
            self.input
        } else {
            self.standard
        };
        if record.geometries.is_empty() {
            return Err(OutputError::NoGeometry {
                software: Software::Gaussian,
            });
        }

        record.converged = if self.optimization_completed {
            Some(true)
        } else {
            record.trace.converged()
        };
        record
            .vibrations
            .sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        Ok(record)
    }
}

/// `center  atomic-number  [type]  x  y  z`
fn orientation_row(trimmed: &str) -> Option<Atom> {
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() < 5 {
        return None;
    }
    let atomic_number: usize = tokens[1].parse().ok()?;
    let n = tokens.len();
    let x = scan::parse_float(tokens[n - 3])?;
    let y = scan::parse_float(tokens[n - 2])?;
    let z = scan::parse_float(tokens[n - 1])?;
    Some(Atom::from_atomic_number(atomic_number, Point3::new(x, y, z)))
}

/// `atom  AN  x y z  x y z ...`, one triple per mode in the block.
fn mode_row(trimmed: &str, modes: usize) -> Option<Vec<Vector3<f64>>> {
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if modes == 0 || tokens.len() != 2 + 3 * modes {
        return None;
    }
    tokens[0].parse::<usize>().ok()?;
    tokens[1].parse::<usize>().ok()?;
    let values: Option<Vec<f64>> = tokens[2..].iter().map(|t| scan::parse_float(t)).collect();
    Some(
        values?
            .chunks_exact(3)
            .map(|c| Vector3::new(c[0], c[1], c[2]))
            .collect(),
    )
}
