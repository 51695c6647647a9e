use super::scan::{self, LossyLines};
use super::traits::{OutputError, OutputFormat};
use crate::core::models::atom::Atom;
use crate::core::models::geometry::Geometry;
use crate::core::models::record::{NormalMode, OutputRecord, Software, Vibration};
use nalgebra::{Point3, Vector3};
use std::collections::BTreeMap;
use std::io::BufRead;

/// Reader for ORCA 4/5/6 `.out` files.
///
/// ORCA prints absolute thermochemistry; the corrections stored in the record are
/// taken from the correction lines (`Total correction`, `Thermal Enthalpy correction`,
/// `G-E(el)`) and fall back to absolute value minus electronic energy when an
/// older version omits them.
pub struct OrcaOutput;

impl OutputFormat for OrcaOutput {
    const SOFTWARE: Software = Software::Orca;

    fn read_from(reader: &mut impl BufRead) -> Result<OutputRecord, OutputError> {
        let mut scanner = Scanner::new();
        for line in LossyLines::new(reader) {
            scanner.feed(&line?);
        }
        scanner.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Coordinates { header_seen: bool },
    Convergence,
    Frequencies,
    NormalModes { has_data: bool },
    IrSpectrum { has_data: bool },
}

#[derive(Debug, Default)]
struct Thermochemistry {
    electronic: Option<f64>,
    zero_point: Option<f64>,
    total_correction: Option<f64>,
    enthalpy_correction: Option<f64>,
    gibbs_minus_electronic: Option<f64>,
    total_thermal_energy: Option<f64>,
    total_enthalpy: Option<f64>,
    final_gibbs: Option<f64>,
}

struct Scanner {
    record: OutputRecord,
    section: Section,
    geometry: Geometry,
    optimization_converged: bool,
    thermo: Thermochemistry,
    frequencies: BTreeMap<usize, f64>,
    intensities: BTreeMap<usize, f64>,
    mode_columns: Vec<usize>,
    mode_values: BTreeMap<usize, Vec<f64>>,
}

impl Scanner {
    fn new() -> Self {
        Self {
            record: OutputRecord::new(Software::Orca),
            section: Section::None,
            geometry: Geometry::default(),
            optimization_converged: false,
            thermo: Thermochemistry::default(),
            frequencies: BTreeMap::new(),
            intensities: BTreeMap::new(),
            mode_columns: Vec::new(),
            mode_values: BTreeMap::new(),
        }
    }

    fn feed(&mut self, line: &str) {
        let trimmed = line.trim();
        if self.feed_section(trimmed) {
            return;
        }

        if line.contains("FINAL SINGLE POINT ENERGY") {
            if let Some(energy) = scan::float_at(line, 4) {
                self.record.energy = Some(energy);
                self.record.trace.scf_energies.push(energy);
            }
        } else if line.contains("Total Energy       :") {
            if let Some(energy) = scan::float_at(line, 3) {
                self.record.energy = Some(energy);
            }
        } else if line.contains("CARTESIAN COORDINATES (ANGSTROEM)") {
            self.geometry = Geometry::default();
            self.section = Section::Coordinates { header_seen: false };
        } else if line.contains("Geometry convergence") {
            self.section = Section::Convergence;
        } else if line.contains("THE OPTIMIZATION HAS CONVERGED") {
            self.optimization_converged = true;
        } else if trimmed.contains("Solvent:") {
            self.read_solvent(trimmed);
        } else if trimmed.starts_with("Total Charge") {
            self.record.charge = trimmed.split_whitespace().last().and_then(|t| t.parse().ok());
        } else if trimmed.starts_with("Multiplicity") {
            self.record.multiplicity =
                trimmed.split_whitespace().last().and_then(|t| t.parse().ok());
        } else if trimmed.starts_with("VIBRATIONAL FREQUENCIES") {
            self.frequencies.clear();
            self.intensities.clear();
            self.mode_columns.clear();
            self.mode_values.clear();
            self.section = Section::Frequencies;
        } else if trimmed.starts_with("NORMAL MODES") {
            self.section = Section::NormalModes { has_data: false };
        } else if trimmed.starts_with("IR SPECTRUM") {
            self.section = Section::IrSpectrum { has_data: false };
        } else {
            self.read_thermochemistry(trimmed);
        }
    }

    /// Handles a line belonging to the open section. Returns `false` if the line
    /// closed the section and still needs the general markers.
    fn feed_section(&mut self, trimmed: &str) -> bool {
        match self.section {
            Section::None => false,
            Section::Coordinates { header_seen } => {
                if !header_seen {
                    if trimmed.starts_with("---") {
                        self.section = Section::Coordinates { header_seen: true };
                    }
                    return true;
                }
                if trimmed.is_empty() {
                    self.finish_coordinates();
                    return true;
                }
                if let Some(atom) = coordinate_row(trimmed) {
                    self.geometry.push(atom);
                    true
                } else {
                    self.finish_coordinates();
                    false
                }
            }
            Section::Convergence => {
                if let Some((name, value, threshold, flag)) = scan::convergence_row(trimmed) {
                    self.record
                        .trace
                        .record_criterion(&name, value, threshold, flag);
                } else if trimmed.starts_with("....") || trimmed.is_empty() {
                    self.section = Section::None;
                }
                true
            }
            Section::Frequencies => {
                if let Some((index, frequency)) = frequency_row(trimmed) {
                    self.frequencies.insert(index, frequency);
                    true
                } else if !self.frequencies.is_empty()
                    && !trimmed.is_empty()
                    && !trimmed.starts_with("---")
                {
                    self.section = Section::None;
                    false
                } else {
                    true
                }
            }
            Section::NormalModes { has_data } => {
                if trimmed.starts_with("IR SPECTRUM") || (has_data && trimmed.starts_with("---")) {
                    self.section = Section::None;
                    return false;
                }
                if let Some(columns) = mode_header(trimmed) {
                    self.mode_columns = columns;
                } else if let Some(values) = mode_row(trimmed, self.mode_columns.len()) {
                    for (column, value) in self.mode_columns.iter().zip(values) {
                        self.mode_values.entry(*column).or_default().push(value);
                    }
                    self.section = Section::NormalModes { has_data: true };
                }
                true
            }
            Section::IrSpectrum { has_data } => {
                if let Some((index, intensity)) = ir_row(trimmed) {
                    self.intensities.insert(index, intensity);
                    self.section = Section::IrSpectrum { has_data: true };
                    true
                } else if has_data && !trimmed.starts_with("---") {
                    self.section = Section::None;
                    false
                } else {
                    true
                }
            }
        }
    }

    fn finish_coordinates(&mut self) {
        let geometry = std::mem::take(&mut self.geometry);
        if !geometry.is_empty() {
            self.record.geometries.push(geometry);
        }
        self.section = Section::None;
    }

    fn read_solvent(&mut self, trimmed: &str) {
        // `Solvent:   ... WATER` or `Solvent: "water"`
        let name = trimmed
            .split_whitespace()
            .skip_while(|t| *t != "Solvent:")
            .skip(1)
            .find(|t| !t.chars().all(|c| c == '.'))
            .map(|t| t.trim_matches('"'));
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.record.solvent = Some(name.to_string());
        }
    }

    fn read_thermochemistry(&mut self, trimmed: &str) {
        let thermo = &mut self.thermo;
        let slot = if trimmed.starts_with("Electronic energy") {
            &mut thermo.electronic
        } else if trimmed.starts_with("Zero point energy") {
            &mut thermo.zero_point
        } else if trimmed.starts_with("Total correction") {
            &mut thermo.total_correction
        } else if trimmed.starts_with("Thermal Enthalpy correction") {
            &mut thermo.enthalpy_correction
        } else if trimmed.starts_with("G-E(el)") {
            &mut thermo.gibbs_minus_electronic
        } else if trimmed.starts_with("Total thermal energy") {
            &mut thermo.total_thermal_energy
        } else if trimmed.starts_with("Total Enthalpy") {
            &mut thermo.total_enthalpy
        } else if trimmed.starts_with("Final Gibbs free energy") {
            &mut thermo.final_gibbs
        } else {
            return;
        };
        if let Some(value) = scan::first_float(trimmed) {
            *slot = Some(value);
        }
    }

    fn finish(mut self) -> Result<OutputRecord, OutputError> {
        if matches!(self.section, Section::Coordinates { header_seen: true }) {
            self.finish_coordinates();
        }

        let mut record = self.record;
        if record.geometries.is_empty() {
            return Err(OutputError::NoGeometry {
                software: Software::Orca,
            });
        }

        let thermo = self.thermo;
        let electronic = thermo.electronic.or(record.energy);
        let relative = |absolute: Option<f64>| Some(absolute? - electronic?);
        record.thermal.zero_point = thermo.zero_point;
        record.thermal.energy = thermo
            .total_correction
            .or_else(|| relative(thermo.total_thermal_energy));
        record.thermal.enthalpy = match (thermo.total_correction, thermo.enthalpy_correction) {
            (Some(total), Some(extra)) => Some(total + extra),
            _ => relative(thermo.total_enthalpy),
        };
        record.thermal.gibbs = thermo
            .gibbs_minus_electronic
            .or_else(|| relative(thermo.final_gibbs));

        let mut mode_values = self.mode_values;
        for (index, frequency) in &self.frequencies {
            if *frequency == 0.0 {
                continue;
            }
            record.vibrations.push(Vibration {
                frequency: *frequency,
                ir_intensity: self.intensities.get(index).copied().unwrap_or(0.0),
            });
            if let Some(values) = mode_values.remove(index) {
                if !values.is_empty() && values.len() % 3 == 0 {
                    record.normal_modes.push(NormalMode {
                        frequency: *frequency,
                        displacements: values
                            .chunks_exact(3)
                            .map(|c| Vector3::new(c[0], c[1], c[2]))
                            .collect(),
                    });
                }
            }
        }
        record
            .vibrations
            .sort_by(|a, b| a.frequency.total_cmp(&b.frequency));

        record.converged = if self.optimization_converged {
            Some(true)
        } else {
            record.trace.converged()
        };
        Ok(record)
    }
}

/// `element  x  y  z`
fn coordinate_row(trimmed: &str) -> Option<Atom> {
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() < 4 {
        return None;
    }
    let x = scan::parse_float(tokens[1])?;
    let y = scan::parse_float(tokens[2])?;
    let z = scan::parse_float(tokens[3])?;
    Some(Atom::new(tokens[0], Point3::new(x, y, z)))
}

/// `index:  frequency cm**-1 [***imaginary mode***]`
fn frequency_row(trimmed: &str) -> Option<(usize, f64)> {
    if !trimmed.contains("cm**-1") {
        return None;
    }
    let mut tokens = trimmed.split_whitespace();
    let index = tokens.next()?.strip_suffix(':')?.parse().ok()?;
    let mut frequency = scan::parse_float(tokens.next()?)?;
    if trimmed.to_lowercase().contains("imaginary") {
        frequency = -frequency.abs();
    }
    Some((index, frequency))
}

/// `index:  frequency  eps  intensity ...`
fn ir_row(trimmed: &str) -> Option<(usize, f64)> {
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let index = tokens.first()?.strip_suffix(':')?.parse().ok()?;
    let intensity = scan::parse_float(tokens.get(3)?)?;
    Some((index, intensity))
}

fn mode_header(trimmed: &str) -> Option<Vec<usize>> {
    let columns: Option<Vec<usize>> = trimmed.split_whitespace().map(|t| t.parse().ok()).collect();
    columns.filter(|c| !c.is_empty())
}

fn mode_row(trimmed: &str, columns: usize) -> Option<Vec<f64>> {
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if columns == 0 || tokens.len() != columns + 1 {
        return None;
    }
    tokens[0].parse::<usize>().ok()?;
    tokens[1..].iter().map(|t| scan::parse_float(t)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) const WATER_OPT_FREQ: &str = r#"
                                 *****************
                                 * O   R   C   A *
                                 *****************

================================================================================
                                       INPUT FILE
================================================================================
|  1> ! B3LYP def2-SVP Opt Freq CPCM(Water)
|  2> * xyz 0 1
|  3>   O   0.0000   0.0000   0.1173
|  4>   H   0.0000   0.7572  -0.4692
|  5>   H   0.0000  -0.7572  -0.4692
|  6> *
                         ****END OF INPUT****

---------------------------------
CARTESIAN COORDINATES (ANGSTROEM)
---------------------------------
  O      0.000000    0.000000    0.117300
  H      0.000000    0.757200   -0.469200
  H      0.000000   -0.757200   -0.469200

----------------------------
CARTESIAN COORDINATES (A.U.)
----------------------------
  NO LB      ZA    FRAG     MASS         X           Y           Z
   0 O     8.0000    0    15.999    0.000000    0.000000    0.221668

 Total Charge           Charge          ....    0
 Multiplicity           Mult            ....    1

CPCM SOLVATION MODEL
Epsilon                                         ...      80.4000
Solvent:                                        ... WATER

Total Energy       :          -76.40895332670117 Eh           -2079.20574 eV
-------------------------   --------------------
FINAL SINGLE POINT ENERGY       -76.408953326701
-------------------------   --------------------

                          .--------------------.
          ----------------------|Geometry convergence|-------------------------
          Item                value                   Tolerance       Converged
          ---------------------------------------------------------------------
          Energy change      -0.0001234567            0.0000050000      NO
          RMS gradient        0.0000456789            0.0001000000      YES
          MAX gradient        0.0001234567            0.0003000000      YES
          RMS step            0.0003456789            0.0020000000      YES
          MAX step            0.0008765432            0.0040000000      YES
          ........................................................

---------------------------------
CARTESIAN COORDINATES (ANGSTROEM)
---------------------------------
  O      0.000000    0.000000    0.119500
  H      0.000000    0.763300   -0.478000
  H      0.000000   -0.763300   -0.478000

Total Energy       :          -76.40912345670000 Eh           -2079.21000 eV
-------------------------   --------------------
FINAL SINGLE POINT ENERGY       -76.409123456700
-------------------------   --------------------

                          .--------------------.
          ----------------------|Geometry convergence|-------------------------
          Item                value                   Tolerance       Converged
          ---------------------------------------------------------------------
          Energy change      -0.0000012345            0.0000050000      YES
          RMS gradient        0.0000056789            0.0001000000      YES
          MAX gradient        0.0000134567            0.0003000000      YES
          RMS step            0.0000456789            0.0020000000      YES
          MAX step            0.0000765432            0.0040000000      YES
          ........................................................

                    ***********************HURRAY********************
                    ***        THE OPTIMIZATION HAS CONVERGED     ***
                    *************************************************

-----------------------
VIBRATIONAL FREQUENCIES
-----------------------

Scaling factor for frequencies =  1.000000000  (already applied!)

   0:         0.00 cm**-1
   1:         0.00 cm**-1
   2:         0.00 cm**-1
   3:         0.00 cm**-1
   4:         0.00 cm**-1
   5:         0.00 cm**-1
   6:      -412.70 cm**-1 ***imaginary mode***
   7:      1634.75 cm**-1
   8:      3906.69 cm**-1


------------
NORMAL MODES
------------

These modes are the Cartesian displacements weighted by the diagonal matrix
M(i,i)=1/sqrt(m[i]) where m[i] is the mass of the displaced atom
Thus, these vectors are normalized but *not* orthogonal

                  0          1          2          3          4          5
      0       0.000000   0.000000   0.000000   0.000000   0.000000   0.000000
      1       0.000000   0.000000   0.000000   0.000000   0.000000   0.000000
      2       0.000000   0.000000   0.000000   0.000000   0.000000   0.000000
      3       0.000000   0.000000   0.000000   0.000000   0.000000   0.000000
      4       0.000000   0.000000   0.000000   0.000000   0.000000   0.000000
      5       0.000000   0.000000   0.000000   0.000000   0.000000   0.000000
      6       0.000000   0.000000   0.000000   0.000000   0.000000   0.000000
      7       0.000000   0.000000   0.000000   0.000000   0.000000   0.000000
      8       0.000000   0.000000   0.000000   0.000000   0.000000   0.000000
                  6          7          8
      0       0.000000   0.000000   0.000000
      1       0.000000   0.000000   0.070000
      2       0.070000   0.050000   0.000000
      3       0.000000   0.000000   0.000000
      4       0.420000   0.580000  -0.560000
      5      -0.560000   0.400000  -0.430000
      6       0.000000   0.000000   0.000000
      7      -0.420000  -0.580000  -0.560000
      8      -0.560000   0.400000   0.430000


-----------
IR SPECTRUM
-----------

 Mode   freq       eps      Int      T**2         TX        TY        TZ
       cm**-1   L/(mol*km)   km/mol    a.u.
----------------------------------------------------------------------------
  6:    -412.70   0.023000  120.50  0.004300  ( 0.000000  0.000000  0.065574)
  7:    1634.75   0.011437   71.53  0.002183  ( 0.000000  0.000000  0.046722)
  8:    3906.69   0.009502   60.11  0.000759  ( 0.000000 -0.027551  0.000000)

* The epsilon (eps) is given for a Dirac delta lineshape.

--------------------------
THERMOCHEMISTRY AT 298.15K
--------------------------

Electronic energy                ...    -76.40912346 Eh
Zero point energy                ...      0.02118900 Eh      13.30 kcal/mol
Thermal vibrational correction   ...      0.00000200 Eh       0.00 kcal/mol
Thermal rotational correction    ...      0.00141627 Eh       0.89 kcal/mol
Thermal translational correction ...      0.00141627 Eh       0.89 kcal/mol
-----------------------------------------------------------------------
Total thermal energy                    -76.38509992 Eh

Total thermal correction                  0.00283454 Eh       1.78 kcal/mol
Non-thermal (ZPE) correction              0.02118900 Eh      13.30 kcal/mol
-----------------------------------------------------------------------
Total correction                          0.02402354 Eh      15.07 kcal/mol

Total Enthalpy                    ...    -76.38415571 Eh
Thermal Enthalpy correction       ...      0.00094421 Eh       0.59 kcal/mol

Final entropy term                ...      0.02144100 Eh     13.45 kcal/mol

Final Gibbs free energy         ...    -76.40559671 Eh

For completeness - the G-E(el) term, i.e. all contributions
except the electronic energy:
G-E(el)                           ...      0.00352675 Eh      2.21 kcal/mol

                             ****ORCA TERMINATED NORMALLY****
"#;

    fn parse(text: &str) -> Result<OutputRecord, OutputError> {
        OrcaOutput::read_from(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn reads_final_energy_and_trace() {
        let record = parse(WATER_OPT_FREQ).unwrap();
        assert_eq!(record.software, Software::Orca);
        assert_eq!(record.energy, Some(-76.4091234567));
        assert_eq!(
            record.trace.scf_energies,
            vec![-76.408953326701, -76.4091234567]
        );
    }

    #[test]
    fn reads_every_angstrom_coordinate_block() {
        let record = parse(WATER_OPT_FREQ).unwrap();
        assert_eq!(record.geometries.len(), 2);
        let last = record.final_geometry().unwrap();
        assert_eq!(last.len(), 3);
        assert_eq!(last.atoms()[0].element, "O");
        assert!((last.atoms()[2].position.y + 0.7633).abs() < 1e-9);
    }

    #[test]
    fn reads_convergence_table() {
        let record = parse(WATER_OPT_FREQ).unwrap();
        assert_eq!(record.converged, Some(true));
        let names: Vec<&str> = record
            .trace
            .criteria
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Energy change", "RMS gradient", "MAX gradient", "RMS step", "MAX step"]
        );
        assert_eq!(record.trace.criteria[0].values.len(), 2);
        assert!(record.trace.criteria[0].converged);
    }

    #[test]
    fn first_cycle_alone_is_not_converged() {
        let cut = WATER_OPT_FREQ
            .find("Total Energy       :          -76.40912345670000")
            .unwrap();
        let record = parse(&WATER_OPT_FREQ[..cut]).unwrap();
        assert_eq!(record.converged, Some(false));
        assert!(!record.has_frequencies());
        assert_eq!(record.thermal_dg(), None);
    }

    #[test]
    fn reads_solvent_charge_and_multiplicity() {
        let record = parse(WATER_OPT_FREQ).unwrap();
        assert_eq!(record.solvent.as_deref(), Some("WATER"));
        assert_eq!(record.charge, Some(0));
        assert_eq!(record.multiplicity, Some(1));
    }

    #[test]
    fn thermal_values_are_corrections_to_electronic_energy() {
        let record = parse(WATER_OPT_FREQ).unwrap();
        assert_eq!(record.zero_point(), Some(0.021189));
        assert_eq!(record.thermal_de(), Some(0.02402354));
        assert!((record.thermal_dh().unwrap() - (0.02402354 + 0.00094421)).abs() < 1e-12);
        assert_eq!(record.thermal_dg(), Some(0.00352675));
    }

    #[test]
    fn thermal_values_fall_back_to_absolute_minus_electronic() {
        let text = WATER_OPT_FREQ
            .replace("Total correction  ", "Summed correction  ")
            .replace("G-E(el)  ", "Gminus  ");
        let record = parse(&text).unwrap();
        let dg = record.thermal_dg().unwrap();
        assert!((dg - (-76.40559671 + 76.40912346)).abs() < 1e-9);
        let de = record.thermal_de().unwrap();
        assert!((de - (-76.38509992 + 76.40912346)).abs() < 1e-9);
    }

    #[test]
    fn skips_zero_modes_and_keeps_imaginary_sign() {
        let record = parse(WATER_OPT_FREQ).unwrap();
        let frequencies: Vec<f64> = record.vibrations.iter().map(|v| v.frequency).collect();
        assert_eq!(frequencies, vec![-412.7, 1634.75, 3906.69]);
        assert_eq!(record.vibrations[0].ir_intensity, 120.5);
        assert_eq!(record.vibrations[1].ir_intensity, 71.53);
        assert_eq!(record.imaginary().count(), 1);
    }

    #[test]
    fn normal_modes_are_grouped_per_atom() {
        let record = parse(WATER_OPT_FREQ).unwrap();
        assert_eq!(record.normal_modes.len(), 3);
        let imaginary = &record.normal_modes[0];
        assert_eq!(imaginary.frequency, -412.7);
        assert_eq!(
            imaginary.displacements,
            vec![
                Vector3::new(0.0, 0.0, 0.07),
                Vector3::new(0.0, 0.42, -0.56),
                Vector3::new(0.0, -0.42, -0.56),
            ]
        );
    }

    #[test]
    fn file_without_coordinates_is_an_error() {
        let result = parse("FINAL SINGLE POINT ENERGY       -1.0\n");
        assert!(matches!(
            result,
            Err(OutputError::NoGeometry {
                software: Software::Orca
            })
        ));
    }
}
