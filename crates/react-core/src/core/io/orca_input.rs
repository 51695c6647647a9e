use crate::core::models::geometry::Geometry;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConstraintParseError {
    #[error("Unknown constraint type '{0}' (expected atom, bond, angle or dihedral)")]
    UnknownKind(String),
    #[error("Invalid atom number '{0}' (atoms are numbered from 1)")]
    InvalidAtom(String),
    #[error("A {kind} constraint takes {expected} atom(s), got {found}")]
    WrongAtomCount {
        kind: ConstraintKind,
        expected: usize,
        found: usize,
    },
}

/// What a geometry constraint freezes, written as ORCA's one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Atom,
    Bond,
    Angle,
    Dihedral,
}

impl ConstraintKind {
    pub fn code(&self) -> char {
        match self {
            Self::Atom => 'C',
            Self::Bond => 'B',
            Self::Angle => 'A',
            Self::Dihedral => 'D',
        }
    }

    pub fn atom_count(&self) -> usize {
        match self {
            Self::Atom => 1,
            Self::Bond => 2,
            Self::Angle => 3,
            Self::Dihedral => 4,
        }
    }

    fn from_atom_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::Atom),
            2 => Some(Self::Bond),
            3 => Some(Self::Angle),
            4 => Some(Self::Dihedral),
            _ => None,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Atom => "atom",
            Self::Bond => "bond",
            Self::Angle => "angle",
            Self::Dihedral => "dihedral",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ConstraintKind {
    type Err = ConstraintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "atom" | "cartesian" => Ok(Self::Atom),
            "b" | "bond" => Ok(Self::Bond),
            "a" | "angle" => Ok(Self::Angle),
            "d" | "dihedral" => Ok(Self::Dihedral),
            _ => Err(ConstraintParseError::UnknownKind(s.trim().to_string())),
        }
    }
}

/// A frozen coordinate. Atoms are numbered from 1 as shown to users; the
/// written `%geom` block uses ORCA's 0-based indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    atoms: Vec<usize>,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, atoms: Vec<usize>) -> Result<Self, ConstraintParseError> {
        if atoms.len() != kind.atom_count() {
            return Err(ConstraintParseError::WrongAtomCount {
                kind,
                expected: kind.atom_count(),
                found: atoms.len(),
            });
        }
        if let Some(bad) = atoms.iter().find(|&&a| a == 0) {
            return Err(ConstraintParseError::InvalidAtom(bad.to_string()));
        }
        Ok(Self { kind, atoms })
    }

    pub fn bond(first: usize, second: usize) -> Result<Self, ConstraintParseError> {
        Self::new(ConstraintKind::Bond, vec![first, second])
    }

    /// Atom numbers, 1-based.
    pub fn atoms(&self) -> &[usize] {
        &self.atoms
    }

    /// Largest atom number referenced.
    pub fn highest_atom(&self) -> usize {
        self.atoms.iter().copied().max().unwrap_or(0)
    }
}

/// Accepts `KIND:i,j,...` (e.g. `bond:1,2`, `D:1,2,3,4`) or a bare list of atom
/// numbers whose length selects the kind.
impl FromStr for Constraint {
    type Err = ConstraintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, atoms_part) = match s.split_once(':') {
            Some((kind, atoms)) => (Some(kind.parse::<ConstraintKind>()?), atoms),
            None => (None, s),
        };
        let atoms = atoms_part
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<usize>()
                    .map_err(|_| ConstraintParseError::InvalidAtom(t.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let kind = match kind {
            Some(kind) => kind,
            None => ConstraintKind::from_atom_count(atoms.len()).ok_or(
                ConstraintParseError::WrongAtomCount {
                    kind: ConstraintKind::Dihedral,
                    expected: 4,
                    found: atoms.len(),
                },
            )?,
        };
        Self::new(kind, atoms)
    }
}

/// Implicit solvation on the simple-input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Solvation {
    /// `MODEL(solvent)`, e.g. `CPCM(water)`.
    Named { model: String, solvent: String },
    /// A bare `MODEL` keyword with a `%cpcm epsilon` block instead of a named solvent.
    Epsilon { model: String, epsilon: f64 },
}

/// Everything an ORCA input needs besides the coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OrcaInput {
    pub functional: String,
    pub basis: String,
    pub job_type: String,
    pub frequencies: bool,
    pub keywords: Vec<String>,
    pub solvation: Option<Solvation>,
    /// `%name ... END` blocks in insertion order.
    pub blocks: Vec<(String, String)>,
    pub charge: i32,
    pub multiplicity: u32,
    pub constraints: Vec<Constraint>,
}

impl OrcaInput {
    pub fn new(functional: &str, basis: &str, job_type: &str) -> Self {
        Self {
            functional: functional.to_string(),
            basis: basis.to_string(),
            job_type: job_type.to_string(),
            frequencies: false,
            keywords: Vec::new(),
            solvation: None,
            blocks: Vec::new(),
            charge: 0,
            multiplicity: 1,
            constraints: Vec::new(),
        }
    }

    /// The `! ...` line: functional, basis, job type, `Freq`, extra keywords, solvation.
    pub fn simple_input(&self) -> String {
        let mut words: Vec<String> = vec![
            self.functional.clone(),
            self.basis.clone(),
            self.job_type.clone(),
        ];
        if self.frequencies {
            words.push("Freq".to_string());
        }
        words.extend(self.keywords.iter().cloned());
        match &self.solvation {
            Some(Solvation::Named { model, solvent }) => words.push(format!("{model}({solvent})")),
            Some(Solvation::Epsilon { model, .. }) => words.push(model.clone()),
            None => {}
        }
        let words: Vec<&str> = words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .collect();
        format!("! {}", words.join(" "))
    }
}

/// Writer for ORCA input files (`.inp`).
pub struct OrcaInputFile;

impl OrcaInputFile {
    pub fn write_to(
        input: &OrcaInput,
        geometry: &Geometry,
        writer: &mut impl Write,
    ) -> io::Result<()> {
        writeln!(writer, "{}", input.simple_input())?;
        writeln!(writer)?;

        if let Some(Solvation::Epsilon { epsilon, .. }) = &input.solvation {
            writeln!(writer, "%cpcm\n  epsilon {}\nEND\n", epsilon)?;
        }
        for (name, content) in &input.blocks {
            writeln!(writer, "%{}", name.trim_start_matches('%'))?;
            for line in content.lines() {
                writeln!(writer, "  {}", line.trim())?;
            }
            writeln!(writer, "END\n")?;
        }

        writeln!(writer, "* xyz {} {}", input.charge, input.multiplicity)?;
        for atom in geometry.atoms() {
            let p = atom.position;
            writeln!(
                writer,
                "{:<2} {:>14.8} {:>14.8} {:>14.8}",
                atom.element, p.x, p.y, p.z
            )?;
        }
        writeln!(writer, "*")?;

        if !input.constraints.is_empty() {
            writeln!(writer, "\n%geom\n  Constraints")?;
            for constraint in &input.constraints {
                let indices: Vec<String> = constraint
                    .atoms()
                    .iter()
                    .map(|a| (a - 1).to_string())
                    .collect();
                writeln!(
                    writer,
                    "    {{ {} {} C }}",
                    constraint.kind.code(),
                    indices.join(" ")
                )?;
            }
            writeln!(writer, "  END\nEND")?;
        }
        Ok(())
    }
}
