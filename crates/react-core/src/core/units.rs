use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const KCAL_PER_HARTREE: f64 = 627.51;
const KJ_PER_HARTREE: f64 = 2625.51;

/// The unit energies are presented in.
///
/// All extraction and aggregation happens in Hartree; a unit is applied only when
/// values leave the library for display or export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnergyUnit {
    #[default]
    Hartree,
    KcalPerMol,
    KjPerMol,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown energy unit '{0}'. Expected 'hartree', 'kcal/mol' or 'kj/mol'.")]
pub struct UnknownUnitError(pub String);

impl EnergyUnit {
    pub fn factor(self) -> f64 {
        match self {
            EnergyUnit::Hartree => 1.0,
            EnergyUnit::KcalPerMol => KCAL_PER_HARTREE,
            EnergyUnit::KjPerMol => KJ_PER_HARTREE,
        }
    }

    #[inline]
    pub fn convert(self, hartree: f64) -> f64 {
        hartree * self.factor()
    }

    pub fn label(self) -> &'static str {
        match self {
            EnergyUnit::Hartree => "Hartree",
            EnergyUnit::KcalPerMol => "kcal/mol",
            EnergyUnit::KjPerMol => "kJ/mol",
        }
    }
}

/// Rounds half away from zero to two decimals, the precision relative energies are shown at.
///
/// Formatting with `{:.2}` alone rounds the binary value, which turns an exact
/// `313.755` into `313.75`.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EnergyUnit {
    type Err = UnknownUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hartree" | "au" | "a.u." | "eh" => Ok(EnergyUnit::Hartree),
            "kcal" | "kcal/mol" | "kcal_mol" => Ok(EnergyUnit::KcalPerMol),
            "kj" | "kj/mol" | "kj_mol" => Ok(EnergyUnit::KjPerMol),
            _ => Err(UnknownUnitError(s.to_string())),
        }
    }
}
