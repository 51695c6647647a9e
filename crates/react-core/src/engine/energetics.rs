//! Relative energetics of every state against the reference state 1.
//!
//! Corrections are layered in a fixed order: the main electronic energy difference,
//! then thermal corrections from the frequency slot, then the solvation correction,
//! and finally the big-basis substitution. Each layer only applies when the data it
//! needs exists for both the state and the reference; otherwise its terms are simply
//! absent. All values are in Hartree.

use super::registry::{Slot, StateId, StateRegistry, StateSlots};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Thermal corrections of a state relative to the reference (`ddG`, `ddH`, `ddE`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThermalDeltas {
    pub dd_g: Option<f64>,
    pub dd_h: Option<f64>,
    pub dd_e: Option<f64>,
}

/// Relative free energy, enthalpy and internal energy with every applicable correction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompositeDeltas {
    pub d_g: Option<f64>,
    pub d_h: Option<f64>,
    pub d_e: Option<f64>,
}

impl CompositeDeltas {
    fn shift(&mut self, amount: f64) {
        for value in [&mut self.d_g, &mut self.d_h, &mut self.d_e] {
            if let Some(v) = value {
                *v += amount;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolvationDeltas {
    /// Solvation energy of the state minus that of the reference.
    pub dd_solv: f64,
    /// Solvation energy of the state itself.
    pub d_solv: f64,
}

/// Every relative term that could be computed for one state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateDeltas {
    pub main: Option<f64>,
    pub thermal: Option<ThermalDeltas>,
    pub composite: Option<CompositeDeltas>,
    pub solvation: Option<SolvationDeltas>,
    pub big: Option<f64>,
}

impl StateDeltas {
    pub fn get(&self, term: DeltaTerm) -> Option<f64> {
        match term {
            DeltaTerm::Main => self.main,
            DeltaTerm::Big => self.big,
            DeltaTerm::DdSolv => self.solvation.map(|s| s.dd_solv),
            DeltaTerm::DSolv => self.solvation.map(|s| s.d_solv),
            DeltaTerm::DdG => self.thermal.and_then(|t| t.dd_g),
            DeltaTerm::DdH => self.thermal.and_then(|t| t.dd_h),
            DeltaTerm::DdE => self.thermal.and_then(|t| t.dd_e),
            DeltaTerm::DG => self.composite.and_then(|c| c.d_g),
            DeltaTerm::DH => self.composite.and_then(|c| c.d_h),
            DeltaTerm::DE => self.composite.and_then(|c| c.d_e),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown energy term '{0}'. Expected one of: main, big, ddSolv, dSolv, ddG, ddH, ddE, dG, dH, dE")]
pub struct UnknownTermError(pub String);

/// The named relative terms, as used for tables and diagram series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaTerm {
    Main,
    Big,
    DdSolv,
    DSolv,
    DdG,
    DdH,
    DdE,
    DG,
    DH,
    DE,
}

impl DeltaTerm {
    pub const ALL: [DeltaTerm; 10] = [
        DeltaTerm::Main,
        DeltaTerm::Big,
        DeltaTerm::DdSolv,
        DeltaTerm::DSolv,
        DeltaTerm::DdG,
        DeltaTerm::DdH,
        DeltaTerm::DdE,
        DeltaTerm::DG,
        DeltaTerm::DH,
        DeltaTerm::DE,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DeltaTerm::Main => "main",
            DeltaTerm::Big => "big",
            DeltaTerm::DdSolv => "ddSolv",
            DeltaTerm::DSolv => "dSolv",
            DeltaTerm::DdG => "ddG",
            DeltaTerm::DdH => "ddH",
            DeltaTerm::DdE => "ddE",
            DeltaTerm::DG => "dG",
            DeltaTerm::DH => "dH",
            DeltaTerm::DE => "dE",
        }
    }
}

impl fmt::Display for DeltaTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DeltaTerm {
    type Err = UnknownTermError;

    /// Keys are case-sensitive: `dG` and `DG` are different things to a chemist.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DeltaTerm::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| UnknownTermError(s.to_string()))
    }
}

/// The outcome of [`relative_energies`].
#[derive(Debug, Clone, PartialEq)]
pub enum RelativeEnergies {
    /// State 1 has no main-slot energy, so nothing can be expressed relative to it.
    NoReference,
    Computed(BTreeMap<StateId, StateDeltas>),
}

impl RelativeEnergies {
    pub fn get(&self, state: StateId) -> Option<&StateDeltas> {
        match self {
            RelativeEnergies::NoReference => None,
            RelativeEnergies::Computed(deltas) => deltas.get(&state),
        }
    }

    pub fn reference(&self) -> Option<&StateDeltas> {
        self.get(StateId::REFERENCE)
    }
}

/// Computes the relative energetics of every registered state against state 1.
///
/// Missing records or values omit the affected terms; a state with no usable data
/// still appears, with every term absent. The registry is only read.
pub fn relative_energies(registry: &StateRegistry) -> RelativeEnergies {
    let Some(reference) = registry.slots(StateId::REFERENCE) else {
        return RelativeEnergies::NoReference;
    };
    if reference.energy(Slot::Main).is_none() {
        return RelativeEnergies::NoReference;
    }

    let deltas: BTreeMap<StateId, StateDeltas> = registry
        .states()
        .map(|(id, slots)| (id, state_deltas(slots, reference)))
        .collect();
    debug!(states = deltas.len(), "Computed relative energies.");
    RelativeEnergies::Computed(deltas)
}

fn state_deltas(state: &StateSlots, reference: &StateSlots) -> StateDeltas {
    let mut deltas = StateDeltas::default();

    let main_energy = state.energy(Slot::Main);
    let reference_main = reference.energy(Slot::Main);
    deltas.main = difference(main_energy, reference_main);

    let thermal = match (state.record(Slot::Frequency), reference.record(Slot::Frequency)) {
        (Some(s), Some(r)) if s.has_frequencies() && r.has_frequencies() => Some(ThermalDeltas {
            dd_g: difference(s.thermal_dg(), r.thermal_dg()),
            dd_h: difference(s.thermal_dh(), r.thermal_dh()),
            dd_e: difference(s.thermal_de(), r.thermal_de()),
        }),
        _ => None,
    };
    deltas.thermal = thermal;
    if let (Some(main), Some(thermal)) = (deltas.main, thermal) {
        deltas.composite = Some(CompositeDeltas {
            d_g: thermal.dd_g.map(|dd| main + dd),
            d_h: thermal.dd_h.map(|dd| main + dd),
            d_e: thermal.dd_e.map(|dd| main + dd),
        });
    }

    let solvation_of = |slots: &StateSlots| difference(slots.energy(Slot::Solvation), slots.energy(Slot::Main));
    if let (Some(solv), Some(reference_solv)) = (solvation_of(state), solvation_of(reference)) {
        let dd_solv = solv - reference_solv;
        deltas.solvation = Some(SolvationDeltas {
            dd_solv,
            d_solv: solv,
        });
        if let Some(composite) = deltas.composite.as_mut() {
            composite.shift(dd_solv);
        }
    }

    deltas.big = difference(state.energy(Slot::BigBasis), reference.energy(Slot::BigBasis));
    if let (Some(big), Some(main), Some(composite)) =
        (deltas.big, deltas.main, deltas.composite.as_mut())
    {
        composite.shift(big - main);
    }

    deltas
}

fn difference(value: Option<f64>, reference: Option<f64>) -> Option<f64> {
    Some(value? - reference?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::record::{OutputRecord, Software, ThermalCorrections};
    use std::sync::Arc;

    fn id(n: u32) -> StateId {
        StateId::new(n).unwrap()
    }

    fn energy(e: f64) -> Option<Arc<OutputRecord>> {
        Some(Arc::new(OutputRecord::new(Software::Gaussian).with_energy(e)))
    }

    fn freq(e: f64, dg: f64, dh: f64, de: f64) -> Option<Arc<OutputRecord>> {
        Some(Arc::new(
            OutputRecord::new(Software::Gaussian)
                .with_energy(e)
                .with_thermal(ThermalCorrections {
                    zero_point: Some(0.02),
                    energy: Some(de),
                    enthalpy: Some(dh),
                    gibbs: Some(dg),
                }),
        ))
    }

    fn solvated(e: f64) -> Option<Arc<OutputRecord>> {
        Some(Arc::new(
            OutputRecord::new(Software::Gaussian)
                .with_energy(e)
                .with_solvent("water"),
        ))
    }

    fn assign(registry: &mut StateRegistry, state: u32, slot: Slot, record: Option<Arc<OutputRecord>>) {
        let path = format!("s{state}_{slot}.log");
        registry.assign(id(state), slot, path, record).unwrap();
    }

    fn computed(relative: &RelativeEnergies) -> &BTreeMap<StateId, StateDeltas> {
        match relative {
            RelativeEnergies::Computed(deltas) => deltas,
            RelativeEnergies::NoReference => panic!("expected computed energies"),
        }
    }

    fn two_state_main() -> StateRegistry {
        let mut registry = StateRegistry::new();
        assign(&mut registry, 1, Slot::Main, energy(-100.0));
        assign(&mut registry, 2, Slot::Main, energy(-99.5));
        registry
    }

    #[test]
    fn main_delta_is_relative_to_state_one() {
        let relative = relative_energies(&two_state_main());
        let deltas = computed(&relative);
        assert_eq!(deltas[&id(1)].main, Some(0.0));
        assert_eq!(deltas[&id(2)].main, Some(0.5));
        assert!(deltas[&id(2)].thermal.is_none());
        assert!(deltas[&id(2)].composite.is_none());
    }

    #[test]
    fn half_hartree_reads_as_313_76_kcal() {
        use crate::core::units::{EnergyUnit, round_to_hundredths};
        let relative = relative_energies(&two_state_main());
        let main = relative.get(id(2)).and_then(|d| d.main).unwrap();
        let kcal = round_to_hundredths(EnergyUnit::KcalPerMol.convert(main));
        assert_eq!(format!("{:.2}", kcal), "313.76");
    }

    #[test]
    fn thermal_corrections_build_composite_free_energy() {
        let mut registry = StateRegistry::new();
        assign(&mut registry, 1, Slot::Main, energy(-100.0));
        assign(&mut registry, 1, Slot::Frequency, freq(-100.0, 0.02, 0.03, 0.025));
        assign(&mut registry, 2, Slot::Main, energy(-99.4));
        assign(&mut registry, 2, Slot::Frequency, freq(-99.4, 0.03, 0.035, 0.03));

        let relative = relative_energies(&registry);
        let state2 = relative.get(id(2)).unwrap();
        assert!((state2.main.unwrap() - 0.6).abs() < 1e-9);
        assert!((state2.get(DeltaTerm::DdG).unwrap() - 0.01).abs() < 1e-9);
        assert!((state2.get(DeltaTerm::DG).unwrap() - 0.61).abs() < 1e-9);
        assert!((state2.get(DeltaTerm::DH).unwrap() - 0.605).abs() < 1e-9);
        assert!((state2.get(DeltaTerm::DE).unwrap() - 0.605).abs() < 1e-9);

        let reference = relative.reference().unwrap();
        assert_eq!(reference.get(DeltaTerm::DG), Some(0.0));
    }

    #[test]
    fn solvation_layers_onto_composite() {
        let mut registry = StateRegistry::new();
        assign(&mut registry, 1, Slot::Main, energy(-100.0));
        assign(&mut registry, 1, Slot::Frequency, freq(-100.0, 0.02, 0.03, 0.025));
        assign(&mut registry, 1, Slot::Solvation, solvated(-100.01));
        assign(&mut registry, 2, Slot::Main, energy(-99.4));
        assign(&mut registry, 2, Slot::Frequency, freq(-99.4, 0.03, 0.035, 0.03));
        assign(&mut registry, 2, Slot::Solvation, solvated(-99.43));

        let relative = relative_energies(&registry);
        let s = relative.get(id(2)).unwrap();
        let main = s.main.unwrap();
        let dd_g = s.get(DeltaTerm::DdG).unwrap();
        let dd_solv = s.get(DeltaTerm::DdSolv).unwrap();
        assert!((dd_solv - (-0.02)).abs() < 1e-9);
        assert!((s.get(DeltaTerm::DSolv).unwrap() - (-0.03)).abs() < 1e-9);
        assert!((s.get(DeltaTerm::DG).unwrap() - (main + dd_g + dd_solv)).abs() < 1e-9);
    }

    #[test]
    fn solvation_without_frequencies_leaves_composite_absent() {
        let mut registry = two_state_main();
        assign(&mut registry, 1, Slot::Solvation, solvated(-100.01));
        assign(&mut registry, 2, Slot::Solvation, solvated(-99.52));
        let relative = relative_energies(&registry);
        let s = relative.get(id(2)).unwrap();
        assert!(s.solvation.is_some());
        assert!(s.composite.is_none());
        assert_eq!(s.main, Some(0.5));
    }

    #[test]
    fn big_basis_substitutes_main_in_composite_only() {
        let mut registry = StateRegistry::new();
        assign(&mut registry, 1, Slot::Main, energy(-100.0));
        assign(&mut registry, 1, Slot::Frequency, freq(-100.0, 0.02, 0.03, 0.025));
        assign(&mut registry, 1, Slot::Solvation, solvated(-100.01));
        assign(&mut registry, 1, Slot::BigBasis, energy(-100.2));
        assign(&mut registry, 2, Slot::Main, energy(-99.4));
        assign(&mut registry, 2, Slot::Frequency, freq(-99.4, 0.03, 0.035, 0.03));
        assign(&mut registry, 2, Slot::Solvation, solvated(-99.43));
        assign(&mut registry, 2, Slot::BigBasis, energy(-99.65));

        let relative = relative_energies(&registry);
        let s = relative.get(id(2)).unwrap();
        let main = s.main.unwrap();
        let big = s.big.unwrap();
        assert!((main - 0.6).abs() < 1e-9);
        assert!((big - 0.55).abs() < 1e-9);
        let expected = main
            + s.get(DeltaTerm::DdG).unwrap()
            + s.get(DeltaTerm::DdSolv).unwrap()
            + (big - main);
        assert!((s.get(DeltaTerm::DG).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn missing_reference_energy_is_no_reference() {
        let mut registry = StateRegistry::new();
        assign(&mut registry, 2, Slot::Main, energy(-99.5));
        assert_eq!(relative_energies(&registry), RelativeEnergies::NoReference);

        registry.assign(id(1), Slot::Main, "broken.log", None).unwrap();
        assert_eq!(relative_energies(&registry), RelativeEnergies::NoReference);
        assert_eq!(relative_energies(&StateRegistry::new()), RelativeEnergies::NoReference);
    }

    #[test]
    fn failed_state_does_not_abort_others() {
        let mut registry = two_state_main();
        registry.assign(id(3), Slot::Main, "broken.log", None).unwrap();
        let relative = relative_energies(&registry);
        let deltas = computed(&relative);
        assert_eq!(deltas.len(), 3);
        assert_eq!(deltas[&id(3)], StateDeltas::default());
        assert_eq!(deltas[&id(2)].main, Some(0.5));
    }

    #[test]
    fn frequency_on_one_side_only_omits_thermal_terms() {
        let mut registry = two_state_main();
        assign(&mut registry, 2, Slot::Frequency, freq(-99.5, 0.03, 0.035, 0.03));
        let relative = relative_energies(&registry);
        let s = relative.get(id(2)).unwrap();
        assert!(s.thermal.is_none());
        assert_eq!(s.get(DeltaTerm::DG), None);
    }

    #[test]
    fn reference_without_enthalpy_keeps_the_other_thermal_terms() {
        let mut registry = StateRegistry::new();
        assign(&mut registry, 1, Slot::Main, energy(-100.0));
        let reference_freq = OutputRecord::new(Software::Orca)
            .with_energy(-100.0)
            .with_thermal(ThermalCorrections {
                zero_point: Some(0.02),
                energy: Some(0.025),
                enthalpy: None,
                gibbs: Some(0.02),
            });
        assign(&mut registry, 1, Slot::Frequency, Some(Arc::new(reference_freq)));
        assign(&mut registry, 2, Slot::Main, energy(-99.4));
        assign(&mut registry, 2, Slot::Frequency, freq(-99.4, 0.03, 0.035, 0.03));

        let relative = relative_energies(&registry);
        let state2 = relative.get(id(2)).unwrap();
        assert_eq!(state2.get(DeltaTerm::DdH), None);
        assert_eq!(state2.get(DeltaTerm::DH), None);
        assert!((state2.get(DeltaTerm::DdG).unwrap() - 0.01).abs() < 1e-9);
        assert!((state2.get(DeltaTerm::DG).unwrap() - 0.61).abs() < 1e-9);
        assert!((state2.get(DeltaTerm::DE).unwrap() - 0.605).abs() < 1e-9);
    }

    #[test]
    fn terms_parse_from_their_keys() {
        assert_eq!("dG".parse(), Ok(DeltaTerm::DG));
        assert_eq!("ddSolv".parse(), Ok(DeltaTerm::DdSolv));
        assert!("DG".parse::<DeltaTerm>().is_err());
        for term in DeltaTerm::ALL {
            assert_eq!(term.key().parse(), Ok(term));
        }
    }
}
