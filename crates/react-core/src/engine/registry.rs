//! The state/slot registry: which file plays which role for each state of a reaction.
//!
//! A state is one point along the reaction coordinate. It has four fixed slots,
//! in compose order: the main electronic energy, the thermal (frequency) correction,
//! the solvation correction and the big-basis-set energy. Each slot is empty or holds
//! exactly one file. A file whose extraction failed keeps its path with no record,
//! and every consumer treats that the same as "no data for this slot".

use crate::core::models::record::OutputRecord;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid state id '{0}': states are numbered from 1")]
    InvalidState(String),
    #[error("Unknown slot '{0}'. Expected one of: main, frequency, solvation, big-basis")]
    UnknownSlot(String),
    #[error("No frequencies found in {path:?}")]
    NoFrequencies { path: PathBuf },
    #[error("No solvent found in {path:?}")]
    NoSolvent { path: PathBuf },
}

/// Identifier of a reaction state. State 1 is the reference all others are compared to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    pub const REFERENCE: StateId = StateId(1);

    pub fn new(id: u32) -> Result<Self, RegistryError> {
        if id == 0 {
            return Err(RegistryError::InvalidState(id.to_string()));
        }
        Ok(Self(id))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_reference(self) -> bool {
        self == Self::REFERENCE
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StateId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u32 = s
            .trim()
            .parse()
            .map_err(|_| RegistryError::InvalidState(s.to_string()))?;
        Self::new(id)
    }
}

/// The role a file plays for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Main,
    Frequency,
    Solvation,
    BigBasis,
}

impl Slot {
    /// All slots in the order their corrections are composed.
    pub const ALL: [Slot; 4] = [Slot::Main, Slot::Frequency, Slot::Solvation, Slot::BigBasis];

    pub fn index(self) -> usize {
        match self {
            Slot::Main => 0,
            Slot::Frequency => 1,
            Slot::Solvation => 2,
            Slot::BigBasis => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Main => "main",
            Slot::Frequency => "frequency",
            Slot::Solvation => "solvation",
            Slot::BigBasis => "big-basis",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Slot {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "main" | "energy" => Ok(Slot::Main),
            "1" | "frequency" | "freq" | "thermal" => Ok(Slot::Frequency),
            "2" | "solvation" | "solv" | "solvent" => Ok(Slot::Solvation),
            "3" | "big-basis" | "big_basis" | "big" => Ok(Slot::BigBasis),
            _ => Err(RegistryError::UnknownSlot(s.to_string())),
        }
    }
}

/// A file assigned to a slot, with its extracted record if extraction succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotFile {
    pub path: PathBuf,
    pub record: Option<Arc<OutputRecord>>,
}

impl SlotFile {
    pub fn new(path: impl Into<PathBuf>, record: Option<Arc<OutputRecord>>) -> Self {
        Self {
            path: path.into(),
            record,
        }
    }

    pub fn energy(&self) -> Option<f64> {
        self.record.as_ref().and_then(|r| r.energy)
    }
}

/// The four slots of one state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSlots {
    pub main: Option<SlotFile>,
    pub frequency: Option<SlotFile>,
    pub solvation: Option<SlotFile>,
    pub big_basis: Option<SlotFile>,
}

impl StateSlots {
    pub fn get(&self, slot: Slot) -> Option<&SlotFile> {
        match slot {
            Slot::Main => self.main.as_ref(),
            Slot::Frequency => self.frequency.as_ref(),
            Slot::Solvation => self.solvation.as_ref(),
            Slot::BigBasis => self.big_basis.as_ref(),
        }
    }

    fn get_mut(&mut self, slot: Slot) -> &mut Option<SlotFile> {
        match slot {
            Slot::Main => &mut self.main,
            Slot::Frequency => &mut self.frequency,
            Slot::Solvation => &mut self.solvation,
            Slot::BigBasis => &mut self.big_basis,
        }
    }

    pub fn record(&self, slot: Slot) -> Option<&OutputRecord> {
        self.get(slot).and_then(|f| f.record.as_deref())
    }

    pub fn energy(&self, slot: Slot) -> Option<f64> {
        self.get(slot).and_then(SlotFile::energy)
    }

    pub fn is_empty(&self) -> bool {
        Slot::ALL.iter().all(|s| self.get(*s).is_none())
    }
}

/// All states of a reaction, ordered by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateRegistry {
    states: BTreeMap<StateId, StateSlots>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty state if it does not exist yet.
    pub fn ensure_state(&mut self, state: StateId) -> &mut StateSlots {
        self.states.entry(state).or_default()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &StateSlots)> {
        self.states.iter().map(|(id, slots)| (*id, slots))
    }

    pub fn slots(&self, state: StateId) -> Option<&StateSlots> {
        self.states.get(&state)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn path(&self, state: StateId, slot: Slot) -> Option<&Path> {
        self.slots(state)?.get(slot).map(|f| f.path.as_path())
    }

    pub fn record(&self, state: StateId, slot: Slot) -> Option<&OutputRecord> {
        self.slots(state)?.record(slot)
    }

    /// Assigns a file to a slot, creating the state if needed.
    ///
    /// A frequency slot needs a record with frequencies and a solvation slot a record
    /// with a solvent; a file without a record skips these checks. Assigning to any
    /// slot while the main slot is empty fills the main slot with the same file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NoFrequencies`] or [`RegistryError::NoSolvent`] when the
    /// record cannot serve the slot. The registry is left unchanged in that case.
    pub fn assign(
        &mut self,
        state: StateId,
        slot: Slot,
        path: impl Into<PathBuf>,
        record: Option<Arc<OutputRecord>>,
    ) -> Result<(), RegistryError> {
        let path = path.into();
        if let Some(record) = record.as_deref() {
            match slot {
                Slot::Frequency if !record.has_frequencies() => {
                    return Err(RegistryError::NoFrequencies { path });
                }
                Slot::Solvation if !record.has_solvent() => {
                    return Err(RegistryError::NoSolvent { path });
                }
                _ => {}
            }
        }

        debug!(%state, %slot, path = %path.display(), "Assigning file to slot.");
        let slots = self.ensure_state(state);
        let file = SlotFile::new(path, record);
        if slot != Slot::Main && slots.main.is_none() {
            slots.main = Some(file.clone());
        }
        *slots.get_mut(slot) = Some(file);
        Ok(())
    }

    /// Assigns a file to the main slot and to every other slot its record can serve:
    /// the frequency slot if it has frequencies, the solvation slot if it has a solvent.
    ///
    /// Returns the slots that were filled.
    pub fn assign_auto(
        &mut self,
        state: StateId,
        path: impl Into<PathBuf>,
        record: Option<Arc<OutputRecord>>,
    ) -> Vec<Slot> {
        let file = SlotFile::new(path, record);
        let mut filled = vec![Slot::Main];
        if let Some(record) = file.record.as_deref() {
            if record.has_frequencies() {
                filled.push(Slot::Frequency);
            }
            if record.has_solvent() {
                filled.push(Slot::Solvation);
            }
        }

        let slots = self.ensure_state(state);
        for slot in &filled {
            *slots.get_mut(*slot) = Some(file.clone());
        }
        filled
    }

    /// Empties one slot. Returns the file it held.
    pub fn clear(&mut self, state: StateId, slot: Slot) -> Option<SlotFile> {
        self.states.get_mut(&state)?.get_mut(slot).take()
    }

    /// For each state, whether the slot holds a usable record.
    pub fn coverage(&self, slot: Slot) -> Vec<(StateId, bool)> {
        self.states
            .iter()
            .map(|(id, slots)| (*id, slots.record(slot).is_some()))
            .collect()
    }
}
