//! Presentation of analysis results as text tables, diagram series and CSV.
//!
//! Everything here converts from Hartree to the requested unit at the last moment
//! and never feeds converted values back into computations.

use crate::core::models::record::OutputRecord;
use crate::core::units::{EnergyUnit, round_to_hundredths};
use crate::engine::energetics::{DeltaTerm, RelativeEnergies};
use crate::engine::registry::{Slot, StateId, StateRegistry, StateSlots};
use serde::Serialize;
use std::io::Write;

const DELTA: char = '\u{394}';
const SMALL_DELTA: char = '\u{3b4}';

pub const NO_REFERENCE_TEXT: &str = "Relative energies to state 1...\nAdd files to calculate.";

/// The relative-energy table, one row per state.
///
/// Columns follow what the reference state provides: the big-basis delta replaces the
/// main delta when state 1 has one, the solvation column appears when state 1 has a
/// solvation delta, and the free-energy columns when state 1 has a composite `dG`.
/// Values missing for other states print as `0.00`.
pub fn relative_table(relative: &RelativeEnergies, unit: EnergyUnit) -> String {
    let deltas = match relative {
        RelativeEnergies::NoReference => return NO_REFERENCE_TEXT.to_string(),
        RelativeEnergies::Computed(deltas) => deltas,
    };
    let reference = deltas.get(&StateId::REFERENCE);
    let show_big = reference.is_some_and(|r| r.big.is_some());
    let show_solvation = reference.is_some_and(|r| r.solvation.is_some());
    let show_free_energy = reference.is_some_and(|r| r.get(DeltaTerm::DG).is_some());

    let mut header = String::from("State");
    if show_big {
        header.push_str(&format!("  {DELTA}E(big)"));
    } else {
        header.push_str(&format!(" {DELTA}E(main)"));
    }
    if show_solvation {
        header.push_str(&format!(" {DELTA}{SMALL_DELTA}E(solv)"));
    }
    if show_free_energy {
        header.push_str(&format!(
            "{:>8} {:>8}",
            format!("{DELTA}{SMALL_DELTA}G"),
            format!("{DELTA}G")
        ));
    }

    let mut lines = vec![header];
    for (state, d) in deltas {
        let value = |term: DeltaTerm| {
            d.get(term)
                .map_or(0.0, |v| round_to_hundredths(unit.convert(v)))
        };
        let mut row = format!("{:5}", state.get());
        row.push_str(&format!(
            "{:9.2}",
            value(if show_big { DeltaTerm::Big } else { DeltaTerm::Main })
        ));
        if show_solvation {
            row.push_str(&format!("{:10.2}", value(DeltaTerm::DdSolv)));
        }
        if show_free_energy {
            let (dd_g, d_g) = if d.get(DeltaTerm::DG).is_some() {
                (value(DeltaTerm::DdG), value(DeltaTerm::DG))
            } else {
                (0.0, 0.0)
            };
            row.push_str(&format!("{:8.2} {:8.2}", dd_g, d_g));
        }
        lines.push(row);
    }
    lines.join("\n")
}

/// Absolute values of one state: electronic energy, thermal corrections, solvated
/// energy with its solvation energy, and big-basis energy.
pub fn absolute_values(slots: &StateSlots, unit: EnergyUnit) -> String {
    let row = |label: &str, hartree: f64| format!("{:>8} {:16.6}", label, unit.convert(hartree));
    let mut lines = Vec::new();

    let main = slots.energy(Slot::Main);
    if let Some(e) = main {
        lines.push(row("E(elec)", e));
    }
    if let Some(record) = slots.record(Slot::Frequency) {
        let corrections = [
            ('E', record.thermal_de()),
            ('G', record.thermal_dg()),
            ('H', record.thermal_dh()),
        ];
        for (symbol, value) in corrections {
            if let Some(v) = value {
                lines.push(row(&format!("{SMALL_DELTA}{symbol} "), v));
            }
        }
    }
    if let Some(solvated) = slots.energy(Slot::Solvation) {
        lines.push(row("E(solv)", solvated));
        if let Some(e) = main {
            lines.push(row(&format!("{DELTA}E(solv)"), solvated - e));
        }
    }
    if let Some(big) = slots.energy(Slot::BigBasis) {
        lines.push(row("E(big)", big));
    }
    lines.join("\n")
}

/// The vibrations of a record, lowest frequency first. Imaginary modes keep their sign.
pub fn frequency_listing(record: &OutputRecord) -> String {
    let mut lines = vec![" Frequency IR Intensity".to_string()];
    lines.extend(
        record
            .vibrations
            .iter()
            .map(|v| format!("{:10.4} {:10.4}", v.frequency, v.ir_intensity)),
    );
    lines.join("\n")
}

/// One line of an energy diagram: a relative term across all states.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramSeries {
    pub term: DeltaTerm,
    pub unit: EnergyUnit,
    pub points: Vec<(StateId, f64)>,
}

impl DiagramSeries {
    pub fn legend(&self) -> String {
        match self.term {
            DeltaTerm::Main => "main".to_string(),
            DeltaTerm::Big => "big".to_string(),
            DeltaTerm::DSolv => "solv".to_string(),
            DeltaTerm::DG => format!("{DELTA}G"),
            DeltaTerm::DH => format!("{DELTA}H"),
            DeltaTerm::DE => format!("{DELTA}E"),
            other => other.key().to_string(),
        }
    }
}

/// Builds one series per requested term. States lacking the term plot at 0.0.
pub fn diagram_series(
    relative: &RelativeEnergies,
    terms: &[DeltaTerm],
    unit: EnergyUnit,
) -> Vec<DiagramSeries> {
    let RelativeEnergies::Computed(deltas) = relative else {
        return Vec::new();
    };
    terms
        .iter()
        .map(|&term| DiagramSeries {
            term,
            unit,
            points: deltas
                .iter()
                .map(|(state, d)| (*state, d.get(term).map_or(0.0, |v| unit.convert(v))))
                .collect(),
        })
        .collect()
}

/// Terms worth plotting: a slot's terms are offered when state 1 and at least one
/// other state have data for it.
pub fn available_terms(registry: &StateRegistry) -> Vec<DeltaTerm> {
    let has_data = |slots: &StateSlots, slot: Slot| match slot {
        Slot::Frequency => slots
            .record(slot)
            .is_some_and(|r| r.has_frequencies()),
        _ => slots.energy(slot).is_some(),
    };

    let mut terms = Vec::new();
    for slot in Slot::ALL {
        let reference = registry
            .slots(StateId::REFERENCE)
            .is_some_and(|s| has_data(s, slot));
        let covered = registry.states().filter(|(_, s)| has_data(s, slot)).count();
        if !reference || covered < 2 {
            continue;
        }
        match slot {
            Slot::Main => terms.push(DeltaTerm::Main),
            Slot::Frequency => terms.extend([DeltaTerm::DG, DeltaTerm::DE, DeltaTerm::DH]),
            Slot::Solvation => terms.push(DeltaTerm::DSolv),
            Slot::BigBasis => terms.push(DeltaTerm::Big),
        }
    }
    terms
}

#[derive(Serialize)]
struct SeriesRow<'a> {
    state: u32,
    term: &'a str,
    value: f64,
    unit: &'a str,
}

/// Writes the series in long format: one `state,term,value,unit` row per point.
pub fn write_series_csv(series: &[DiagramSeries], writer: impl Write) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for s in series {
        for (state, value) in &s.points {
            csv_writer.serialize(SeriesRow {
                state: state.get(),
                term: s.term.key(),
                value: *value,
                unit: s.unit.label(),
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}
