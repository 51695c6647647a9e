use crate::core::io::read_output;
use crate::core::models::record::OutputRecord;
use crate::engine::config::ReactionConfig;
use crate::engine::energetics::{RelativeEnergies, relative_energies};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::registry::{RegistryError, Slot, StateId, StateRegistry};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

type RecordMap = HashMap<PathBuf, Option<Arc<OutputRecord>>>;

/// A file that could not be placed in the slot it was named for.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub state: StateId,
    pub slot: Slot,
    pub reason: RegistryError,
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub registry: StateRegistry,
    pub relative: RelativeEnergies,
    pub rejections: Vec<Rejection>,
}

/// Reads every file named by `config`, fills the state registry and computes the
/// relative energetics.
///
/// Unreadable files and files that cannot serve their slot are logged and left out;
/// they never abort the analysis of the other states.
#[instrument(skip_all, name = "analyse_workflow")]
pub fn run(
    config: &ReactionConfig,
    reporter: &ProgressReporter,
) -> Result<AnalysisReport, EngineError> {
    let records = reporter.phase("Reading Output Files", || read_all(config, reporter));

    reporter.report(Progress::PhaseStart {
        name: "Assigning Slots",
    });
    let (registry, rejections) = build_registry(config, &records);
    for rejection in &rejections {
        reporter.message(format!(
            "State {} {}: {}",
            rejection.state, rejection.slot, rejection.reason
        ));
    }
    reporter.report(Progress::PhaseFinish);

    let relative = relative_energies(&registry);
    if relative == RelativeEnergies::NoReference {
        warn!("State 1 has no main energy; relative energies cannot be computed.");
    }

    info!(
        states = registry.len(),
        rejected = rejections.len(),
        "Analysis complete."
    );
    Ok(AnalysisReport {
        registry,
        relative,
        rejections,
    })
}

/// Parses each distinct file once. Files shared between slots share one record.
fn read_all(config: &ReactionConfig, reporter: &ProgressReporter) -> RecordMap {
    let paths = config.distinct_paths();
    info!(files = paths.len(), states = config.states.len(), "Reading output files.");
    reporter.report(Progress::TaskStart {
        total_steps: paths.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = paths.iter();

    #[cfg(feature = "parallel")]
    let iterator = paths.par_iter();

    let records: RecordMap = iterator
        .map(|path| {
            let record = read_one(path);
            reporter.report(Progress::TaskIncrement);
            (path.clone(), record)
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    records
}

fn read_one(path: &Path) -> Option<Arc<OutputRecord>> {
    match read_output(path) {
        Ok(record) => Some(Arc::new(record)),
        Err(e) => {
            warn!("Could not extract data from {:?}: {}", path, e);
            None
        }
    }
}

fn build_registry(config: &ReactionConfig, records: &RecordMap) -> (StateRegistry, Vec<Rejection>) {
    let lookup = |path: &Path| records.get(path).cloned().flatten();
    let mut registry = StateRegistry::new();
    let mut rejections = Vec::new();

    for (&state, files) in &config.states {
        registry.ensure_state(state);

        if files.auto {
            if let Some(main) = files.main.as_deref() {
                let filled = registry.assign_auto(state, main, lookup(main));
                info!(%state, ?filled, "Auto-assigned {:?}.", main);
            }
        }

        // Explicit slots are applied after auto assignment so they take precedence.
        for (slot, path) in files.files() {
            if files.auto && slot == Slot::Main {
                continue;
            }
            if let Err(reason) = registry.assign(state, slot, path, lookup(path)) {
                warn!(%state, %slot, "{}", reason);
                rejections.push(Rejection {
                    state,
                    slot,
                    reason,
                });
            }
        }
    }
    (registry, rejections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::{gaussian, orca};
    use crate::engine::config::ReactionConfigBuilder;
    use crate::engine::energetics::DeltaTerm;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn id(n: u32) -> StateId {
        StateId::new(n).unwrap()
    }

    /// Writes a copy of a fixture with its final energies replaced.
    fn fixture(dir: &TempDir, name: &str, text: &str, from: &str, to: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text.replace(from, to)).unwrap();
        path
    }

    fn gaussian_with_energy(dir: &TempDir, name: &str, energy: &str) -> PathBuf {
        fixture(
            dir,
            name,
            gaussian::tests::WATER_OPT_FREQ,
            "-76.4091234567",
            energy,
        )
    }

    #[test]
    fn computes_relative_energies_from_files() {
        let dir = TempDir::new().unwrap();
        let reactant = gaussian_with_energy(&dir, "r.log", "-100.0");
        let product = gaussian_with_energy(&dir, "p.log", "-99.5");
        let config = ReactionConfigBuilder::new()
            .file(id(1), Slot::Main, reactant)
            .file(id(2), Slot::Main, product)
            .build()
            .unwrap();

        let report = run(&config, &ProgressReporter::new()).unwrap();
        let state2 = report.relative.get(id(2)).unwrap();
        assert!((state2.main.unwrap() - 0.5).abs() < 1e-9);
        assert!(report.rejections.is_empty());
    }

    #[test]
    fn auto_assignment_enables_thermal_and_solvation_terms() {
        let dir = TempDir::new().unwrap();
        let reactant = gaussian_with_energy(&dir, "r.log", "-100.0");
        let product = fixture(
            &dir,
            "p.out",
            orca::tests::WATER_OPT_FREQ,
            "-76.409123456700",
            "-99.5",
        );
        let config = ReactionConfigBuilder::new()
            .file(id(1), Slot::Main, reactant)
            .auto(id(1), true)
            .file(id(2), Slot::Main, product)
            .auto(id(2), true)
            .build()
            .unwrap();

        let report = run(&config, &ProgressReporter::new()).unwrap();
        assert!(report.registry.record(id(2), Slot::Frequency).is_some());
        assert!(report.registry.record(id(1), Slot::Solvation).is_some());
        let state2 = report.relative.get(id(2)).unwrap();
        assert!(state2.get(DeltaTerm::DG).is_some());
        assert!(state2.solvation.is_some());
    }

    #[test]
    fn unreadable_file_degrades_to_missing_data() {
        let dir = TempDir::new().unwrap();
        let reactant = gaussian_with_energy(&dir, "r.log", "-100.0");
        let garbage = dir.path().join("garbage.log");
        fs::write(&garbage, "not an output file\n").unwrap();
        let config = ReactionConfigBuilder::new()
            .file(id(1), Slot::Main, reactant)
            .file(id(2), Slot::Main, garbage.clone())
            .build()
            .unwrap();

        let report = run(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(report.registry.path(id(2), Slot::Main), Some(garbage.as_path()));
        assert!(report.registry.record(id(2), Slot::Main).is_none());
        assert_eq!(report.relative.get(id(2)).unwrap().main, None);
    }

    #[test]
    fn rejected_slot_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let reactant = gaussian_with_energy(&dir, "r.log", "-100.0");
        let single_point = dir.path().join("sp.log");
        let text: String = gaussian::tests::WATER_OPT_FREQ
            .split(" Harmonic frequencies")
            .next()
            .unwrap()
            .to_string();
        fs::write(&single_point, text).unwrap();

        let config = ReactionConfigBuilder::new()
            .file(id(1), Slot::Main, reactant)
            .file(id(1), Slot::Frequency, single_point)
            .build()
            .unwrap();

        let report = run(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(report.rejections.len(), 1);
        assert_eq!(report.rejections[0].slot, Slot::Frequency);
        assert!(matches!(
            report.rejections[0].reason,
            RegistryError::NoFrequencies { .. }
        ));
        assert!(report.registry.path(id(1), Slot::Frequency).is_none());
    }

    #[test]
    fn reports_progress_for_each_distinct_file() {
        let dir = TempDir::new().unwrap();
        let shared = gaussian_with_energy(&dir, "r.log", "-100.0");
        let config = ReactionConfigBuilder::new()
            .file(id(1), Slot::Main, shared.clone())
            .file(id(1), Slot::Frequency, shared)
            .build()
            .unwrap();

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| {
            events.lock().unwrap().push(e);
        }));
        run(&config, &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert!(events.contains(&Progress::TaskStart { total_steps: 1 }));
        let increments = events
            .iter()
            .filter(|e| **e == Progress::TaskIncrement)
            .count();
        assert_eq!(increments, 1);
    }

    #[test]
    fn missing_reference_yields_no_reference() {
        let dir = TempDir::new().unwrap();
        let product = gaussian_with_energy(&dir, "p.log", "-99.5");
        let config = ReactionConfigBuilder::new()
            .file(id(2), Slot::Main, product)
            .build()
            .unwrap();
        let report = run(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(report.relative, RelativeEnergies::NoReference);
    }
}
