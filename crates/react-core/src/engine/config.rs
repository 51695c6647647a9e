use super::registry::{Slot, StateId};
use super::scan::BondScan;
use crate::core::io::orca_input::{Constraint, OrcaInput, Solvation};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_ANIMATION_STEPS: usize = 10;
pub const DEFAULT_ANIMATION_SCALE: f64 = 1.0;
pub const DEFAULT_FUNCTIONAL: &str = "B3LYP";
pub const DEFAULT_BASIS: &str = "6-31G";
pub const DEFAULT_JOB_TYPE: &str = "Opt";
pub const DEFAULT_SOLVATION_MODEL: &str = "CPCM";
pub const DEFAULT_SCAN_INCREMENT: f64 = 0.1;
pub const DEFAULT_SCAN_STEPS: usize = 5;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("State {0} requests automatic slot assignment but has no main file")]
    AutoWithoutMain(StateId),
    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// The files named for one state, one optional path per slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateFiles {
    pub main: Option<PathBuf>,
    pub frequency: Option<PathBuf>,
    pub solvation: Option<PathBuf>,
    pub big_basis: Option<PathBuf>,
    /// Also use the main file for every other slot its contents can serve.
    pub auto: bool,
}

impl StateFiles {
    pub fn get(&self, slot: Slot) -> Option<&Path> {
        match slot {
            Slot::Main => self.main.as_deref(),
            Slot::Frequency => self.frequency.as_deref(),
            Slot::Solvation => self.solvation.as_deref(),
            Slot::BigBasis => self.big_basis.as_deref(),
        }
    }

    pub fn set(&mut self, slot: Slot, path: PathBuf) {
        let target = match slot {
            Slot::Main => &mut self.main,
            Slot::Frequency => &mut self.frequency,
            Slot::Solvation => &mut self.solvation,
            Slot::BigBasis => &mut self.big_basis,
        };
        *target = Some(path);
    }

    /// The named files in compose order.
    pub fn files(&self) -> impl Iterator<Item = (Slot, &Path)> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|p| (slot, p)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionConfig {
    pub states: BTreeMap<StateId, StateFiles>,
}

impl ReactionConfig {
    /// Every distinct file across all states and slots, sorted.
    pub fn distinct_paths(&self) -> Vec<PathBuf> {
        self.states
            .values()
            .flat_map(|files| files.files().map(|(_, p)| p.to_path_buf()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[derive(Default)]
pub struct ReactionConfigBuilder {
    states: BTreeMap<StateId, StateFiles>,
}

impl ReactionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, id: StateId, files: StateFiles) -> Self {
        self.states.insert(id, files);
        self
    }
    pub fn file(mut self, id: StateId, slot: Slot, path: PathBuf) -> Self {
        self.states.entry(id).or_default().set(slot, path);
        self
    }
    pub fn auto(mut self, id: StateId, auto: bool) -> Self {
        self.states.entry(id).or_default().auto = auto;
        self
    }

    pub fn build(self) -> Result<ReactionConfig, ConfigError> {
        if self.states.is_empty() {
            return Err(ConfigError::MissingParameter("states"));
        }
        if let Some((id, _)) = self
            .states
            .iter()
            .find(|(_, files)| files.auto && files.main.is_none())
        {
            return Err(ConfigError::AutoWithoutMain(*id));
        }
        Ok(ReactionConfig {
            states: self.states,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub frequency_file: PathBuf,
    /// Frequency of the mode to animate, in cm^-1. Negative for imaginary modes.
    pub frequency: f64,
    pub steps: usize,
    pub scale: f64,
    pub output_dir: PathBuf,
}

#[derive(Default)]
pub struct AnimationConfigBuilder {
    frequency_file: Option<PathBuf>,
    frequency: Option<f64>,
    steps: Option<usize>,
    scale: Option<f64>,
    output_dir: Option<PathBuf>,
}

impl AnimationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequency_file(mut self, path: PathBuf) -> Self {
        self.frequency_file = Some(path);
        self
    }
    pub fn frequency(mut self, frequency: f64) -> Self {
        self.frequency = Some(frequency);
        self
    }
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn build(self) -> Result<AnimationConfig, ConfigError> {
        Ok(AnimationConfig {
            frequency_file: self
                .frequency_file
                .ok_or(ConfigError::MissingParameter("frequency_file"))?,
            frequency: self
                .frequency
                .ok_or(ConfigError::MissingParameter("frequency"))?,
            steps: self.steps.unwrap_or(DEFAULT_ANIMATION_STEPS),
            scale: self.scale.unwrap_or(DEFAULT_ANIMATION_SCALE),
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
        })
    }
}

/// One ORCA input (or one per point of a bond scan) built from the final
/// geometry of an existing output file.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupConfig {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    /// Base name of the written files. Defaults to the stem of `source`.
    pub name: Option<String>,
    /// Charge and multiplicity in here are replaced when the input is written.
    pub input: OrcaInput,
    /// Overrides the charge found in `source`.
    pub charge: Option<i32>,
    /// Overrides the multiplicity found in `source`.
    pub multiplicity: Option<u32>,
    pub scan: Option<BondScan>,
}

#[derive(Default)]
pub struct SetupConfigBuilder {
    source: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    name: Option<String>,
    functional: Option<String>,
    basis: Option<String>,
    job_type: Option<String>,
    frequencies: bool,
    keywords: Vec<String>,
    solvation: Option<Solvation>,
    blocks: Vec<(String, String)>,
    charge: Option<i32>,
    multiplicity: Option<u32>,
    constraints: Vec<Constraint>,
    scan: Option<BondScan>,
}

impl SetupConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, path: PathBuf) -> Self {
        self.source = Some(path);
        self
    }
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
    pub fn functional(mut self, functional: &str) -> Self {
        self.functional = Some(functional.to_string());
        self
    }
    pub fn basis(mut self, basis: &str) -> Self {
        self.basis = Some(basis.to_string());
        self
    }
    pub fn job_type(mut self, job_type: &str) -> Self {
        self.job_type = Some(job_type.to_string());
        self
    }
    pub fn frequencies(mut self, frequencies: bool) -> Self {
        self.frequencies = frequencies;
        self
    }
    pub fn keyword(mut self, keyword: &str) -> Self {
        self.keywords.push(keyword.to_string());
        self
    }
    pub fn solvation(mut self, solvation: Solvation) -> Self {
        self.solvation = Some(solvation);
        self
    }
    pub fn block(mut self, name: &str, content: &str) -> Self {
        self.blocks.push((name.to_string(), content.to_string()));
        self
    }
    pub fn charge(mut self, charge: i32) -> Self {
        self.charge = Some(charge);
        self
    }
    pub fn multiplicity(mut self, multiplicity: u32) -> Self {
        self.multiplicity = Some(multiplicity);
        self
    }
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
    pub fn scan(mut self, scan: BondScan) -> Self {
        self.scan = Some(scan);
        self
    }

    pub fn build(self) -> Result<SetupConfig, ConfigError> {
        if self.multiplicity == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "multiplicity",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(name) = self.name.as_deref() {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(ConfigError::InvalidParameter {
                    name: "name",
                    reason: format!("'{name}' is not a plain file name"),
                });
            }
        }
        let functional = self
            .functional
            .ok_or(ConfigError::MissingParameter("functional"))?;
        let basis = self.basis.ok_or(ConfigError::MissingParameter("basis"))?;
        let job_type = self.job_type.as_deref().unwrap_or(DEFAULT_JOB_TYPE);

        let mut input = OrcaInput::new(&functional, &basis, job_type);
        input.frequencies = self.frequencies;
        input.keywords = self.keywords;
        input.solvation = self.solvation;
        input.blocks = self.blocks;
        input.constraints = self.constraints;

        Ok(SetupConfig {
            source: self.source.ok_or(ConfigError::MissingParameter("source"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            name: self.name,
            input,
            charge: self.charge,
            multiplicity: self.multiplicity,
            scan: self.scan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> StateId {
        StateId::new(n).unwrap()
    }

    #[test]
    fn reaction_builder_requires_a_state() {
        assert_eq!(
            ReactionConfigBuilder::new().build(),
            Err(ConfigError::MissingParameter("states"))
        );
    }

    #[test]
    fn reaction_builder_collects_files_per_state() {
        let config = ReactionConfigBuilder::new()
            .file(id(1), Slot::Main, "r.log".into())
            .file(id(1), Slot::Frequency, "r_freq.log".into())
            .file(id(2), Slot::Main, "ts.log".into())
            .auto(id(2), true)
            .build()
            .unwrap();
        assert_eq!(config.states.len(), 2);
        let first = &config.states[&id(1)];
        assert_eq!(first.get(Slot::Frequency), Some(Path::new("r_freq.log")));
        assert!(!first.auto);
        assert!(config.states[&id(2)].auto);
        let slots: Vec<Slot> = first.files().map(|(s, _)| s).collect();
        assert_eq!(slots, vec![Slot::Main, Slot::Frequency]);
    }

    #[test]
    fn auto_needs_a_main_file() {
        let result = ReactionConfigBuilder::new()
            .file(id(3), Slot::Solvation, "s.log".into())
            .auto(id(3), true)
            .build();
        assert_eq!(result, Err(ConfigError::AutoWithoutMain(id(3))));
    }

    #[test]
    fn distinct_paths_deduplicates_shared_files() {
        let config = ReactionConfigBuilder::new()
            .file(id(1), Slot::Main, "a.log".into())
            .file(id(1), Slot::Frequency, "a.log".into())
            .file(id(2), Slot::Main, "b.log".into())
            .build()
            .unwrap();
        assert_eq!(
            config.distinct_paths(),
            vec![PathBuf::from("a.log"), PathBuf::from("b.log")]
        );
    }

    #[test]
    fn animation_builder_applies_defaults() {
        let config = AnimationConfigBuilder::new()
            .frequency_file("ts.log".into())
            .frequency(-412.7)
            .output_dir("out".into())
            .build()
            .unwrap();
        assert_eq!(config.steps, 10);
        assert_eq!(config.scale, 1.0);

        let missing = AnimationConfigBuilder::new().frequency(1.0).build();
        assert_eq!(missing, Err(ConfigError::MissingParameter("frequency_file")));
    }

    #[test]
    fn setup_builder_fills_the_input() {
        let config = SetupConfigBuilder::new()
            .source("ts.log".into())
            .output_dir("inputs".into())
            .functional("PBE0")
            .basis("def2-SVP")
            .frequencies(true)
            .keyword("D3BJ")
            .block("pal", "nprocs 4")
            .constraint("bond:1,2".parse().unwrap())
            .multiplicity(2)
            .build()
            .unwrap();
        assert_eq!(config.input.job_type, DEFAULT_JOB_TYPE);
        assert_eq!(config.input.simple_input(), "! PBE0 def2-SVP Opt Freq D3BJ");
        assert_eq!(config.input.blocks.len(), 1);
        assert_eq!(config.input.constraints.len(), 1);
        assert_eq!(config.multiplicity, Some(2));
        assert_eq!(config.charge, None);
    }

    #[test]
    fn setup_builder_validates_parameters() {
        let base = || {
            SetupConfigBuilder::new()
                .source("ts.log".into())
                .output_dir("inputs".into())
                .functional(DEFAULT_FUNCTIONAL)
        };
        assert_eq!(
            base().build(),
            Err(ConfigError::MissingParameter("basis"))
        );
        assert!(matches!(
            base().basis(DEFAULT_BASIS).multiplicity(0).build(),
            Err(ConfigError::InvalidParameter { name: "multiplicity", .. })
        ));
        assert!(matches!(
            base().basis(DEFAULT_BASIS).name("../escape").build(),
            Err(ConfigError::InvalidParameter { name: "name", .. })
        ));
    }
}
