use crate::error::{CliError, Result};
use reactpp::engine::config::StateFiles;
use reactpp::engine::registry::StateId;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One `[[states]]` table of a reaction file.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileStateConfig {
    pub id: u32,
    pub main: Option<PathBuf>,
    pub frequency: Option<PathBuf>,
    pub solvation: Option<PathBuf>,
    pub big_basis: Option<PathBuf>,
    #[serde(default)]
    pub auto: bool,
}

impl FileStateConfig {
    pub fn state_id(&self) -> Result<StateId> {
        StateId::new(self.id).map_err(|e| CliError::Config(e.to_string()))
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.main,
            &mut self.frequency,
            &mut self.solvation,
            &mut self.big_basis,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

impl From<FileStateConfig> for StateFiles {
    fn from(s: FileStateConfig) -> Self {
        Self {
            main: s.main,
            frequency: s.frequency,
            solvation: s.solvation,
            big_basis: s.big_basis,
            auto: s.auto,
        }
    }
}

/// The reaction file: which files make up each state, and how results are presented.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub unit: Option<String>,
    pub output_csv: Option<PathBuf>,
    pub terms: Option<Vec<String>>,
    #[serde(default)]
    pub states: Vec<FileStateConfig>,
}

impl FileConfig {
    /// Loads a reaction file. Relative paths inside it are taken relative to the
    /// directory containing the file, not to the working directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading reaction file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: FileConfig = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for state in &mut config.states {
            state.resolve_paths(base);
        }
        if let Some(csv) = config.output_csv.as_mut() {
            if csv.is_relative() {
                *csv = base.join(&*csv);
            }
        }
        Ok(config)
    }
}
