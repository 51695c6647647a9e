use reactpp::core::units::EnergyUnit;
use reactpp::engine::config::ReactionConfig;
use reactpp::engine::energetics::DeltaTerm;
use std::path::PathBuf;

/// Everything the `analyse` command needs after merging the reaction file with the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub reaction: ReactionConfig,
    pub unit: EnergyUnit,
    pub csv_path: Option<PathBuf>,
    /// `None` selects every term with enough data.
    pub terms: Option<Vec<DeltaTerm>>,
}
