mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_analysis_config, build_animation_config, build_setup_config};
pub use models::AnalysisSettings;
