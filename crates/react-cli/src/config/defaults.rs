use reactpp::core::units::EnergyUnit;
use reactpp::engine::config::{
    DEFAULT_ANIMATION_SCALE, DEFAULT_ANIMATION_STEPS, DEFAULT_BASIS, DEFAULT_FUNCTIONAL,
    DEFAULT_JOB_TYPE, DEFAULT_SCAN_INCREMENT, DEFAULT_SCAN_STEPS, DEFAULT_SOLVATION_MODEL,
};

pub struct DefaultsConfig {
    pub unit: EnergyUnit,
    pub animation_steps: usize,
    pub animation_scale: f64,
    pub functional: &'static str,
    pub basis: &'static str,
    pub job_type: &'static str,
    pub solvation_model: &'static str,
    pub scan_increment: f64,
    pub scan_steps: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            unit: EnergyUnit::Hartree,
            animation_steps: DEFAULT_ANIMATION_STEPS,
            animation_scale: DEFAULT_ANIMATION_SCALE,
            functional: DEFAULT_FUNCTIONAL,
            basis: DEFAULT_BASIS,
            job_type: DEFAULT_JOB_TYPE,
            solvation_model: DEFAULT_SOLVATION_MODEL,
            scan_increment: DEFAULT_SCAN_INCREMENT,
            scan_steps: DEFAULT_SCAN_STEPS,
        }
    }
}
