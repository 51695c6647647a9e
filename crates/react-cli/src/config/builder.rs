use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AnalysisSettings;
use crate::cli::{AnalyseArgs, AnimateArgs, SetupArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use reactpp::core::io::orca_input::Solvation;
use reactpp::core::units::EnergyUnit;
use reactpp::engine::config::{
    AnimationConfig, AnimationConfigBuilder, ConfigError, ReactionConfigBuilder, SetupConfig,
    SetupConfigBuilder,
};
use reactpp::engine::scan::BondScan;
use std::collections::BTreeSet;
use tracing::debug;

/// Merges the reaction file (if any) with the command line. Command-line values win.
pub fn build_analysis_config(args: &AnalyseArgs) -> Result<AnalysisSettings> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let unit = match (args.unit, file_config.unit.as_deref()) {
        (Some(unit), _) => unit,
        (None, Some(name)) => name
            .parse::<EnergyUnit>()
            .map_err(|e| CliError::Config(e.to_string()))?,
        (None, None) => defaults.unit,
    };

    let terms = match (&args.terms, &file_config.terms) {
        (Some(terms), _) => Some(terms.clone()),
        (None, Some(names)) => {
            Some(parser::parse_terms(names).map_err(|e| CliError::Config(e.to_string()))?)
        }
        (None, None) => None,
    };

    let csv_path = args.csv.clone().or(file_config.output_csv);

    let mut builder = ReactionConfigBuilder::new();
    let mut seen = BTreeSet::new();
    for state in file_config.states {
        let id = state.state_id()?;
        if !seen.insert(id) {
            return Err(CliError::Config(format!(
                "State {} is listed more than once in the reaction file.",
                id
            )));
        }
        builder = builder.state(id, state.into());
    }
    for assignment in &args.files {
        debug!(
            "Command line assigns {:?} to state {} {}.",
            assignment.path, assignment.state, assignment.slot
        );
        builder = builder.file(assignment.state, assignment.slot, assignment.path.clone());
    }
    for &state in &args.auto {
        builder = builder.auto(state, true);
    }

    let reaction = builder.build().map_err(|e| match e {
        ConfigError::MissingParameter("states") => CliError::Config(
            "No states given. Provide a reaction file with -c or assign files with --file."
                .to_string(),
        ),
        other => CliError::Config(other.to_string()),
    })?;

    Ok(AnalysisSettings {
        reaction,
        unit,
        csv_path,
        terms,
    })
}

pub fn build_animation_config(args: &AnimateArgs) -> Result<AnimationConfig> {
    let defaults = DefaultsConfig::default();
    let steps = args.steps.unwrap_or(defaults.animation_steps);
    if steps == 0 {
        return Err(CliError::Argument("--steps must be at least 1".to_string()));
    }

    AnimationConfigBuilder::new()
        .frequency_file(args.path.clone())
        .frequency(args.frequency)
        .steps(steps)
        .scale(args.scale.unwrap_or(defaults.animation_scale))
        .output_dir(args.output.clone())
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

pub fn build_setup_config(args: &SetupArgs) -> Result<SetupConfig> {
    let defaults = DefaultsConfig::default();

    let mut builder = SetupConfigBuilder::new()
        .source(args.path.clone())
        .output_dir(args.output.clone())
        .functional(args.functional.as_deref().unwrap_or(defaults.functional))
        .basis(args.basis.as_deref().unwrap_or(defaults.basis))
        .job_type(args.job_type.as_deref().unwrap_or(defaults.job_type))
        .frequencies(args.freq);

    for keyword in &args.keywords {
        builder = builder.keyword(keyword);
    }
    let model = args
        .solvation_model
        .clone()
        .unwrap_or_else(|| defaults.solvation_model.to_string());
    match (&args.solvent, args.epsilon) {
        (Some(solvent), _) => {
            builder = builder.solvation(Solvation::Named {
                model,
                solvent: solvent.clone(),
            });
        }
        (None, Some(epsilon)) => {
            if !(epsilon.is_finite() && epsilon > 0.0) {
                return Err(CliError::Argument(format!(
                    "--epsilon must be a positive number, got {epsilon}"
                )));
            }
            builder = builder.solvation(Solvation::Epsilon { model, epsilon });
        }
        (None, None) => {
            if args.solvation_model.is_some() {
                return Err(CliError::Argument(
                    "--solvation-model needs --solvent or --epsilon".to_string(),
                ));
            }
        }
    }
    for (name, content) in &args.blocks {
        builder = builder.block(name, content);
    }
    for constraint in &args.freeze {
        builder = builder.constraint(constraint.clone());
    }
    if let Some(charge) = args.charge {
        builder = builder.charge(charge);
    }
    if let Some(multiplicity) = args.multiplicity {
        builder = builder.multiplicity(multiplicity);
    }
    if let Some(name) = &args.name {
        builder = builder.name(name);
    }
    if let Some((first, second)) = args.scan {
        builder = builder.scan(BondScan {
            first,
            second,
            increment: args.scan_step.unwrap_or(defaults.scan_increment),
            steps: args.scan_points.unwrap_or(defaults.scan_steps),
            direction: args.scan_direction.unwrap_or_default(),
            move_both: args.move_both,
        });
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}
