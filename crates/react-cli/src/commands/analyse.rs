use crate::cli::AnalyseArgs;
use crate::config::{self, AnalysisSettings};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use reactpp::engine::error::EngineError;
use reactpp::engine::progress::ProgressReporter;
use reactpp::workflows::{self, analyse::AnalysisReport, report};
use std::fs::File;
use std::io::BufWriter;
use tracing::{info, warn};

pub async fn run(args: AnalyseArgs) -> Result<()> {
    info!("Merging reaction file and CLI arguments...");
    let settings = config::build_analysis_config(&args)?;
    info!(
        "Analysing {} state(s) in {}.",
        settings.reaction.states.len(),
        settings.unit
    );

    let progress_handler = CliProgressHandler::new();
    let reaction = settings.reaction.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
        workflows::analyse::run(&reaction, &reporter)
    })
    .await
    .map_err(|e| CliError::Other(anyhow::anyhow!("Analysis task failed: {}", e)))??;

    println!("{}", render(&analysis, &settings));

    if let Some(csv_path) = &settings.csv_path {
        let terms = settings
            .terms
            .clone()
            .unwrap_or_else(|| report::available_terms(&analysis.registry));
        if terms.is_empty() {
            warn!("No term has data for state 1 and another state; the CSV will be empty.");
        }
        let series = report::diagram_series(&analysis.relative, &terms, settings.unit);
        let file = File::create(csv_path)?;
        report::write_series_csv(&series, BufWriter::new(file)).map_err(EngineError::from)?;
        println!("✓ Diagram series written to: {}", csv_path.display());
    }
    Ok(())
}

/// Absolute values per state followed by the relative-energy table.
fn render(analysis: &AnalysisReport, settings: &AnalysisSettings) -> String {
    let mut sections = Vec::new();
    for (state, slots) in analysis.registry.states() {
        let values = report::absolute_values(slots, settings.unit);
        if values.is_empty() {
            sections.push(format!("State {}: no data", state));
        } else {
            sections.push(format!("State {} ({}):\n{}", state, settings.unit, values));
        }
    }
    sections.push(format!(
        "Relative energies ({}):\n{}",
        settings.unit,
        report::relative_table(&analysis.relative, settings.unit)
    ));
    if !analysis.rejections.is_empty() {
        let skipped: Vec<String> = analysis
            .rejections
            .iter()
            .map(|r| format!("  state {} {}: {}", r.state, r.slot, r.reason))
            .collect();
        sections.push(format!("Skipped files:\n{}", skipped.join("\n")));
    }
    sections.join("\n\n")
}
