use crate::cli::SetupArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use reactpp::engine::progress::ProgressReporter;
use reactpp::workflows;
use tracing::info;

pub async fn run(args: SetupArgs) -> Result<()> {
    let setup = config::build_setup_config(&args)?;
    info!(
        "Writing ORCA input(s) for {:?}: {}",
        setup.source,
        setup.input.simple_input()
    );

    let progress_handler = CliProgressHandler::new();
    let result = tokio::task::spawn_blocking(move || {
        let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
        workflows::setup::run(&setup, &reporter)
    })
    .await
    .map_err(|e| CliError::Other(anyhow::anyhow!("Setup task failed: {}", e)))??;

    println!(
        "✓ {} input file(s) written (charge {}, multiplicity {}):",
        result.files.len(),
        result.charge,
        result.multiplicity
    );
    for file in &result.files {
        println!("  {}", file.display());
    }
    Ok(())
}
