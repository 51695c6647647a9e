use crate::cli::AnimateArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use reactpp::engine::progress::ProgressReporter;
use reactpp::workflows;
use tracing::info;

pub async fn run(args: AnimateArgs) -> Result<()> {
    let animation = config::build_animation_config(&args)?;
    info!(
        "Animating the {:.2} cm^-1 mode of {:?} in {} steps.",
        animation.frequency, animation.frequency_file, animation.steps
    );

    let progress_handler = CliProgressHandler::new();
    let result = tokio::task::spawn_blocking(move || {
        let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
        workflows::animate::run(&animation, &reporter)
    })
    .await
    .map_err(|e| CliError::Other(anyhow::anyhow!("Animation task failed: {}", e)))??;

    println!(
        "✓ {} frame(s) of the {:.4} cm^-1 mode written to: {}",
        result.frames.len(),
        result.frequency,
        args.output.display()
    );
    if let (Some(first), Some(last)) = (result.frames.first(), result.frames.last()) {
        println!("  {} ... {}", first.display(), last.display());
    }
    Ok(())
}
