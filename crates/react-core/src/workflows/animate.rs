use crate::core::io::read_output;
use crate::core::io::xyz::XyzFile;
use crate::engine::config::AnimationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::vibration::{DisplacementAnimation, select_mode};
use std::fs;
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct AnimationResult {
    pub frequency: f64,
    /// Written frames in order, `<stem>_tmp000.xyz`, `<stem>_tmp001.xyz`, ...
    pub frames: Vec<PathBuf>,
}

/// Displaces the final geometry of the frequency file along the selected mode and
/// writes one XYZ file per frame into the output directory.
#[instrument(skip_all, name = "animate_workflow")]
pub fn run(
    config: &AnimationConfig,
    reporter: &ProgressReporter,
) -> Result<AnimationResult, EngineError> {
    let path = &config.frequency_file;
    let record = read_output(path).map_err(|source| EngineError::Output {
        path: path.clone(),
        source,
    })?;
    let equilibrium = record
        .final_geometry()
        .ok_or_else(|| EngineError::MissingGeometry { path: path.clone() })?
        .clone();
    let mode = select_mode(&record, config.frequency)?.clone();
    let animation = DisplacementAnimation::new(equilibrium, mode, config.steps, config.scale)?;
    info!(
        frequency = animation.frequency(),
        steps = animation.len(),
        scale = config.scale,
        "Animating normal mode."
    );

    fs::create_dir_all(&config.output_dir).map_err(|source| EngineError::Write {
        path: config.output_dir.clone(),
        source,
    })?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mode".to_string());

    reporter.report(Progress::PhaseStart {
        name: "Writing Frames",
    });
    reporter.report(Progress::TaskStart {
        total_steps: animation.len() as u64,
    });
    let mut frames = Vec::with_capacity(animation.len());
    for (k, frame) in animation.frames().enumerate() {
        let target = config.output_dir.join(format!("{stem}_tmp{k:03}.xyz"));
        let comment = format!(
            "{stem} {:.4} cm^-1 frame {k}/{}",
            animation.frequency(),
            animation.len()
        );
        XyzFile::write_to_path(&frame, &comment, &target).map_err(|source| EngineError::Write {
            path: target.clone(),
            source,
        })?;
        frames.push(target);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    info!(frames = frames.len(), "Animation frames written.");
    Ok(AnimationResult {
        frequency: animation.frequency(),
        frames,
    })
}
