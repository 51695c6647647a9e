use crate::core::io::orca_input::{Constraint, OrcaInput, OrcaInputFile};
use crate::core::io::read_output;
use crate::core::models::geometry::Geometry;
use crate::engine::config::SetupConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct SetupResult {
    /// Written input files in scan order.
    pub files: Vec<PathBuf>,
    pub charge: i32,
    pub multiplicity: u32,
}

/// Writes ORCA inputs for the final geometry of `config.source`: one file, or one
/// per point when a bond scan is configured. Existing files are never replaced;
/// a taken name gets a `_1`, `_2`, ... suffix instead.
#[instrument(skip_all, name = "setup_workflow", fields(source = %config.source.display()))]
pub fn run(config: &SetupConfig, reporter: &ProgressReporter) -> Result<SetupResult, EngineError> {
    let source = &config.source;
    let record = read_output(source).map_err(|e| EngineError::Output {
        path: source.clone(),
        source: e,
    })?;
    let geometry = record
        .final_geometry()
        .ok_or_else(|| EngineError::MissingGeometry {
            path: source.clone(),
        })?;

    if let Some(constraint) = config
        .input
        .constraints
        .iter()
        .find(|c| c.highest_atom() > geometry.len())
    {
        return Err(EngineError::ConstraintOutOfRange {
            atom: constraint.highest_atom(),
            atoms: geometry.len(),
        });
    }

    let charge = config.charge.or(record.charge).unwrap_or_else(|| {
        warn!("No charge given or found in the source file. Using 0.");
        0
    });
    let multiplicity = config.multiplicity.or(record.multiplicity).unwrap_or_else(|| {
        warn!("No multiplicity given or found in the source file. Using 1.");
        1
    });
    let mut input = config.input.clone();
    input.charge = charge;
    input.multiplicity = multiplicity;

    let name = config.name.clone().unwrap_or_else(|| {
        source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string())
    });
    let jobs = plan_jobs(&name, geometry, &input, config)?;

    fs::create_dir_all(&config.output_dir).map_err(|e| EngineError::Write {
        path: config.output_dir.clone(),
        source: e,
    })?;

    reporter.report(Progress::PhaseStart {
        name: "Writing Inputs",
    });
    reporter.report(Progress::TaskStart {
        total_steps: jobs.len() as u64,
    });
    let mut files = Vec::with_capacity(jobs.len());
    for (job_name, geometry, input) in &jobs {
        let (path, file) = create_unique(&config.output_dir, job_name)?;
        let mut writer = BufWriter::new(file);
        OrcaInputFile::write_to(input, geometry, &mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| EngineError::Write {
                path: path.clone(),
                source: e,
            })?;
        files.push(path);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    info!(files = files.len(), charge, multiplicity, "ORCA inputs written.");
    Ok(SetupResult {
        files,
        charge,
        multiplicity,
    })
}

/// Names, geometries and inputs to write. Scan points are numbered from 1 and
/// keep the scanned bond frozen.
fn plan_jobs(
    name: &str,
    geometry: &Geometry,
    input: &OrcaInput,
    config: &SetupConfig,
) -> Result<Vec<(String, Geometry, OrcaInput)>, EngineError> {
    let Some(scan) = &config.scan else {
        return Ok(vec![(name.to_string(), geometry.clone(), input.clone())]);
    };

    let points = scan.points(geometry)?;
    let bond = Constraint::bond(scan.first, scan.second)?;
    let mut scan_input = input.clone();
    if !scan_input.constraints.contains(&bond) {
        scan_input.constraints.push(bond);
    }
    info!(
        first = scan.first,
        second = scan.second,
        direction = %scan.direction,
        points = points.len(),
        "Planned bond scan."
    );
    Ok(points
        .into_iter()
        .enumerate()
        .map(|(k, point)| {
            (
                format!("{name}_scan{:02}", k + 1),
                point.geometry,
                scan_input.clone(),
            )
        })
        .collect())
}

fn create_unique(dir: &Path, name: &str) -> Result<(PathBuf, File), EngineError> {
    let mut attempt = 0usize;
    loop {
        let file_name = match attempt {
            0 => format!("{name}.inp"),
            n => format!("{name}_{n}.inp"),
        };
        let path = dir.join(file_name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(EngineError::Write { path, source: e }),
        }
    }
}
