use crate::utils::parser::{self, SlotAssignment};
use clap::{Args, Parser, Subcommand};
use reactpp::core::io::orca_input::Constraint;
use reactpp::core::units::EnergyUnit;
use reactpp::engine::energetics::DeltaTerm;
use reactpp::engine::registry::StateId;
use reactpp::engine::scan::ScanDirection;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The REACT++ Developers",
    version,
    about = "REACT++ CLI - Analyse Gaussian and ORCA output files along a reaction coordinate: relative energetics, thermal and solvation corrections, normal-mode animation, and new ORCA inputs from finished calculations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to read output files in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show everything extracted from a single Gaussian or ORCA output file.
    Inspect(InspectArgs),
    /// Compute energies of every state relative to state 1.
    Analyse(AnalyseArgs),
    /// Write XYZ snapshots of a geometry displaced along one vibrational mode.
    Animate(AnimateArgs),
    /// Write ORCA input files from the final geometry of an output file.
    Setup(SetupArgs),
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the output file.
    #[arg(required = true, value_name = "PATH")]
    pub path: PathBuf,

    /// Unit for the final energy, in addition to Hartree (hartree, kcal/mol, kj/mol).
    #[arg(short, long, value_name = "UNIT")]
    pub unit: Option<EnergyUnit>,

    /// Write the final geometry of the file in XYZ format.
    #[arg(long, value_name = "PATH")]
    pub write_xyz: Option<PathBuf>,
}

/// Arguments for the `analyse` subcommand.
#[derive(Args, Debug)]
pub struct AnalyseArgs {
    /// Path to a reaction file in TOML format listing the states and their files.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Assign a file to a slot of a state, overriding the reaction file.
    /// Can be used multiple times. Example: --file 2:frequency=ts_freq.log
    #[arg(
        short,
        long = "file",
        value_name = "STATE:SLOT=PATH",
        value_parser = parser::parse_assignment
    )]
    pub files: Vec<SlotAssignment>,

    /// Fill the empty slots of a state from its main file where its contents allow.
    /// Can be used multiple times.
    #[arg(long, value_name = "STATE")]
    pub auto: Vec<StateId>,

    /// Energy unit for the printed values (hartree, kcal/mol, kj/mol).
    #[arg(short, long, value_name = "UNIT")]
    pub unit: Option<EnergyUnit>,

    /// Write the energy diagram series to a CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Terms to include in the diagram series, comma separated (e.g. 'main,dG').
    /// Defaults to every term with data for state 1 and at least one other state.
    #[arg(long, value_name = "TERMS", value_delimiter = ',')]
    pub terms: Option<Vec<DeltaTerm>>,
}

/// Arguments for the `animate` subcommand.
#[derive(Args, Debug)]
pub struct AnimateArgs {
    /// Path to the output file of a frequency calculation.
    #[arg(required = true, value_name = "PATH")]
    pub path: PathBuf,

    /// Frequency of the mode to animate in cm^-1. Imaginary modes are negative.
    #[arg(short, long, required = true, value_name = "FLOAT", allow_negative_numbers = true)]
    pub frequency: f64,

    /// Number of snapshots covering one period of the vibration.
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<usize>,

    /// Scale factor applied to the displacement vectors.
    #[arg(short, long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub scale: Option<f64>,

    /// Directory the snapshots are written to.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,
}

/// Arguments for the `setup` subcommand.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Output file whose final geometry (and charge/multiplicity) seeds the input.
    #[arg(required = true, value_name = "PATH")]
    pub path: PathBuf,

    /// Density functional or method (default: B3LYP).
    #[arg(long, value_name = "NAME")]
    pub functional: Option<String>,

    /// Basis set (default: 6-31G).
    #[arg(short, long, value_name = "NAME")]
    pub basis: Option<String>,

    /// Job type keyword, e.g. Opt, OptTS, SP (default: Opt).
    #[arg(long = "job", value_name = "KEYWORD")]
    pub job_type: Option<String>,

    /// Add a frequency calculation.
    #[arg(long)]
    pub freq: bool,

    /// Extra keyword for the '!' line. Can be used multiple times.
    #[arg(short, long = "keyword", value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Implicit solvent by name, e.g. water.
    #[arg(long, value_name = "NAME", conflicts_with = "epsilon")]
    pub solvent: Option<String>,

    /// Implicit solvent by dielectric constant, written as a %cpcm block.
    #[arg(long, value_name = "FLOAT")]
    pub epsilon: Option<f64>,

    /// Solvation model keyword used with --solvent or --epsilon (default: CPCM).
    #[arg(long, value_name = "MODEL")]
    pub solvation_model: Option<String>,

    /// Extra input block as NAME=CONTENT; ';' separates lines. Can be used multiple times.
    /// Example: --block "pal=nprocs 8"
    #[arg(long = "block", value_name = "NAME=CONTENT", value_parser = parser::parse_block)]
    pub blocks: Vec<(String, String)>,

    /// Total charge. Defaults to the charge found in PATH, else 0.
    #[arg(long, value_name = "INT", allow_negative_numbers = true)]
    pub charge: Option<i32>,

    /// Spin multiplicity. Defaults to the multiplicity found in PATH, else 1.
    #[arg(long, value_name = "INT")]
    pub multiplicity: Option<u32>,

    /// Freeze a coordinate: 'atom:3', 'bond:1,2', 'angle:1,2,3' or 'dihedral:1,2,3,4'
    /// (atoms counted from 1). Can be used multiple times.
    #[arg(long, value_name = "KIND:ATOMS")]
    pub freeze: Vec<Constraint>,

    /// Scan the bond between two atoms (counted from 1), one input per point.
    #[arg(long, value_name = "I,J", value_parser = parser::parse_atom_pair)]
    pub scan: Option<(usize, usize)>,

    /// Bond length change per scan point in Angstroms (default: 0.1).
    #[arg(long, value_name = "FLOAT", requires = "scan")]
    pub scan_step: Option<f64>,

    /// Number of scan points in each scanned direction (default: 5).
    #[arg(long, value_name = "INT", requires = "scan")]
    pub scan_points: Option<usize>,

    /// Scan direction: '+' stretches, '-' compresses, '+/-' does both (default: +).
    #[arg(long, value_name = "DIR", requires = "scan", allow_hyphen_values = true)]
    pub scan_direction: Option<ScanDirection>,

    /// Move both scanned atoms by half the step instead of only the second.
    #[arg(long, requires = "scan")]
    pub move_both: bool,

    /// Base name of the written files (default: the stem of PATH).
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Directory the input files are written to.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,
}
