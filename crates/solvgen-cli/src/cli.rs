use clap::{Args, Parser, Subcommand};
use solvgen::core::models::recipe::{SoluteEntry, SolventEntry};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "solvgen - Build charge-balanced, density-matched solvated ionic systems with Packmol.",
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

    /// Number of combinations packed in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pack one system from an explicit list of solutes and a solvent.
    Generate(GenerateArgs),
    /// Pack every cation × anion × solvent combination of three tables.
    Sweep(SweepArgs),
    /// Fill placeholders of a simulation-driver input template.
    Template(TemplateArgs),
}

/// Options shared by every command that runs the packer.
#[derive(Args, Debug, Clone, Default)]
pub struct PackingArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding one `<name>.xyz` geometry per species.
    #[arg(short = 'r', long, value_name = "DIR")]
    pub structure_root: Option<PathBuf>,

    /// Directory receiving the canonical outputs.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of atoms per system.
    #[arg(short = 'n', long, value_name = "INT")]
    pub atom_budget: Option<usize>,

    /// Packmol executable to run.
    #[arg(long, value_name = "PATH")]
    pub packmol: Option<PathBuf>,

    /// Minimum inter-atomic distance in Å.
    #[arg(short, long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    /// Kill a packing run after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Keep each job's working directory after it succeeds.
    #[arg(long)]
    pub keep_work_files: bool,

    /// Extra length in Å added to every cell edge of the output.
    #[arg(long, value_name = "FLOAT")]
    pub cell_padding: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S packing.tolerance=2.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// A solute and its count, e.g. `Li:1`. Repeat for each solute, in packing order.
    #[arg(long = "solute", value_name = "NAME:COUNT", required = true)]
    pub solutes: Vec<SoluteEntry>,

    /// The solvent and its density in g/cm³, e.g. `water:1.0`.
    #[arg(long, value_name = "NAME:DENSITY", required = true)]
    pub solvent: SolventEntry,

    #[command(flatten)]
    pub packing: PackingArgs,
}

/// Arguments for the `sweep` subcommand.
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// CSV table with `name,charge` rows of cations.
    #[arg(long, value_name = "PATH")]
    pub cations: Option<PathBuf>,

    /// CSV table with `name,charge` rows of anions.
    #[arg(long, value_name = "PATH")]
    pub anions: Option<PathBuf>,

    /// CSV table with `name,density` rows of solvents.
    #[arg(long, value_name = "PATH")]
    pub solvents: Option<PathBuf>,

    #[command(flatten)]
    pub packing: PackingArgs,
}

/// Arguments for the `template` subcommand.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Template file containing placeholders such as NSTEPS or INPUTFILE.
    #[arg(long, value_name = "PATH")]
    pub template: PathBuf,

    /// Where to write the filled file.
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// A placeholder value. FILENAME, MODEL_PATH and INPUTFILE are required;
    /// NSTEPS, SEED, TEMPERATURE and PRESSURE have defaults.
    #[arg(long = "set", value_name = "KEY=VALUE", num_args(1..))]
    pub values: Vec<String>,
}
