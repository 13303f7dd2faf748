//! dfm - manufacturability checks for STL meshes.
//!
//! # Logging
//!
//! Log output goes to stderr. `-v` enables info events from the analysis
//! crates, `-vv` debug and `-vvv` everything. `RUST_LOG` overrides the flags:
//!
//! ```bash
//! RUST_LOG=dfm_rules=debug dfm analyze part.stl --pull 0,0,1
//! ```
//!
//! # Exit status
//!
//! `0` when the report has no error findings, `2` when it does and `1` when
//! the analysis could not run at all.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dfm::{LengthUnit, ProcessKind};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod stl;

#[derive(Parser)]
#[command(name = "dfm")]
#[command(author, version, long_about = None)]
#[command(about = "Design-for-manufacturability checks for STL meshes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the manufacturability rules against a mesh
    Analyze(AnalyzeArgs),
    /// Print mesh size and topology
    Info {
        /// Input STL file
        input: PathBuf,
    },
}

/// Options of `dfm analyze`. Flags override values from `--config`.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Input STL file
    pub input: PathBuf,

    /// TOML configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Manufacturing process (injection_molding or cnc_machining)
    #[arg(long)]
    pub process: Option<ProcessKind>,

    /// Mold pull direction as x,y,z
    #[arg(long, value_parser = parse_direction, allow_hyphen_values = true)]
    pub pull: Option<[f64; 3]>,

    /// Minimum wall thickness (mesh units)
    #[arg(long)]
    pub min_wall: Option<f64>,

    /// Maximum wall thickness (mesh units)
    #[arg(long)]
    pub max_wall: Option<f64>,

    /// Minimum draft angle in degrees
    #[arg(long)]
    pub draft: Option<f64>,

    /// Minimum internal corner radius (mesh units)
    #[arg(long)]
    pub corner_radius: Option<f64>,

    /// Unit of the mesh coordinates (mm, cm, m, in)
    #[arg(long)]
    pub units: Option<LengthUnit>,

    /// Drop results of rules not finished within this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Run rules one after another instead of in parallel
    #[arg(long)]
    pub sequential: bool,
}

fn parse_direction(s: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{s}'"));
    };
    let component = |c: &str| {
        c.parse::<f64>()
            .map_err(|e| format!("invalid component '{c}': {e}"))
    };
    Ok([component(x)?, component(y)?, component(z)?])
}

/// Filter directives for `-v` counts when `RUST_LOG` is unset.
fn verbosity_directives(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "dfm=info,dfm_mesh=info,dfm_raytrace=info,dfm_rules=info",
        2 => "dfm=debug,dfm_mesh=debug,dfm_raytrace=debug,dfm_rules=debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(verbosity_directives(verbose))
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Analyze(args) => commands::analyze::run(args, cli.format),
        Commands::Info { input } => {
            commands::info::run(input, cli.format).map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {cause}");
            }
            ExitCode::from(1)
        }
    }
}
