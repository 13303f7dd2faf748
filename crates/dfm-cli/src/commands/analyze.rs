//! dfm analyze command - run the rule set against an STL mesh.

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use dfm::{Analysis, AnalysisConfig, Report, RuleEngine};
use tracing::info;

use crate::{stl, AnalyzeArgs, OutputFormat};

/// Exit status when the report contains error findings.
const EXIT_FINDINGS: u8 = 2;

pub fn run(args: &AnalyzeArgs, format: OutputFormat) -> Result<ExitCode> {
    let report = analyze(args)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => writeln!(out, "{}", report.to_json_pretty()?)?,
        OutputFormat::Text => render_text(&report, &mut out)?,
    }

    Ok(ExitCode::from(exit_status(&report)))
}

/// Load the mesh and configuration named by `args` and analyse.
pub fn analyze(args: &AnalyzeArgs) -> Result<Report> {
    let config = build_config(args)?;
    let raw = stl::load_stl(&args.input)?;
    let mesh = raw
        .into_model()
        .with_context(|| format!("invalid mesh in {}", args.input.display()))?;
    info!(
        path = %args.input.display(),
        faces = mesh.face_count(),
        process = %config.process,
        "loaded mesh"
    );

    let mut engine = RuleEngine::with_standard_rules();
    engine.parallel(!args.sequential);
    let mut analysis = Analysis::new(config).with_engine(engine);
    if let Some(ms) = args.timeout_ms {
        analysis = analysis.with_timeout(Duration::from_millis(ms));
    }

    analysis.run(&mesh).context("analysis could not run")
}

/// The file configuration, if any, with command-line overrides applied.
pub fn build_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(process) = args.process {
        config.process = process;
    }
    if let Some(pull) = args.pull {
        config.pull_direction = Some(pull);
    }
    if let Some(min) = args.min_wall {
        config.min_wall_thickness = Some(min);
    }
    if let Some(max) = args.max_wall {
        config.max_wall_thickness = Some(max);
    }
    if let Some(draft) = args.draft {
        config.draft_angle_threshold_degrees = draft;
    }
    if let Some(radius) = args.corner_radius {
        config.min_corner_radius = radius;
    }
    if let Some(units) = args.units {
        config.units = units;
    }

    Ok(config)
}

pub fn exit_status(report: &Report) -> u8 {
    if report.has_errors() {
        EXIT_FINDINGS
    } else {
        0
    }
}

pub fn render_text(report: &Report, out: &mut impl Write) -> io::Result<()> {
    let summary = report.summary();
    writeln!(
        out,
        "score {:.1}  faces {}  errors {}  warnings {}  info {}",
        summary.score, summary.face_count, summary.error, summary.warning, summary.info
    )?;
    if summary.unmeasurable_faces > 0 {
        writeln!(out, "{} faces could not be measured", summary.unmeasurable_faces)?;
    }
    if summary.timed_out {
        writeln!(out, "deadline reached, some rules did not run")?;
    }
    if report.findings().is_empty() {
        writeln!(out, "no findings")?;
    }
    for finding in report.findings() {
        writeln!(out, "  {finding}")?;
    }
    Ok(())
}
