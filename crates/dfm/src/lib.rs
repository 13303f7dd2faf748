#![warn(missing_docs)]

//! dfm - design-for-manufacturability analysis of triangle meshes.
//!
//! Checks a closed triangle mesh for features that are hard or impossible
//! to injection mold or machine: missing draft, undercuts, thin and thick
//! walls, sharp internal corners and broken shell topology.
//!
//! # Example
//!
//! ```
//! use dfm::{analyze, cube_geometry, AnalysisConfig};
//!
//! let raw = cube_geometry(10.0);
//! let config = AnalysisConfig::molding([0.0, 0.0, 1.0]).with_wall_thickness(Some(1.0), Some(20.0));
//! let report = analyze(raw.vertices, raw.faces, &config).unwrap();
//! assert!(!report.has_errors());
//! ```
//!
//! For control over the rule set or a deadline, use [`Analysis`].

pub use dfm_math;
pub use dfm_mesh;
pub use dfm_raytrace;
pub use dfm_rules;

pub use dfm_mesh::{
    box_geometry, cube_geometry, l_block_geometry, prism_geometry, Malformation, MeshError,
    MeshModel, RawMesh, TopologySummary,
};
pub use dfm_raytrace::{RayHit, SpatialIndex};
pub use dfm_rules::{
    rules, AnalysisConfig, ConfigError, Evaluation, Finding, FindingCode, LengthUnit,
    ProcessKind, Report, Requirements, Rule, RuleContext, RuleEngine, RuleError, Severity,
    Summary,
};

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// Errors that stop an analysis before any rule runs.
#[derive(Error, Debug)]
pub enum DfmError {
    /// The input geometry is structurally invalid.
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// The configuration is invalid or could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for analysis entry points.
pub type Result<T> = std::result::Result<T, DfmError>;

/// A configured analysis: parameters, rule set and optional deadline.
#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
    engine: RuleEngine,
    timeout: Option<Duration>,
}

impl Analysis {
    /// Analysis with the standard rule set and no deadline.
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            engine: RuleEngine::with_standard_rules(),
            timeout: None,
        }
    }

    /// Replace the rule set.
    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Keep only rule results completed within `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configuration this analysis runs with.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse an already built mesh.
    pub fn run(&self, mesh: &MeshModel) -> Result<Report> {
        let index = SpatialIndex::build(mesh);
        let ctx = RuleContext::build(mesh, &index, &self.config)?;
        debug!(faces = mesh.face_count(), timeout = ?self.timeout, "running analysis");
        Ok(match self.timeout {
            Some(timeout) => self.engine.run_with_timeout(&ctx, timeout),
            None => self.engine.run(&ctx),
        })
    }

    /// Build a mesh from raw arrays and analyse it.
    pub fn run_raw(&self, vertices: Vec<[f64; 3]>, faces: Vec<[u32; 3]>) -> Result<Report> {
        let mesh = MeshModel::build(vertices, faces)?;
        self.run(&mesh)
    }
}

/// Build a mesh and run the standard rules against it.
pub fn analyze(
    vertices: Vec<[f64; 3]>,
    faces: Vec<[u32; 3]>,
    config: &AnalysisConfig,
) -> Result<Report> {
    Analysis::new(config.clone()).run_raw(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfm_math::Point3;

    #[test]
    fn test_analyze_clean_cube() {
        let raw = cube_geometry(10.0);
        let config = AnalysisConfig::molding([0.0, 0.0, 1.0]);
        let report = analyze(raw.vertices, raw.faces, &config).unwrap();
        assert!(!report.has_errors());
        assert_eq!(report.summary().face_count, 12);
    }

    #[test]
    fn test_malformed_geometry_is_fatal() {
        let raw = cube_geometry(1.0);
        let mut faces = raw.faces.clone();
        faces.push([0, 1, 42]);
        let err = analyze(raw.vertices.clone(), faces, &AnalysisConfig::machining()).unwrap_err();
        assert!(matches!(err, DfmError::Mesh(MeshError::MalformedGeometry(_))));

        // Without the dangling face the same data builds and analyses.
        assert!(analyze(raw.vertices, raw.faces, &AnalysisConfig::machining()).is_ok());
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let raw = cube_geometry(1.0);
        let err = analyze(raw.vertices, raw.faces, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DfmError::Config(ConfigError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_stacked_boxes_report() {
        let mut raw = box_geometry(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        raw.append(&box_geometry(
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(1.0, 1.0, 3.0),
        ));
        let analysis = Analysis::new(AnalysisConfig::molding([0.0, 0.0, 1.0]));
        let report = analysis.run(&raw.into_model().unwrap()).unwrap();
        assert_eq!(report.findings_with_code(FindingCode::Undercut).count(), 4);
        assert!(report.has_errors());
        assert!(report.summary().score < 100.0);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["summary"]["error"], 4);
    }

    #[test]
    fn test_custom_engine_and_timeout() {
        let mut engine = RuleEngine::new();
        engine.register(rules::ThinPartRule);
        let config = AnalysisConfig::machining().with_wall_thickness(Some(5.0), None);
        let report = Analysis::new(config)
            .with_engine(engine)
            .with_timeout(Duration::from_secs(60))
            .run(&cube_geometry(1.0).into_model().unwrap())
            .unwrap();
        assert_eq!(report.findings().len(), 1);
        assert_eq!(report.findings()[0].code, FindingCode::ThinPart);
        assert!(!report.summary().timed_out);
    }
}
