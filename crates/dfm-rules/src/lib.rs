#![warn(missing_docs)]

//! Manufacturability rules and the engine that runs them.
//!
//! # Overview
//!
//! - [`AnalysisConfig`] - process parameters, loadable from TOML
//! - [`RuleContext`] - validated parameters plus the borrowed mesh and index
//! - [`Rule`] - a single check; see [`rules`] for the standard set
//! - [`RuleEngine`] - ordered, isolated, optionally parallel evaluation
//! - [`Report`] - ordered [`Finding`]s and a [`Summary`], serializable to JSON
//!
//! # Example
//!
//! ```
//! use dfm_mesh::cube_geometry;
//! use dfm_raytrace::SpatialIndex;
//! use dfm_rules::{AnalysisConfig, RuleContext, RuleEngine};
//!
//! let mesh = cube_geometry(10.0).into_model().unwrap();
//! let index = SpatialIndex::build(&mesh);
//! let config = AnalysisConfig::molding([0.0, 0.0, 1.0])
//!     .with_wall_thickness(Some(12.0), None);
//! let ctx = RuleContext::build(&mesh, &index, &config).unwrap();
//!
//! let report = RuleEngine::with_standard_rules().run(&ctx);
//! assert!(report.summary().warning > 0);
//! println!("{}", report.to_json_pretty().unwrap());
//! ```

mod config;
mod context;
mod engine;
mod error;
mod finding;
mod report;
mod rule;
pub mod rules;

#[cfg(test)]
mod testing;

pub use config::{AnalysisConfig, LengthUnit, ProcessKind};
pub use context::RuleContext;
pub use engine::{RuleEngine, ENGINE_ID};
pub use error::{ConfigError, Result, RuleError};
pub use finding::{Finding, FindingCode, Severity};
pub use report::{Report, Summary};
pub use rule::{Evaluation, Requirements, Rule};
