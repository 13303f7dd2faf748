//! Analysis configuration.
//!
//! [`AnalysisConfig`] is plain data: it deserializes from TOML with every
//! field optional and is checked by [`AnalysisConfig::validate`] when a
//! [`RuleContext`](crate::RuleContext) is built, so callers can layer
//! overrides (for example command-line flags) on top of a file before
//! validation.
//!
//! ```toml
//! process = "injection_molding"
//! pull_direction = [0.0, 0.0, 1.0]
//! draft_angle_threshold_degrees = 1.5
//! min_wall_thickness = 0.8
//! max_wall_thickness = 4.0
//! units = "millimeters"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Manufacturing process the part is analysed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    /// Two-plate injection molding along a pull direction.
    #[default]
    InjectionMolding,
    /// Subtractive CNC machining.
    CncMachining,
}

impl ProcessKind {
    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InjectionMolding => "injection_molding",
            Self::CncMachining => "cnc_machining",
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "injection_molding" | "molding" => Ok(Self::InjectionMolding),
            "cnc_machining" | "machining" | "cnc" => Ok(Self::CncMachining),
            other => Err(format!(
                "unknown process '{other}' (expected injection_molding or cnc_machining)"
            )),
        }
    }
}

/// Length unit of the mesh coordinates.
///
/// Only used for labelling and unit conversion in reports; every threshold
/// is interpreted in mesh units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    /// Millimeters.
    #[default]
    Millimeters,
    /// Centimeters.
    Centimeters,
    /// Meters.
    Meters,
    /// Inches.
    Inches,
}

impl LengthUnit {
    /// Short symbol used in messages.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Centimeters => "cm",
            Self::Meters => "m",
            Self::Inches => "in",
        }
    }

    /// Size of one unit in millimeters.
    pub fn millimeters_per_unit(&self) -> f64 {
        match self {
            Self::Millimeters => 1.0,
            Self::Centimeters => 10.0,
            Self::Meters => 1000.0,
            Self::Inches => 25.4,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mm" | "millimeters" | "millimetres" => Ok(Self::Millimeters),
            "cm" | "centimeters" | "centimetres" => Ok(Self::Centimeters),
            "m" | "meters" | "metres" => Ok(Self::Meters),
            "in" | "inch" | "inches" => Ok(Self::Inches),
            other => Err(format!("unknown unit '{other}'")),
        }
    }
}

/// Process parameters for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Target manufacturing process.
    pub process: ProcessKind,
    /// Mold pull direction. Required for injection molding; normalised on use.
    pub pull_direction: Option<[f64; 3]>,
    /// Minimum acceptable draft angle (degrees, inclusive).
    pub draft_angle_threshold_degrees: f64,
    /// Minimum wall thickness (mesh units).
    pub min_wall_thickness: Option<f64>,
    /// Maximum wall thickness (mesh units, molding only).
    pub max_wall_thickness: Option<f64>,
    /// Minimum internal corner radius (mesh units, machining only).
    pub min_corner_radius: f64,
    /// Unit of the mesh coordinates.
    pub units: LengthUnit,
    /// Faces with less draft than this are treated as parting faces and
    /// exempt from the draft check (degrees).
    pub parting_face_tolerance_degrees: f64,
    /// Faces thicker than the nominal wall times this factor are flagged
    /// as over-thick rib or boss regions.
    pub rib_boss_factor: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            process: ProcessKind::InjectionMolding,
            pull_direction: None,
            draft_angle_threshold_degrees: 1.0,
            min_wall_thickness: None,
            max_wall_thickness: None,
            min_corner_radius: 0.0,
            units: LengthUnit::Millimeters,
            parting_face_tolerance_degrees: 0.05,
            rib_boss_factor: 1.5,
        }
    }
}

impl AnalysisConfig {
    /// Injection molding along `pull`.
    pub fn molding(pull: [f64; 3]) -> Self {
        Self {
            process: ProcessKind::InjectionMolding,
            pull_direction: Some(pull),
            ..Self::default()
        }
    }

    /// CNC machining.
    pub fn machining() -> Self {
        Self {
            process: ProcessKind::CncMachining,
            ..Self::default()
        }
    }

    /// Set the wall thickness bounds.
    pub fn with_wall_thickness(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_wall_thickness = min;
        self.max_wall_thickness = max;
        self
    }

    /// Set the draft angle threshold in degrees.
    pub fn with_draft_threshold(mut self, degrees: f64) -> Self {
        self.draft_angle_threshold_degrees = degrees;
        self
    }

    /// Set the minimum internal corner radius.
    pub fn with_min_corner_radius(mut self, radius: f64) -> Self {
        self.min_corner_radius = radius;
        self
    }

    /// Set the length unit.
    pub fn with_units(mut self, units: LengthUnit) -> Self {
        self.units = units;
        self
    }

    /// Parse a configuration from TOML text. Missing fields take their
    /// defaults; the result is not validated.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check that the parameters are consistent for the selected process.
    pub fn validate(&self) -> Result<()> {
        match (self.process, self.pull_direction) {
            (ProcessKind::InjectionMolding, None) => {
                return Err(ConfigError::invalid(
                    "injection molding requires a pull direction",
                ));
            }
            (_, Some(pull)) => {
                let norm = pull.iter().map(|c| c * c).sum::<f64>().sqrt();
                if !pull.iter().all(|c| c.is_finite()) || !norm.is_finite() || norm == 0.0 {
                    return Err(ConfigError::invalid(format!(
                        "pull direction {pull:?} must be a finite non-zero vector"
                    )));
                }
            }
            (ProcessKind::CncMachining, None) => {}
        }

        let angle = self.draft_angle_threshold_degrees;
        if !angle.is_finite() || !(0.0..90.0).contains(&angle) {
            return Err(ConfigError::invalid(format!(
                "draft_angle_threshold_degrees must be in [0, 90), got {angle}"
            )));
        }

        let tol = self.parting_face_tolerance_degrees;
        if !tol.is_finite() || !(0.0..90.0).contains(&tol) {
            return Err(ConfigError::invalid(format!(
                "parting_face_tolerance_degrees must be in [0, 90), got {tol}"
            )));
        }

        check_length("min_wall_thickness", self.min_wall_thickness)?;
        check_length("max_wall_thickness", self.max_wall_thickness)?;
        check_length("min_corner_radius", Some(self.min_corner_radius))?;

        if let (Some(min), Some(max)) = (self.min_wall_thickness, self.max_wall_thickness) {
            if min > max {
                return Err(ConfigError::invalid(format!(
                    "min_wall_thickness ({min}) exceeds max_wall_thickness ({max})"
                )));
            }
        }

        let factor = self.rib_boss_factor;
        if !factor.is_finite() || factor <= 1.0 {
            return Err(ConfigError::invalid(format!(
                "rib_boss_factor must be greater than 1, got {factor}"
            )));
        }

        Ok(())
    }
}

fn check_length(name: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ConfigError::invalid(format!(
            "{name} must be a finite non-negative length, got {v}"
        ))),
        _ => Ok(()),
    }
}
