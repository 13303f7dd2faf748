//! Manufacturability findings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note.
    Info,
    /// Likely to cause quality problems or extra cost.
    Warning,
    /// Cannot be manufactured as modelled.
    Error,
}

impl Severity {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable kind of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCode {
    /// Face draft below the configured threshold.
    DraftAngle,
    /// Face shadowed along both pull directions.
    Undercut,
    /// Wall thinner than the minimum.
    ThinWall,
    /// Wall thicker than the maximum.
    ThickWall,
    /// Internal corner radius below the minimum.
    SharpCorner,
    /// Edge shared by more than two faces.
    NonManifoldMesh,
    /// Edge used by a single face.
    OpenShell,
    /// Neighbouring faces wound in the same direction along a shared edge.
    InconsistentWinding,
    /// Whole part thinner than the minimum wall.
    ThinPart,
    /// Region much thicker than the nominal wall.
    OverThickRegion,
    /// Rule not applicable to this process or mesh.
    RuleSkipped,
    /// Rule returned an error or panicked.
    RuleFailure,
    /// Deadline passed before all rules started.
    Timeout,
}

impl FindingCode {
    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DraftAngle => "draft_angle",
            Self::Undercut => "undercut",
            Self::ThinWall => "thin_wall",
            Self::ThickWall => "thick_wall",
            Self::SharpCorner => "sharp_corner",
            Self::NonManifoldMesh => "non_manifold_mesh",
            Self::OpenShell => "open_shell",
            Self::InconsistentWinding => "inconsistent_winding",
            Self::ThinPart => "thin_part",
            Self::OverThickRegion => "over_thick_region",
            Self::RuleSkipped => "rule_skipped",
            Self::RuleFailure => "rule_failure",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single manufacturability observation.
///
/// Findings are plain data and are never modified after a rule emits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Id of the rule that produced this finding.
    pub rule_id: String,
    /// Kind of finding.
    pub code: FindingCode,
    /// Severity.
    pub severity: Severity,
    /// Affected faces in ascending order; empty for mesh-level findings.
    pub faces: Vec<u32>,
    /// Measured value (angle in degrees or length in mesh units).
    pub value: Option<f64>,
    /// Threshold the value was compared against.
    pub threshold: Option<f64>,
    /// Human-readable description.
    pub message: String,
}

impl Finding {
    /// Create a mesh-level finding with no faces or measurements.
    pub fn new(
        rule_id: impl Into<String>,
        code: FindingCode,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            code,
            severity,
            faces: Vec::new(),
            value: None,
            threshold: None,
            message: message.into(),
        }
    }

    /// Set the affected faces.
    pub fn with_faces(mut self, mut faces: Vec<u32>) -> Self {
        faces.sort_unstable();
        faces.dedup();
        self.faces = faces;
        self
    }

    /// Set the measured value and the threshold it violated.
    pub fn with_measurement(mut self, value: f64, threshold: f64) -> Self {
        self.value = Some(value);
        self.threshold = Some(threshold);
        self
    }

    /// Set the measured value only.
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({}): {}", self.severity, self.code, self.rule_id, self.message)?;
        if !self.faces.is_empty() {
            write!(f, " faces={:?}", self.faces)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sorts_faces() {
        let finding = Finding::new("sharp_corner", FindingCode::SharpCorner, Severity::Warning, "x")
            .with_faces(vec![9, 3, 9])
            .with_measurement(0.2, 0.5);
        assert_eq!(finding.faces, vec![3, 9]);
        assert_eq!(finding.value, Some(0.2));
        assert_eq!(finding.threshold, Some(0.5));
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_json_shape() {
        let finding = Finding::new("topology", FindingCode::OpenShell, Severity::Error, "open")
            .with_value(3.0);
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["ruleId"], "topology");
        assert_eq!(json["code"], "open_shell");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["faces"], serde_json::json!([]));
        assert_eq!(json["value"], 3.0);
        assert!(json["threshold"].is_null());
        assert_eq!(json["message"], "open");
    }

    #[test]
    fn test_display() {
        let finding = Finding::new("draft_angle", FindingCode::DraftAngle, Severity::Warning, "low")
            .with_faces(vec![4]);
        assert_eq!(finding.to_string(), "[warning] draft_angle (draft_angle): low faces=[4]");
    }
}
