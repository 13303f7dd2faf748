//! Aggregated analysis result.

use serde::{Deserialize, Serialize};

use crate::finding::{Finding, FindingCode, Severity};

/// Penalty weights for the manufacturability score, applied to the share
/// of faces affected by each kind of defect.
const THICKNESS_WEIGHT: f64 = 40.0;
const DRAFT_WEIGHT: f64 = 30.0;
const UNDERCUT_WEIGHT: f64 = 20.0;
const CORNER_WEIGHT: f64 = 10.0;

/// Counts and headline numbers of a [`Report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of `info` findings.
    pub info: usize,
    /// Number of `warning` findings.
    pub warning: usize,
    /// Number of `error` findings.
    pub error: usize,
    /// Faces whose wall thickness could not be measured.
    pub unmeasurable_faces: usize,
    /// Number of faces analysed.
    pub face_count: usize,
    /// Whether the deadline stopped some rules from running.
    pub timed_out: bool,
    /// Manufacturability score from 0 (worst) to 100.
    pub score: f64,
}

/// Ordered findings of one engine run plus a summary.
///
/// Owns all its data, so it outlives the mesh it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    summary: Summary,
    findings: Vec<Finding>,
}

impl Report {
    /// Assemble a report, computing the summary from `findings`.
    pub fn new(
        findings: Vec<Finding>,
        face_count: usize,
        unmeasurable_faces: usize,
        timed_out: bool,
    ) -> Self {
        let count = |s: Severity| findings.iter().filter(|f| f.severity == s).count();
        let summary = Summary {
            info: count(Severity::Info),
            warning: count(Severity::Warning),
            error: count(Severity::Error),
            unmeasurable_faces,
            face_count,
            timed_out,
            score: score(&findings, face_count),
        };
        Self { summary, findings }
    }

    /// Summary counts.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Findings in evaluation order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings emitted by one rule.
    pub fn findings_for_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings.iter().filter(move |f| f.rule_id == rule_id)
    }

    /// Findings of one kind.
    pub fn findings_with_code(&self, code: FindingCode) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.code == code)
    }

    /// True if any finding has `error` severity.
    pub fn has_errors(&self) -> bool {
        self.summary.error > 0
    }

    /// Compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Score a set of findings against the number of analysed faces.
///
/// Each defect kind subtracts its weight times the fraction of faces it
/// affects; the result is clamped to `[0, 100]`.
fn score(findings: &[Finding], face_count: usize) -> f64 {
    if face_count == 0 {
        return 0.0;
    }
    let faces_with = |codes: &[FindingCode]| -> f64 {
        let mut faces: Vec<u32> = findings
            .iter()
            .filter(|f| codes.contains(&f.code))
            .flat_map(|f| f.faces.iter().copied())
            .collect();
        faces.sort_unstable();
        faces.dedup();
        faces.len() as f64 / face_count as f64
    };

    let score = 100.0
        - THICKNESS_WEIGHT
            * faces_with(&[
                FindingCode::ThinWall,
                FindingCode::ThickWall,
                FindingCode::OverThickRegion,
            ])
        - DRAFT_WEIGHT * faces_with(&[FindingCode::DraftAngle])
        - UNDERCUT_WEIGHT * faces_with(&[FindingCode::Undercut])
        - CORNER_WEIGHT * faces_with(&[FindingCode::SharpCorner]);
    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn face_finding(code: FindingCode, faces: Vec<u32>) -> Finding {
        Finding::new("r", code, Severity::Warning, "m").with_faces(faces)
    }

    #[test]
    fn test_counts() {
        let findings = vec![
            Finding::new("a", FindingCode::RuleSkipped, Severity::Info, "skip"),
            face_finding(FindingCode::ThinWall, vec![0]),
            Finding::new("b", FindingCode::OpenShell, Severity::Error, "open"),
        ];
        let report = Report::new(findings, 10, 2, false);
        let s = report.summary();
        assert_eq!((s.info, s.warning, s.error), (1, 1, 1));
        assert_eq!(s.unmeasurable_faces, 2);
        assert!(report.has_errors());
        assert_eq!(report.findings_for_rule("b").count(), 1);
        assert_eq!(report.findings_with_code(FindingCode::ThinWall).count(), 1);
    }

    #[test]
    fn test_clean_score() {
        let report = Report::new(Vec::new(), 12, 0, false);
        assert_relative_eq!(report.summary().score, 100.0);
        assert_relative_eq!(Report::new(Vec::new(), 0, 0, false).summary().score, 0.0);
    }

    #[test]
    fn test_score_weights() {
        // Half the faces thin, a quarter with low draft.
        let findings = vec![
            face_finding(FindingCode::ThinWall, vec![0]),
            face_finding(FindingCode::ThinWall, vec![1]),
            face_finding(FindingCode::ThickWall, vec![1]),
            face_finding(FindingCode::DraftAngle, vec![2]),
        ];
        let report = Report::new(findings, 4, 0, false);
        assert_relative_eq!(report.summary().score, 100.0 - 40.0 * 0.5 - 30.0 * 0.25);
    }

    #[test]
    fn test_score_is_clamped() {
        let findings: Vec<Finding> = (0..4)
            .flat_map(|f| {
                [
                    face_finding(FindingCode::ThinWall, vec![f]),
                    face_finding(FindingCode::DraftAngle, vec![f]),
                    face_finding(FindingCode::Undercut, vec![f]),
                    face_finding(FindingCode::SharpCorner, vec![f]),
                ]
            })
            .collect();
        let report = Report::new(findings, 4, 0, false);
        assert_relative_eq!(report.summary().score, 0.0);
    }

    #[test]
    fn test_json_shape() {
        let report = Report::new(
            vec![face_finding(FindingCode::Undercut, vec![3, 1])],
            12,
            0,
            true,
        );
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let summary = &json["summary"];
        for key in [
            "info",
            "warning",
            "error",
            "unmeasurableFaces",
            "faceCount",
            "timedOut",
            "score",
        ] {
            assert!(summary.get(key).is_some(), "missing summary.{key}");
        }
        assert_eq!(summary["timedOut"], true);
        assert_eq!(json["findings"][0]["faces"], serde_json::json!([1, 3]));

        let back: Report = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, report);
    }
}
