//! Shell topology check.

use crate::context::RuleContext;
use crate::error::RuleError;
use crate::finding::{Finding, FindingCode, Severity};
use crate::rule::{Evaluation, Rule};

/// Reports open or non-manifold shells and inconsistent winding.
///
/// The engine always evaluates one instance of this rule before any
/// registered rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyRule;

impl TopologyRule {
    /// Rule id.
    pub const ID: &'static str = "topology";
}

impl Rule for TopologyRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Evaluation, RuleError> {
        let topo = ctx.mesh().topology();
        let mut findings = Vec::new();

        if topo.boundary_edges > 0 {
            findings.push(
                Finding::new(
                    Self::ID,
                    FindingCode::OpenShell,
                    Severity::Error,
                    format!(
                        "mesh is not closed: {} boundary edge(s)",
                        topo.boundary_edges
                    ),
                )
                .with_value(topo.boundary_edges as f64),
            );
        } else if topo.non_manifold_edges > 0 {
            findings.push(
                Finding::new(
                    Self::ID,
                    FindingCode::NonManifoldMesh,
                    Severity::Error,
                    format!(
                        "mesh is non-manifold: {} edge(s) shared by more than two faces",
                        topo.non_manifold_edges
                    ),
                )
                .with_value(topo.non_manifold_edges as f64),
            );
        } else if topo.inconsistent_edges > 0 {
            findings.push(
                Finding::new(
                    Self::ID,
                    FindingCode::InconsistentWinding,
                    Severity::Warning,
                    format!(
                        "inconsistent face winding across {} edge(s)",
                        topo.inconsistent_edges
                    ),
                )
                .with_value(topo.inconsistent_edges as f64),
            );
        }

        Ok(Evaluation::from_findings(findings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{molding_z, with_context};
    use dfm_mesh::cube_geometry;

    #[test]
    fn test_closed_cube_is_clean() {
        let eval = with_context(cube_geometry(1.0), &molding_z(), |ctx| {
            TopologyRule.evaluate(ctx).unwrap()
        });
        assert!(eval.findings.is_empty());
    }

    #[test]
    fn test_open_shell() {
        let mut raw = cube_geometry(1.0);
        raw.faces.pop();
        let eval = with_context(raw, &molding_z(), |ctx| TopologyRule.evaluate(ctx).unwrap());
        assert_eq!(eval.findings.len(), 1);
        let finding = &eval.findings[0];
        assert_eq!(finding.code, FindingCode::OpenShell);
        assert_eq!(finding.severity, Severity::Error);
        assert!(finding.faces.is_empty());
        assert_eq!(finding.value, Some(3.0));
    }

    #[test]
    fn test_non_manifold_fin() {
        let mut raw = cube_geometry(1.0);
        raw.vertices.push([0.5, -1.0, 0.5]);
        // Third face on the bottom-front edge 0-1.
        raw.faces.push([0, 1, 8]);
        raw.faces.push([0, 8, 1]);
        let eval = with_context(raw, &molding_z(), |ctx| TopologyRule.evaluate(ctx).unwrap());
        assert_eq!(eval.findings.len(), 1);
        assert_eq!(eval.findings[0].code, FindingCode::NonManifoldMesh);
    }

    #[test]
    fn test_inconsistent_winding() {
        let mut raw = cube_geometry(1.0);
        raw.faces[0] = [0, 1, 2];
        let eval = with_context(raw, &molding_z(), |ctx| TopologyRule.evaluate(ctx).unwrap());
        assert_eq!(eval.findings.len(), 1);
        assert_eq!(eval.findings[0].code, FindingCode::InconsistentWinding);
        assert_eq!(eval.findings[0].severity, Severity::Warning);
    }
}
