//! Sharp internal corner check for machined parts.

use rayon::prelude::*;

use crate::config::ProcessKind;
use crate::context::RuleContext;
use crate::error::RuleError;
use crate::finding::{Finding, FindingCode, Severity};
use crate::rule::{Evaluation, Requirements, Rule};

/// Turning angles below this (radians) are treated as flat.
const FLAT_ANGLE: f64 = 1e-6;

/// Flags concave edges whose implied fillet radius is below the minimum
/// a rotating cutter can produce.
///
/// On a faceted surface a fillet of radius `r` turning through angle `δ`
/// spans an arc of length `r·δ`. The facets meeting at an edge bound that
/// arc by their height over the edge, so the implied radius is
/// `min(h1, h2) / δ`. A plain sharp corner between large faces therefore
/// reports the face size, which is why only concave edges are considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharpCornerRule;

impl SharpCornerRule {
    /// Rule id.
    pub const ID: &'static str = "sharp_corner";
}

impl Rule for SharpCornerRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn requirements(&self) -> Requirements {
        Requirements::none()
            .manifold()
            .process(ProcessKind::CncMachining)
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Evaluation, RuleError> {
        let mesh = ctx.mesh();
        let min_radius = ctx.min_corner_radius();
        let eps = ctx.epsilon();
        let units = ctx.units().symbol();

        let per_edge: Vec<Option<Finding>> = (0..mesh.edges().len())
            .into_par_iter()
            .map(|edge_id| -> Result<Option<Finding>, RuleError> {
                let edge = mesh.edge(edge_id);
                let Some((f1, f2)) = edge.face_pair() else {
                    return Ok(None);
                };
                let (f1, f2) = (f1 as usize, f2 as usize);
                let n1 = mesh.face_normal(f1);
                let n2 = mesh.face_normal(f2);
                let delta = n1.dot(&n2).clamp(-1.0, 1.0).acos();
                if delta < FLAT_ANGLE {
                    return Ok(None);
                }

                let [a, b] = edge.vertices.map(|v| mesh.vertex(v as usize));
                let far = mesh.opposite_vertex(f2, edge_id).ok_or_else(|| {
                    RuleError::Failed(format!("edge {edge_id} is not part of face {f2}"))
                })?;
                if (mesh.vertex(far as usize) - a).dot(&n1) <= eps {
                    return Ok(None);
                }

                let length = (b - a).norm();
                let height = |f: usize| 2.0 * mesh.face_area(f) / length;
                let radius = height(f1).min(height(f2)) / delta;
                if radius >= min_radius - eps {
                    return Ok(None);
                }

                Ok(Some(
                    Finding::new(
                        Self::ID,
                        FindingCode::SharpCorner,
                        Severity::Warning,
                        format!(
                            "internal corner radius {radius:.3} {units} is below the minimum \
                             {min_radius:.3} {units} (turning angle {:.1}°)",
                            delta.to_degrees()
                        ),
                    )
                    .with_faces(vec![f1 as u32, f2 as u32])
                    .with_measurement(radius, min_radius),
                ))
            })
            .collect::<Result<_, _>>()?;

        Ok(Evaluation::from_findings(per_edge.into_iter().flatten().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::testing::with_context;
    use approx::assert_relative_eq;
    use dfm_mesh::{cube_geometry, l_block_geometry, RawMesh};
    use std::f64::consts::FRAC_PI_2;

    fn run(raw: RawMesh, radius: f64) -> Evaluation {
        let config = AnalysisConfig::machining().with_min_corner_radius(radius);
        with_context(raw, &config, |ctx| SharpCornerRule.evaluate(ctx).unwrap())
    }

    #[test]
    fn test_convex_cube_has_no_internal_corners() {
        assert!(run(cube_geometry(1.0), 100.0).findings.is_empty());
    }

    #[test]
    fn test_l_block_internal_corner() {
        let eval = run(l_block_geometry(1.0, 1.0), 1.0);
        assert_eq!(eval.findings.len(), 1);
        let finding = &eval.findings[0];
        assert_eq!(finding.code, FindingCode::SharpCorner);
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.faces.len(), 2);
        assert_relative_eq!(finding.value.unwrap(), 1.0 / FRAC_PI_2, epsilon = 1e-9);
        assert_eq!(finding.threshold, Some(1.0));
    }

    #[test]
    fn test_corner_faces_meet_at_the_notch() {
        let mesh = l_block_geometry(1.0, 1.0).into_model().unwrap();
        let eval = run(l_block_geometry(1.0, 1.0), 1.0);
        for &face in &eval.findings[0].faces {
            let c = mesh.face_centroid(face as usize);
            let on_x_wall = (c.x - 1.0).abs() < 1e-12 && c.y > 1.0;
            let on_y_wall = (c.y - 1.0).abs() < 1e-12 && c.x > 1.0;
            assert!(on_x_wall || on_y_wall, "face {face} at {c:?}");
        }
    }

    #[test]
    fn test_radius_below_implied_is_clean() {
        assert!(run(l_block_geometry(1.0, 1.0), 0.5).findings.is_empty());
        assert!(run(l_block_geometry(1.0, 1.0), 0.0).findings.is_empty());
    }
}
