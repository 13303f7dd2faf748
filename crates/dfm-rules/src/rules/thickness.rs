//! Wall thickness check.

use crate::config::ProcessKind;
use crate::context::RuleContext;
use crate::error::RuleError;
use crate::finding::{Finding, FindingCode, Severity};
use crate::rule::{Evaluation, Requirements, Rule};

/// Flags faces whose local wall thickness is outside the configured bounds.
///
/// Thickness is measured by a ray from the face centroid along the reversed
/// normal to the first face turned back towards it. Walls thinner than the
/// minimum are reported for every process; walls thicker than the maximum
/// only for molding (sink marks and long cooling times). Faces where no
/// opposing wall is found are counted as unmeasurable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThicknessRule;

impl ThicknessRule {
    /// Rule id.
    pub const ID: &'static str = "wall_thickness";
}

impl Rule for ThicknessRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn requirements(&self) -> Requirements {
        Requirements::none().manifold()
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Evaluation, RuleError> {
        let min = ctx.min_wall_thickness();
        let max = match ctx.process() {
            ProcessKind::InjectionMolding => ctx.max_wall_thickness(),
            ProcessKind::CncMachining => None,
        };
        let eps = ctx.epsilon();
        let units = ctx.units().symbol();

        let mut eval = Evaluation::default();
        for (face, thickness) in ctx.wall_thickness().iter().enumerate() {
            let Some(t) = *thickness else {
                eval.unmeasurable_faces += 1;
                continue;
            };
            let violation = match (min, max) {
                (Some(min), _) if t < min - eps => Some((
                    FindingCode::ThinWall,
                    min,
                    format!("wall thickness {t:.3} {units} is below the minimum {min:.3} {units}"),
                )),
                (_, Some(max)) if t > max + eps => Some((
                    FindingCode::ThickWall,
                    max,
                    format!("wall thickness {t:.3} {units} exceeds the maximum {max:.3} {units}"),
                )),
                _ => None,
            };
            if let Some((code, threshold, message)) = violation {
                eval.findings.push(
                    Finding::new(Self::ID, code, Severity::Warning, message)
                        .with_faces(vec![face as u32])
                        .with_measurement(t, threshold),
                );
            }
        }

        Ok(eval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::testing::{molding_z, with_context};
    use approx::assert_relative_eq;
    use dfm_math::Point3;
    use dfm_mesh::{box_geometry, cube_geometry};

    fn run(size: f64, config: &AnalysisConfig) -> Evaluation {
        with_context(cube_geometry(size), config, |ctx| {
            ThicknessRule.evaluate(ctx).unwrap()
        })
    }

    #[test]
    fn test_min_wall_above_cube_side_flags_every_face() {
        let eval = run(2.0, &molding_z().with_wall_thickness(Some(2.5), None));
        assert_eq!(eval.findings.len(), 12);
        for (i, finding) in eval.findings.iter().enumerate() {
            assert_eq!(finding.code, FindingCode::ThinWall);
            assert_eq!(finding.severity, Severity::Warning);
            assert_eq!(finding.faces, vec![i as u32]);
            assert_relative_eq!(finding.value.unwrap(), 2.0, epsilon = 1e-9);
            assert_eq!(finding.threshold, Some(2.5));
        }
        assert_eq!(eval.unmeasurable_faces, 0);
    }

    #[test]
    fn test_min_wall_below_cube_side_is_clean() {
        let eval = run(2.0, &molding_z().with_wall_thickness(Some(1.5), None));
        assert!(eval.findings.is_empty());
    }

    #[test]
    fn test_max_wall_only_for_molding() {
        let molding = run(2.0, &molding_z().with_wall_thickness(None, Some(1.0)));
        assert_eq!(molding.findings.len(), 12);
        assert!(molding
            .findings
            .iter()
            .all(|f| f.code == FindingCode::ThickWall));

        let machining = run(
            2.0,
            &AnalysisConfig::machining().with_wall_thickness(None, Some(1.0)),
        );
        assert!(machining.findings.is_empty());
    }

    #[test]
    fn test_thin_slab_flags_only_thin_direction() {
        let slab = box_geometry(Point3::origin(), Point3::new(10.0, 10.0, 0.5));
        let config = molding_z().with_wall_thickness(Some(1.0), None);
        let eval = with_context(slab, &config, |ctx| ThicknessRule.evaluate(ctx).unwrap());
        let faces: Vec<u32> = eval.findings.iter().flat_map(|f| f.faces.clone()).collect();
        assert_eq!(faces, vec![0, 1, 2, 3]);
    }
}
