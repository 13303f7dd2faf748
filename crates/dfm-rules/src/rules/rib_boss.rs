//! Over-thick rib and boss regions.

use crate::config::ProcessKind;
use crate::context::RuleContext;
use crate::error::RuleError;
use crate::finding::{Finding, FindingCode, Severity};
use crate::rule::{Evaluation, Requirements, Rule};

/// Flags faces whose wall is much thicker than the part's nominal wall.
///
/// The nominal wall is the median of all measurable face thicknesses. Ribs
/// and bosses thicker than `nominal * rib_boss_factor` cause sink marks on
/// the opposite surface of a molded part.
#[derive(Debug, Clone, Copy, Default)]
pub struct RibBossRule;

impl RibBossRule {
    /// Rule id.
    pub const ID: &'static str = "rib_boss";
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

impl Rule for RibBossRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn requirements(&self) -> Requirements {
        Requirements::none()
            .manifold()
            .process(ProcessKind::InjectionMolding)
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Evaluation, RuleError> {
        let thickness = ctx.wall_thickness();
        let mut measured: Vec<f64> = thickness.iter().flatten().copied().collect();
        let Some(nominal) = median(&mut measured) else {
            return Ok(Evaluation::default());
        };
        let limit = nominal * ctx.rib_boss_factor();
        let eps = ctx.epsilon();
        let units = ctx.units().symbol();

        let findings = thickness
            .iter()
            .enumerate()
            .filter_map(|(face, t)| {
                let t = (*t)?;
                (t > limit + eps).then(|| {
                    Finding::new(
                        Self::ID,
                        FindingCode::OverThickRegion,
                        Severity::Warning,
                        format!(
                            "wall thickness {t:.3} {units} exceeds {limit:.3} {units} \
                             ({:.2}x the nominal {nominal:.3} {units})",
                            ctx.rib_boss_factor()
                        ),
                    )
                    .with_faces(vec![face as u32])
                    .with_measurement(t, limit)
                })
            })
            .collect();

        Ok(Evaluation::from_findings(findings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{molding_z, with_context};
    use approx::assert_relative_eq;
    use dfm_math::Point3;
    use dfm_mesh::{box_geometry, cube_geometry, RawMesh};

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_uniform_cube_is_clean() {
        let eval = with_context(cube_geometry(1.0), &molding_z(), |ctx| {
            RibBossRule.evaluate(ctx).unwrap()
        });
        assert!(eval.findings.is_empty());
    }

    #[test]
    fn test_thick_block_among_thin_walls() {
        // Three separate unit cubes and one 4 mm block: nominal wall is 1.
        let mut raw = RawMesh::new();
        for i in 0..3 {
            let x = i as f64 * 3.0;
            raw.append(&box_geometry(
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + 1.0, 1.0, 1.0),
            ));
        }
        raw.append(&box_geometry(
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(14.0, 4.0, 4.0),
        ));
        let eval = with_context(raw, &molding_z(), |ctx| RibBossRule.evaluate(ctx).unwrap());

        assert!(!eval.findings.is_empty());
        for finding in &eval.findings {
            assert_eq!(finding.code, FindingCode::OverThickRegion);
            assert!(finding.faces[0] >= 36, "thin face {:?} flagged", finding.faces);
            assert_relative_eq!(finding.value.unwrap(), 4.0, epsilon = 1e-9);
        }
        // Every face of the block.
        assert_eq!(eval.findings.len(), 12);
    }
}
