//! Whole-part thickness check.

use crate::context::RuleContext;
use crate::error::RuleError;
use crate::finding::{Finding, FindingCode, Severity};
use crate::rule::{Evaluation, Rule};

/// Flags parts whose smallest overall dimension is below the minimum wall
/// thickness.
///
/// Needs no ray casting, so it also gives a useful answer on open or
/// non-manifold meshes where [`ThicknessRule`](super::ThicknessRule) is
/// skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThinPartRule;

impl ThinPartRule {
    /// Rule id.
    pub const ID: &'static str = "thin_part";
}

impl Rule for ThinPartRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Evaluation, RuleError> {
        let Some(min) = ctx.min_wall_thickness() else {
            return Ok(Evaluation::default());
        };
        let extents = ctx.mesh().bounding_box().extents();
        let smallest = extents.x.min(extents.y).min(extents.z);
        if smallest >= min - ctx.epsilon() {
            return Ok(Evaluation::default());
        }

        let units = ctx.units().symbol();
        Ok(Evaluation::from_findings(vec![Finding::new(
            Self::ID,
            FindingCode::ThinPart,
            Severity::Warning,
            format!(
                "smallest part dimension {smallest:.3} {units} is below the minimum wall {min:.3} {units}"
            ),
        )
        .with_measurement(smallest, min)]))
    }
}
