//! Draft angle check for molded parts.

use dfm_math::Tolerance;
use rayon::prelude::*;

use crate::config::ProcessKind;
use crate::context::RuleContext;
use crate::error::RuleError;
use crate::finding::{Finding, FindingCode, Severity};
use crate::rule::{Evaluation, Requirements, Rule};

/// Flags faces whose draft relative to the pull direction is below the
/// configured threshold.
///
/// Draft is the angle between a facet and the pull direction,
/// `asin(|n · d|)`, so a face parallel to the pull has zero draft and a face
/// perpendicular to it has 90°. Faces below the parting-face tolerance are
/// taken to lie on the parting line and are exempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct DraftAngleRule;

impl DraftAngleRule {
    /// Rule id.
    pub const ID: &'static str = "draft_angle";
}

impl Rule for DraftAngleRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn requirements(&self) -> Requirements {
        Requirements::none().process(ProcessKind::InjectionMolding)
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Evaluation, RuleError> {
        let pull = ctx
            .pull_direction()
            .ok_or(RuleError::MissingParameter("pull_direction"))?;
        let mesh = ctx.mesh();
        let threshold = ctx.draft_threshold_degrees();
        let parting = ctx.parting_tolerance_degrees();
        let slack = Tolerance::DEFAULT.angular_deg;

        let findings = (0..mesh.face_count())
            .into_par_iter()
            .filter_map(|face| {
                let cos = mesh.face_normal(face).dot(pull.as_ref()).abs().min(1.0);
                let draft = cos.asin().to_degrees();
                if draft < parting || draft >= threshold - slack {
                    return None;
                }
                Some(
                    Finding::new(
                        Self::ID,
                        FindingCode::DraftAngle,
                        Severity::Warning,
                        format!("draft {draft:.2}° is below the minimum {threshold:.2}°"),
                    )
                    .with_faces(vec![face as u32])
                    .with_measurement(draft, threshold),
                )
            })
            .collect();

        Ok(Evaluation::from_findings(findings))
    }
}
