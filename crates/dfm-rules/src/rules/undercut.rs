//! Undercut detection for two-plate molds.

use dfm_math::Vec3;
use rayon::prelude::*;

use crate::config::ProcessKind;
use crate::context::RuleContext;
use crate::error::RuleError;
use crate::finding::{Finding, FindingCode, Severity};
use crate::rule::{Evaluation, Requirements, Rule};

/// Flags faces that neither mold half can release.
///
/// A face can be released along a direction when it does not face against
/// that direction and the first surface a ray meets travelling that way from
/// the face is not turned back towards it. Faces blocked along both `+pull`
/// and `-pull` are undercuts.
#[derive(Debug, Clone, Copy, Default)]
pub struct UndercutRule;

impl UndercutRule {
    /// Rule id.
    pub const ID: &'static str = "undercut";
}

/// Result of testing one face along one direction.
enum Release {
    Free,
    FacesAway,
    Blocked(f64),
}

fn release_along(ctx: &RuleContext<'_>, face: usize, dir: &Vec3) -> Release {
    let mesh = ctx.mesh();
    if mesh.face_normal(face).dot(dir) < 0.0 {
        return Release::FacesAway;
    }
    let offset = ctx.ray_offset();
    let origin = mesh.face_centroid(face) + dir * offset;
    match ctx.index().closest_hit(origin, *dir, Some(face as u32)) {
        Some(hit) if mesh.face_normal(hit.face as usize).dot(dir) < 0.0 => {
            Release::Blocked(hit.distance + offset)
        }
        _ => Release::Free,
    }
}

impl Rule for UndercutRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn requirements(&self) -> Requirements {
        Requirements::none()
            .manifold()
            .process(ProcessKind::InjectionMolding)
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Evaluation, RuleError> {
        let pull = ctx
            .pull_direction()
            .ok_or(RuleError::MissingParameter("pull_direction"))?
            .into_inner();
        let units = ctx.units().symbol();

        let findings = (0..ctx.mesh().face_count())
            .into_par_iter()
            .filter_map(|face| {
                let up = release_along(ctx, face, &pull);
                let down = release_along(ctx, face, &-pull);
                let blocked_at = match (up, down) {
                    (Release::Free, _) | (_, Release::Free) => return None,
                    (Release::Blocked(a), Release::Blocked(b)) => a.min(b),
                    (Release::Blocked(d), Release::FacesAway)
                    | (Release::FacesAway, Release::Blocked(d)) => d,
                    // A face cannot face away from both directions.
                    (Release::FacesAway, Release::FacesAway) => return None,
                };
                Some(
                    Finding::new(
                        Self::ID,
                        FindingCode::Undercut,
                        Severity::Error,
                        format!(
                            "face is shadowed along both pull directions \
                             (blocked {blocked_at:.3} {units} away)"
                        ),
                    )
                    .with_faces(vec![face as u32])
                    .with_value(blocked_at),
                )
            })
            .collect();

        Ok(Evaluation::from_findings(findings))
    }
}
