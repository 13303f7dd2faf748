//! Shared fixtures for rule tests.

use dfm_mesh::{MeshModel, RawMesh};
use dfm_raytrace::SpatialIndex;

use crate::config::AnalysisConfig;
use crate::context::RuleContext;

/// Build mesh, index and context for `raw` and hand the context to `f`.
pub(crate) fn with_context<R>(
    raw: RawMesh,
    config: &AnalysisConfig,
    f: impl FnOnce(&RuleContext<'_>) -> R,
) -> R {
    let mesh: MeshModel = raw.into_model().unwrap();
    let index = SpatialIndex::build(&mesh);
    let ctx = RuleContext::build(&mesh, &index, config).unwrap();
    f(&ctx)
}

/// Injection molding along `+z`.
pub(crate) fn molding_z() -> AnalysisConfig {
    AnalysisConfig::molding([0.0, 0.0, 1.0])
}
