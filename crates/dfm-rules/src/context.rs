//! Per-run evaluation context shared by all rules.

use dfm_math::{Dir3, Vec3};
use dfm_mesh::MeshModel;
use dfm_raytrace::SpatialIndex;
use rayon::prelude::*;
use tracing::debug;

use crate::config::{AnalysisConfig, LengthUnit, ProcessKind};
use crate::error::{ConfigError, Result};

/// Ray origins are pushed off the surface by this multiple of the index
/// epsilon so a cast never re-hits its own face or a coplanar neighbour.
const RAY_OFFSET_FACTOR: f64 = 1e3;

/// Validated parameters plus borrowed geometry for one analysis run.
///
/// Built once, never mutated, and shared by reference across rules (and
/// threads). Derived per-face data that several rules need is computed
/// during [`build`](Self::build).
#[derive(Debug)]
pub struct RuleContext<'a> {
    mesh: &'a MeshModel,
    index: &'a SpatialIndex<'a>,
    config: AnalysisConfig,
    pull_direction: Option<Dir3>,
    ray_offset: f64,
    wall_thickness: Vec<Option<f64>>,
}

impl<'a> RuleContext<'a> {
    /// Validate `config` and bind it to a mesh and its spatial index.
    pub fn build(
        mesh: &'a MeshModel,
        index: &'a SpatialIndex<'a>,
        config: &AnalysisConfig,
    ) -> Result<Self> {
        config.validate()?;
        if !std::ptr::eq(index.mesh(), mesh) {
            return Err(ConfigError::invalid(
                "spatial index was built for a different mesh",
            ));
        }

        let pull_direction = config
            .pull_direction
            .map(|[x, y, z]| Dir3::new_normalize(Vec3::new(x, y, z)));
        let ray_offset = index.epsilon() * RAY_OFFSET_FACTOR;
        let wall_thickness: Vec<Option<f64>> = (0..mesh.face_count())
            .into_par_iter()
            .map(|face| measure_thickness(mesh, index, ray_offset, face))
            .collect();

        debug!(
            process = %config.process,
            faces = mesh.face_count(),
            ray_offset,
            unmeasured = wall_thickness.iter().filter(|t| t.is_none()).count(),
            "built rule context"
        );

        Ok(Self {
            mesh,
            index,
            config: config.clone(),
            pull_direction,
            ray_offset,
            wall_thickness,
        })
    }

    /// The mesh under analysis.
    pub fn mesh(&self) -> &'a MeshModel {
        self.mesh
    }

    /// Ray query index over [`mesh`](Self::mesh).
    pub fn index(&self) -> &'a SpatialIndex<'a> {
        self.index
    }

    /// The validated configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Target process.
    pub fn process(&self) -> ProcessKind {
        self.config.process
    }

    /// Normalised pull direction, if one was configured.
    pub fn pull_direction(&self) -> Option<Dir3> {
        self.pull_direction
    }

    /// Minimum acceptable draft (degrees).
    pub fn draft_threshold_degrees(&self) -> f64 {
        self.config.draft_angle_threshold_degrees
    }

    /// Draft below which a face counts as a parting face (degrees).
    pub fn parting_tolerance_degrees(&self) -> f64 {
        self.config.parting_face_tolerance_degrees
    }

    /// Minimum wall thickness.
    pub fn min_wall_thickness(&self) -> Option<f64> {
        self.config.min_wall_thickness
    }

    /// Maximum wall thickness.
    pub fn max_wall_thickness(&self) -> Option<f64> {
        self.config.max_wall_thickness
    }

    /// Minimum internal corner radius.
    pub fn min_corner_radius(&self) -> f64 {
        self.config.min_corner_radius
    }

    /// Rib/boss over-thickness factor.
    pub fn rib_boss_factor(&self) -> f64 {
        self.config.rib_boss_factor
    }

    /// Unit of the mesh coordinates.
    pub fn units(&self) -> LengthUnit {
        self.config.units
    }

    /// Millimeters per mesh unit.
    pub fn unit_scale(&self) -> f64 {
        self.config.units.millimeters_per_unit()
    }

    /// Distance by which ray origins are offset from the surface.
    pub fn ray_offset(&self) -> f64 {
        self.ray_offset
    }

    /// Linear tolerance for length comparisons.
    pub fn epsilon(&self) -> f64 {
        self.index.epsilon()
    }

    /// Wall thickness at every face, `None` where it cannot be measured.
    pub fn wall_thickness(&self) -> &[Option<f64>] {
        &self.wall_thickness
    }
}

/// Distance from a face to the first inward-opposing face along its
/// reversed normal.
fn measure_thickness(
    mesh: &MeshModel,
    index: &SpatialIndex<'_>,
    ray_offset: f64,
    face: usize,
) -> Option<f64> {
    let normal = mesh.face_normal(face);
    let origin = mesh.face_centroid(face) - normal * ray_offset;
    index
        .cast_ray_excluding(origin, -normal, face as u32)
        .into_iter()
        .find(|hit| mesh.face_normal(hit.face as usize).dot(&normal) < 0.0)
        .map(|hit| hit.distance + ray_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dfm_mesh::{box_geometry, cube_geometry, RawMesh};
    use dfm_math::Point3;

    #[test]
    fn test_build_normalises_pull() {
        let mesh = cube_geometry(1.0).into_model().unwrap();
        let index = SpatialIndex::build(&mesh);
        let config = AnalysisConfig::molding([0.0, 0.0, 5.0]);
        let ctx = RuleContext::build(&mesh, &index, &config).unwrap();
        let pull = ctx.pull_direction().unwrap();
        assert_relative_eq!(pull.z, 1.0);
        assert!(ctx.ray_offset() > ctx.epsilon());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mesh = cube_geometry(1.0).into_model().unwrap();
        let index = SpatialIndex::build(&mesh);
        let err = RuleContext::build(&mesh, &index, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_build_rejects_foreign_index() {
        let mesh = cube_geometry(1.0).into_model().unwrap();
        let other = cube_geometry(2.0).into_model().unwrap();
        let index = SpatialIndex::build(&other);
        let err = RuleContext::build(&mesh, &index, &AnalysisConfig::machining()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_cube_wall_thickness() {
        let mesh = cube_geometry(2.0).into_model().unwrap();
        let index = SpatialIndex::build(&mesh);
        let ctx = RuleContext::build(&mesh, &index, &AnalysisConfig::machining()).unwrap();
        let thickness = ctx.wall_thickness();
        assert_eq!(thickness.len(), 12);
        for t in thickness {
            assert_relative_eq!(t.unwrap(), 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_wall_thickness_shared_across_threads() {
        let mesh = cube_geometry(3.0).into_model().unwrap();
        let index = SpatialIndex::build(&mesh);
        let ctx = RuleContext::build(&mesh, &index, &AnalysisConfig::machining()).unwrap();
        let first = ctx.wall_thickness().as_ptr() as usize;
        // Readers on the pool see the table built up front, never a refill.
        let seen: Vec<(usize, bool)> = (0..32)
            .into_par_iter()
            .map(|_| {
                let table = ctx.wall_thickness();
                (table.len(), std::ptr::eq(table.as_ptr(), first as *const Option<f64>))
            })
            .collect();
        assert!(seen.iter().all(|&(len, same)| len == 12 && same));
    }

    #[test]
    fn test_open_mesh_has_unmeasurable_faces() {
        let mut raw = cube_geometry(1.0);
        // Drop the top cap so bottom rays escape.
        raw.faces.drain(2..4);
        let mesh = raw.into_model().unwrap();
        let index = SpatialIndex::build(&mesh);
        let ctx = RuleContext::build(&mesh, &index, &AnalysisConfig::machining()).unwrap();
        let thickness = ctx.wall_thickness();
        assert!(thickness[0].is_none());
        assert!(thickness[1].is_none());
    }

    #[test]
    fn test_thickness_of_separated_boxes() {
        let mut raw = RawMesh::new();
        raw.append(&box_geometry(Point3::origin(), Point3::new(4.0, 4.0, 0.5)));
        raw.append(&box_geometry(Point3::new(0.0, 0.0, 2.0), Point3::new(4.0, 4.0, 5.0)));
        let mesh = raw.into_model().unwrap();
        let index = SpatialIndex::build(&mesh);
        let ctx = RuleContext::build(&mesh, &index, &AnalysisConfig::machining()).unwrap();
        let thickness = ctx.wall_thickness();
        // Top of the thin slab measures the slab, not the gap above it.
        assert_relative_eq!(thickness[2].unwrap(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(thickness[14].unwrap(), 3.0, epsilon = 1e-9);
    }
}
