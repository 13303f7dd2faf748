//! dfm info command - mesh size and topology.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use dfm::MeshModel;
use serde::Serialize;

use crate::{stl, OutputFormat};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeshInfo {
    path: String,
    vertices: usize,
    faces: usize,
    edges: usize,
    boundary_edges: usize,
    non_manifold_edges: usize,
    inconsistent_edges: usize,
    closed_manifold: bool,
    euler_characteristic: i64,
    bounds: Bounds,
    surface_area: f64,
    volume: f64,
}

#[derive(Debug, Serialize)]
struct Bounds {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 3],
}

impl MeshInfo {
    fn collect(path: &Path, mesh: &MeshModel) -> Self {
        let topology = mesh.topology();
        let bbox = mesh.bounding_box();
        let dims = bbox.extents();
        Self {
            path: path.display().to_string(),
            vertices: topology.vertex_count,
            faces: topology.face_count,
            edges: topology.edge_count,
            boundary_edges: topology.boundary_edges,
            non_manifold_edges: topology.non_manifold_edges,
            inconsistent_edges: topology.inconsistent_edges,
            closed_manifold: topology.is_closed_manifold(),
            euler_characteristic: topology.euler_characteristic(),
            bounds: Bounds {
                min: bbox.min.coords.into(),
                max: bbox.max.coords.into(),
                dimensions: dims.into(),
            },
            surface_area: mesh.surface_area(),
            volume: mesh.signed_volume(),
        }
    }

    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        let [dx, dy, dz] = self.bounds.dimensions;
        writeln!(out, "Mesh: {}", self.path)?;
        writeln!(out, "  Vertices: {}", self.vertices)?;
        writeln!(out, "  Faces: {}", self.faces)?;
        writeln!(out, "  Edges: {}", self.edges)?;
        writeln!(out, "  Dimensions: {dx:.3} x {dy:.3} x {dz:.3}")?;
        writeln!(out, "  Surface area: {:.3}", self.surface_area)?;
        writeln!(out, "  Volume: {:.3}", self.volume)?;
        writeln!(out, "Topology:")?;
        writeln!(
            out,
            "  Closed manifold: {}",
            if self.closed_manifold { "yes" } else { "no" }
        )?;
        writeln!(out, "  Boundary edges: {}", self.boundary_edges)?;
        writeln!(out, "  Non-manifold edges: {}", self.non_manifold_edges)?;
        writeln!(out, "  Inconsistent edges: {}", self.inconsistent_edges)?;
        writeln!(out, "  Euler characteristic: {}", self.euler_characteristic)?;
        Ok(())
    }
}

pub fn run(input: &Path, format: OutputFormat) -> Result<()> {
    let mesh = stl::load_stl(input)?
        .into_model()
        .with_context(|| format!("invalid mesh in {}", input.display()))?;
    let info = MeshInfo::collect(input, &mesh);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?,
        OutputFormat::Text => info.render(&mut out)?,
    }
    Ok(())
}
