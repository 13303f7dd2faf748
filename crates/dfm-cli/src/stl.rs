//! STL loading into a raw indexed mesh.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use anyhow::{Context, Result};
use dfm::RawMesh;
use tracing::debug;

/// Read an ASCII or binary STL file.
///
/// `stl_io` merges bitwise-equal corner positions into shared vertices,
/// which is what gives the analysis its edge connectivity. Triangles that
/// collapse onto a repeated vertex are dropped.
pub fn load_stl(path: &Path) -> Result<RawMesh> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    read_stl(&mut reader).with_context(|| format!("failed to read STL from {}", path.display()))
}

/// Read STL data from any seekable source.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> Result<RawMesh> {
    let stl = stl_io::read_stl(reader)?;
    debug!(
        vertices = stl.vertices.len(),
        triangles = stl.faces.len(),
        "parsed STL"
    );

    let vertices = stl
        .vertices
        .iter()
        .map(|v| [v.0[0] as f64, v.0[1] as f64, v.0[2] as f64])
        .collect();

    let mut faces = Vec::with_capacity(stl.faces.len());
    for tri in &stl.faces {
        let [a, b, c] = tri.vertices;
        if a == b || b == c || a == c {
            continue;
        }
        faces.push([a as u32, b as u32, c as u32]);
    }
    let dropped = stl.faces.len() - faces.len();
    if dropped > 0 {
        debug!(dropped, "skipped collapsed triangles");
    }

    Ok(RawMesh { vertices, faces })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dfm::dfm_math::Point3;
    use std::io::{Cursor, Write};

    /// ASCII STL of an axis-aligned box with the given corners.
    pub(crate) fn box_stl(min: [f64; 3], max: [f64; 3]) -> String {
        mesh_stl(&dfm::box_geometry(Point3::from(min), Point3::from(max)))
    }

    pub(crate) fn mesh_stl(raw: &RawMesh) -> String {
        let mut out = String::from("solid box\n");
        for face in &raw.faces {
            out.push_str("  facet normal 0 0 0\n    outer loop\n");
            for &i in face {
                let [x, y, z] = raw.vertices[i as usize];
                out.push_str(&format!("      vertex {x} {y} {z}\n"));
            }
            out.push_str("    endloop\n  endfacet\n");
        }
        out.push_str("endsolid box\n");
        out
    }

    #[test]
    fn test_ascii_cube_is_welded() {
        let text = box_stl([0.0; 3], [2.0; 3]);
        let raw = read_stl(&mut Cursor::new(text.into_bytes())).unwrap();
        assert_eq!(raw.vertices.len(), 8);
        assert_eq!(raw.faces.len(), 12);
        let mesh = raw.into_model().unwrap();
        assert!(mesh.is_closed_manifold());
        assert!(mesh.is_consistently_oriented());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".stl").tempfile().unwrap();
        file.write_all(box_stl([0.0; 3], [1.0, 2.0, 3.0]).as_bytes())
            .unwrap();
        let raw = load_stl(file.path()).unwrap();
        assert_eq!(raw.faces.len(), 12);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_stl(Path::new("/nonexistent/part.stl")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to open"));
    }

    #[test]
    fn test_collapsed_triangle_is_dropped() {
        let text = "solid t\n\
            facet normal 0 0 1\n outer loop\n\
            vertex 0 0 0\n vertex 1 0 0\n vertex 0 1 0\n\
            endloop\n endfacet\n\
            facet normal 0 0 1\n outer loop\n\
            vertex 0 0 0\n vertex 0 0 0\n vertex 1 0 0\n\
            endloop\n endfacet\n\
            endsolid t\n";
        let raw = read_stl(&mut Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(raw.faces.len(), 1);
    }
}
