//! Raw vertex/face buffers and simple closed solids.
//!
//! [`RawMesh`] is the hand-off format between loaders and
//! [`MeshModel::build`]. The generators here produce outward-wound closed
//! shells and are used for fixtures and quick checks.

use dfm_math::Point3;

use crate::error::Result;
use crate::mesh::MeshModel;

/// Unvalidated vertex and face arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMesh {
    /// Vertex positions.
    pub vertices: Vec<[f64; 3]>,
    /// Triangles as vertex index triples.
    pub faces: Vec<[u32; 3]>,
}

impl RawMesh {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another buffer, offsetting its indices.
    pub fn append(&mut self, other: &RawMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces
            .extend(other.faces.iter().map(|f| f.map(|i| i + offset)));
    }

    /// Validate and build a [`MeshModel`].
    pub fn into_model(self) -> Result<MeshModel> {
        MeshModel::build(self.vertices, self.faces)
    }
}

/// Axis-aligned box from `min` to `max` (12 triangles).
///
/// Face order: bottom (0, 1), top (2, 3), front `-y` (4, 5), back `+y` (6, 7),
/// left `-x` (8, 9), right `+x` (10, 11).
pub fn box_geometry(min: Point3, max: Point3) -> RawMesh {
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);
    let vertices = vec![
        [x0, y0, z0],
        [x1, y0, z0],
        [x1, y1, z0],
        [x0, y1, z0],
        [x0, y0, z1],
        [x1, y0, z1],
        [x1, y1, z1],
        [x0, y1, z1],
    ];
    #[rustfmt::skip]
    let faces = vec![
        [0, 2, 1], [0, 3, 2],
        [4, 5, 6], [4, 6, 7],
        [0, 1, 5], [0, 5, 4],
        [2, 3, 7], [2, 7, 6],
        [0, 4, 7], [0, 7, 3],
        [1, 2, 6], [1, 6, 5],
    ];
    RawMesh { vertices, faces }
}

/// Cube with one corner at the origin and side length `size`.
pub fn cube_geometry(size: f64) -> RawMesh {
    box_geometry(Point3::origin(), Point3::new(size, size, size))
}

/// Straight extrusion of a counter-clockwise polygon from `z = 0` to `z = height`.
///
/// Caps are triangulated as a fan from `fan_apex`, which must see every other
/// polygon vertex (any vertex of a convex polygon, the reflex vertex of an L).
/// A polygon with fewer than three vertices gives an empty buffer.
pub fn prism_geometry(polygon: &[[f64; 2]], height: f64, fan_apex: usize) -> RawMesh {
    if polygon.len() < 3 {
        return RawMesh::new();
    }
    let n = polygon.len() as u32;
    let mut vertices = Vec::with_capacity(polygon.len() * 2);
    for &[x, y] in polygon {
        vertices.push([x, y, 0.0]);
    }
    for &[x, y] in polygon {
        vertices.push([x, y, height]);
    }

    let mut faces = Vec::with_capacity(polygon.len() * 4);
    let apex = fan_apex as u32 % n;
    for k in 1..n - 1 {
        let b = (apex + k) % n;
        let c = (apex + k + 1) % n;
        // Bottom faces down, top faces up.
        faces.push([apex, c, b]);
        faces.push([apex + n, b + n, c + n]);
    }
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push([i, j, j + n]);
        faces.push([i, j + n, i + n]);
    }

    RawMesh { vertices, faces }
}

/// L-shaped block: the 2x2 square with its `[1, 2] x [1, 2]` quadrant removed,
/// scaled by `size`, extruded to `height`. Has one concave vertical edge at
/// `(size, size)`.
pub fn l_block_geometry(size: f64, height: f64) -> RawMesh {
    let s = size;
    let polygon = [
        [0.0, 0.0],
        [2.0 * s, 0.0],
        [2.0 * s, s],
        [s, s],
        [s, 2.0 * s],
        [0.0, 2.0 * s],
    ];
    prism_geometry(&polygon, height, 3)
}
