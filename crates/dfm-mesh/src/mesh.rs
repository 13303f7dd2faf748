//! The immutable mesh model.

use dfm_math::{Aabb3, Point3, Vec3};
use tracing::debug;

use crate::error::{Malformation, MeshError, Result};
use crate::topology::{Edge, Topology, TopologySummary};

/// A triangulated boundary surface with cached derived data.
///
/// Built once from raw vertex and face arrays; every query afterwards is a
/// read of precomputed data. The model is never mutated: to analyse changed
/// geometry, build a new one.
#[derive(Debug, Clone)]
pub struct MeshModel {
    vertices: Vec<Point3>,
    faces: Vec<[u32; 3]>,
    face_normals: Vec<Vec3>,
    face_areas: Vec<f64>,
    face_centroids: Vec<Point3>,
    vertex_normals: Vec<Vec3>,
    topology: Topology,
    bounds: Aabb3,
}

impl MeshModel {
    /// Build a mesh from vertex positions and triangle indices.
    ///
    /// Fails with [`MeshError::MalformedGeometry`] if a coordinate is not
    /// finite, an index is out of range, a triangle has zero area, or there
    /// are no faces. Open or non-manifold shells build successfully.
    pub fn build(vertices: Vec<[f64; 3]>, faces: Vec<[u32; 3]>) -> Result<Self> {
        let points = vertices
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect();
        Self::from_points(points, faces)
    }

    /// Build a mesh from flat buffers: `[x0, y0, z0, x1, ...]` and `[i0, i1, i2, ...]`.
    pub fn from_flat(positions: &[f64], indices: &[u32]) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(Malformation::FlatBufferLength {
                buffer: "positions",
                len: positions.len(),
            }
            .into());
        }
        if indices.len() % 3 != 0 {
            return Err(Malformation::FlatBufferLength {
                buffer: "indices",
                len: indices.len(),
            }
            .into());
        }
        let points = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let faces = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Self::from_points(points, faces)
    }

    /// Build a mesh from already-typed points.
    pub fn from_points(vertices: Vec<Point3>, faces: Vec<[u32; 3]>) -> Result<Self> {
        if faces.is_empty() {
            return Err(Malformation::NoFaces.into());
        }

        if let Some(vertex) = vertices
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(Malformation::NonFiniteCoordinate { vertex }.into());
        }

        let vertex_count = vertices.len();
        for (face, tri) in faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Malformation::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                }
                .into());
            }
        }

        let mut face_normals = Vec::with_capacity(faces.len());
        let mut face_areas = Vec::with_capacity(faces.len());
        let mut face_centroids = Vec::with_capacity(faces.len());
        let mut vertex_accum = vec![Vec3::zeros(); vertex_count];

        for (face, tri) in faces.iter().enumerate() {
            let [a, b, c] = tri.map(|i| vertices[i as usize]);
            let e1 = b - a;
            let e2 = c - a;
            let cross = e1.cross(&e2);
            let twice_area = cross.norm();

            // Relative test so that scale does not decide degeneracy.
            let longest = e1
                .norm_squared()
                .max(e2.norm_squared())
                .max((c - b).norm_squared());
            if tri[0] == tri[1]
                || tri[1] == tri[2]
                || tri[0] == tri[2]
                || twice_area <= f64::EPSILON * longest
            {
                return Err(Malformation::DegenerateFace { face }.into());
            }

            // Area weighting falls out of the unnormalized cross product.
            for &i in tri {
                vertex_accum[i as usize] += cross;
            }

            face_normals.push(cross / twice_area);
            face_areas.push(0.5 * twice_area);
            face_centroids.push(Point3::from((a.coords + b.coords + c.coords) / 3.0));
        }

        let vertex_normals = vertex_accum
            .into_iter()
            .map(|n| {
                let len = n.norm();
                if len > 0.0 {
                    n / len
                } else {
                    Vec3::zeros()
                }
            })
            .collect();

        let topology = Topology::build(vertex_count, &faces);
        let bounds = Aabb3::from_points(vertices.iter());

        debug!(
            vertices = vertex_count,
            faces = faces.len(),
            edges = topology.summary.edge_count,
            boundary_edges = topology.summary.boundary_edges,
            non_manifold_edges = topology.summary.non_manifold_edges,
            "Built mesh model"
        );

        Ok(Self {
            vertices,
            faces,
            face_normals,
            face_areas,
            face_centroids,
            vertex_normals,
            topology,
            bounds,
        })
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// All vertex positions.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// All faces as vertex index triples.
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Position of vertex `i`.
    pub fn vertex(&self, i: usize) -> Point3 {
        self.vertices[i]
    }

    /// Vertex index triple of face `i`.
    pub fn face(&self, i: usize) -> [u32; 3] {
        self.faces[i]
    }

    /// Corner positions of face `i`.
    pub fn face_vertices(&self, i: usize) -> [Point3; 3] {
        self.faces[i].map(|v| self.vertices[v as usize])
    }

    /// Outward unit normal of face `i`, from its winding.
    pub fn face_normal(&self, i: usize) -> Vec3 {
        self.face_normals[i]
    }

    /// Area of face `i`.
    pub fn face_area(&self, i: usize) -> f64 {
        self.face_areas[i]
    }

    /// Centroid of face `i`.
    pub fn face_centroid(&self, i: usize) -> Point3 {
        self.face_centroids[i]
    }

    /// Area-weighted average of the normals of faces incident to vertex `i`.
    ///
    /// Zero for a vertex no face references, or where incident normals cancel.
    pub fn vertex_normal(&self, i: usize) -> Vec3 {
        self.vertex_normals[i]
    }

    /// Faces sharing at least one edge with face `i`, ascending.
    pub fn adjacent_faces(&self, i: usize) -> &[u32] {
        &self.topology.face_neighbors[i]
    }

    /// Edge handles of face `i`, in winding order (`v0v1`, `v1v2`, `v2v0`).
    pub fn face_edges(&self, i: usize) -> [u32; 3] {
        self.topology.face_edges[i]
    }

    /// Undirected edge table in first-seen order.
    pub fn edges(&self) -> &[Edge] {
        &self.topology.edges
    }

    /// Edge with handle `i`.
    pub fn edge(&self, i: usize) -> &Edge {
        &self.topology.edges[i]
    }

    /// Topology counts computed at build time.
    pub fn topology(&self) -> TopologySummary {
        self.topology.summary
    }

    /// Every edge is shared by exactly two faces (no holes, no fins).
    pub fn is_closed_manifold(&self) -> bool {
        self.topology.summary.is_closed_manifold()
    }

    /// Every manifold edge is traversed once in each direction.
    pub fn is_consistently_oriented(&self) -> bool {
        self.topology.summary.is_consistently_oriented()
    }

    /// Number of edges used by a single face.
    pub fn boundary_edge_count(&self) -> usize {
        self.topology.summary.boundary_edges
    }

    /// Number of edges used by three or more faces.
    pub fn non_manifold_edge_count(&self) -> usize {
        self.topology.summary.non_manifold_edges
    }

    /// Axis-aligned bounds of all vertices.
    pub fn bounding_box(&self) -> Aabb3 {
        self.bounds
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        self.face_areas.iter().sum()
    }

    /// Signed enclosed volume (divergence theorem). Positive for a closed,
    /// outward-wound shell; meaningless for open shells.
    pub fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|tri| {
                let [a, b, c] = tri.map(|i| self.vertices[i as usize].coords);
                a.dot(&b.cross(&c))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Vertex opposite edge `edge` in face `face`, if the face uses that edge.
    pub fn opposite_vertex(&self, face: usize, edge: usize) -> Option<u32> {
        let [a, b] = self.topology.edges[edge].vertices;
        self.faces[face]
            .iter()
            .copied()
            .find(|&v| v != a && v != b)
            .filter(|_| self.faces[face].contains(&a) && self.faces[face].contains(&b))
    }
}
