//! Edge table and face adjacency.
//!
//! Edges are keyed by their undirected vertex pair. Faces and edges refer to
//! each other through integer handles only, so the cyclic face/edge graph is
//! stored without reference cycles.

use std::collections::HashMap;

/// Undirected edge between two vertices, stored with `vertices[0] < vertices[1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Endpoint vertex indices, smaller index first.
    pub vertices: [u32; 2],
    /// Faces using this edge, in ascending face order.
    pub faces: Vec<u32>,
    /// How many of those faces traverse the edge from `vertices[0]` to `vertices[1]`.
    forward_uses: u32,
}

impl Edge {
    /// Classification of this edge by the number of faces using it.
    pub fn kind(&self) -> EdgeKind {
        match self.faces.len() {
            1 => EdgeKind::Boundary,
            2 => EdgeKind::Manifold,
            _ => EdgeKind::NonManifold,
        }
    }

    /// For a manifold edge, whether the two faces traverse it in opposite
    /// directions. Always false for other edge kinds.
    pub fn is_consistently_oriented(&self) -> bool {
        self.faces.len() == 2 && self.forward_uses == 1
    }

    /// The two faces of a manifold edge.
    pub fn face_pair(&self) -> Option<(u32, u32)> {
        match self.faces.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }
}

/// How many faces share an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Used by exactly one face (hole in the shell).
    Boundary,
    /// Used by exactly two faces.
    Manifold,
    /// Used by three or more faces.
    NonManifold,
}

/// Summary of a mesh's topology, computed once at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologySummary {
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of faces.
    pub face_count: usize,
    /// Number of undirected edges.
    pub edge_count: usize,
    /// Edges used by exactly one face.
    pub boundary_edges: usize,
    /// Edges used by three or more faces.
    pub non_manifold_edges: usize,
    /// Manifold edges whose two faces traverse them in the same direction.
    pub inconsistent_edges: usize,
}

impl TopologySummary {
    /// Every edge is shared by exactly two faces.
    pub fn is_closed_manifold(&self) -> bool {
        self.boundary_edges == 0 && self.non_manifold_edges == 0
    }

    /// Every manifold edge is traversed once in each direction.
    pub fn is_consistently_oriented(&self) -> bool {
        self.inconsistent_edges == 0
    }

    /// Euler characteristic `V - E + F`.
    pub fn euler_characteristic(&self) -> i64 {
        self.vertex_count as i64 - self.edge_count as i64 + self.face_count as i64
    }
}

/// Derived connectivity of a face list.
#[derive(Debug, Clone)]
pub(crate) struct Topology {
    pub(crate) edges: Vec<Edge>,
    pub(crate) face_edges: Vec<[u32; 3]>,
    pub(crate) face_neighbors: Vec<Vec<u32>>,
    pub(crate) summary: TopologySummary,
}

impl Topology {
    /// Build the edge table. Edge order is first appearance while walking
    /// faces in index order, so it is stable for identical input.
    pub(crate) fn build(vertex_count: usize, faces: &[[u32; 3]]) -> Self {
        let mut lookup: HashMap<(u32, u32), u32> = HashMap::with_capacity(faces.len() * 3 / 2);
        let mut edges: Vec<Edge> = Vec::with_capacity(faces.len() * 3 / 2);
        let mut face_edges = Vec::with_capacity(faces.len());

        for (face_idx, face) in faces.iter().enumerate() {
            let mut ids = [0u32; 3];
            for k in 0..3 {
                let a = face[k];
                let b = face[(k + 1) % 3];
                let key = (a.min(b), a.max(b));
                let edge_id = *lookup.entry(key).or_insert_with(|| {
                    edges.push(Edge {
                        vertices: [key.0, key.1],
                        faces: Vec::with_capacity(2),
                        forward_uses: 0,
                    });
                    (edges.len() - 1) as u32
                });
                let edge = &mut edges[edge_id as usize];
                edge.faces.push(face_idx as u32);
                if a < b {
                    edge.forward_uses += 1;
                }
                ids[k] = edge_id;
            }
            face_edges.push(ids);
        }

        let face_neighbors = faces
            .iter()
            .enumerate()
            .map(|(face_idx, _)| {
                let mut neighbors: Vec<u32> = face_edges[face_idx]
                    .iter()
                    .flat_map(|&e| edges[e as usize].faces.iter().copied())
                    .filter(|&f| f as usize != face_idx)
                    .collect();
                neighbors.sort_unstable();
                neighbors.dedup();
                neighbors
            })
            .collect();

        let mut summary = TopologySummary {
            vertex_count,
            face_count: faces.len(),
            edge_count: edges.len(),
            boundary_edges: 0,
            non_manifold_edges: 0,
            inconsistent_edges: 0,
        };
        for edge in &edges {
            match edge.kind() {
                EdgeKind::Boundary => summary.boundary_edges += 1,
                EdgeKind::NonManifold => summary.non_manifold_edges += 1,
                EdgeKind::Manifold => {
                    if !edge.is_consistently_oriented() {
                        summary.inconsistent_edges += 1;
                    }
                }
            }
        }

        Self {
            edges,
            face_edges,
            face_neighbors,
            summary,
        }
    }
}
