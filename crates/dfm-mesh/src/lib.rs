#![warn(missing_docs)]

//! Immutable triangle mesh model for manufacturability analysis.
//!
//! A [`MeshModel`] is built once from raw vertex and face arrays. Building
//! validates the structure (finite coordinates, in-range indices, non-zero
//! triangle areas) and derives everything the analysis rules need:
//!
//! - per-face normals, areas and centroids
//! - area-weighted vertex normals
//! - an undirected edge table with the faces using each edge
//! - face adjacency and a [`TopologySummary`] (closed, manifold, oriented)
//!
//! Open or non-manifold shells are *not* construction errors; they build and
//! report their defects through [`MeshModel::topology`].
//!
//! # Example
//!
//! ```
//! use dfm_mesh::{cube_geometry, MeshModel};
//!
//! let raw = cube_geometry(10.0);
//! let mesh = MeshModel::build(raw.vertices, raw.faces).unwrap();
//! assert!(mesh.is_closed_manifold());
//! assert_eq!(mesh.adjacent_faces(0).len(), 3);
//! ```

mod error;
mod mesh;
mod primitives;
mod topology;

pub use error::{Malformation, MeshError, Result};
pub use mesh::MeshModel;
pub use primitives::{
    box_geometry, cube_geometry, l_block_geometry, prism_geometry, RawMesh,
};
pub use topology::{Edge, EdgeKind, TopologySummary};
