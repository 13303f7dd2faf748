//! Error types for mesh construction.

use thiserror::Error;

/// Errors raised while building a [`MeshModel`](crate::MeshModel).
///
/// Only structurally invalid input is rejected here. Non-manifold or open
/// topology is accepted and reported later by the topology rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The raw vertex/face data cannot describe a surface.
    #[error("malformed geometry: {0}")]
    MalformedGeometry(#[from] Malformation),
}

/// The specific structural defect behind [`MeshError::MalformedGeometry`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Malformation {
    /// The face list is empty.
    #[error("mesh has no faces")]
    NoFaces,

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Offending vertex index.
        vertex: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending face index.
        face: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face has zero area (repeated or collinear vertices).
    #[error("face {face} is degenerate (zero area)")]
    DegenerateFace {
        /// Offending face index.
        face: usize,
    },

    /// A flat buffer length is not a multiple of three.
    #[error("flat {buffer} buffer length {len} is not a multiple of 3")]
    FlatBufferLength {
        /// Which buffer (`positions` or `indices`).
        buffer: &'static str,
        /// The buffer length.
        len: usize,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
