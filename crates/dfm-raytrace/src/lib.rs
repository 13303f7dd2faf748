#![warn(missing_docs)]

//! Ray queries against triangle meshes.
//!
//! [`SpatialIndex`] is a bounding volume hierarchy over the faces of a
//! [`MeshModel`](dfm_mesh::MeshModel). It answers the ray casts used by the
//! wall thickness and undercut rules, with hits sorted closest first and
//! coincident hits on shared edges merged.
//!
//! # Example
//!
//! ```
//! use dfm_math::{Point3, Vec3};
//! use dfm_mesh::cube_geometry;
//! use dfm_raytrace::SpatialIndex;
//!
//! let mesh = cube_geometry(2.0).into_model().unwrap();
//! let index = SpatialIndex::build(&mesh);
//! let hits = index.cast_ray(Point3::new(0.5, 1.5, -1.0), Vec3::z());
//! assert_eq!(hits.len(), 2);
//! assert!(index.contains_point(Point3::new(1.0, 1.0, 1.0)));
//! ```

mod bvh;
mod ray;

pub use bvh::{SpatialIndex, LEAF_SIZE};
pub use ray::{Ray, RayHit};
