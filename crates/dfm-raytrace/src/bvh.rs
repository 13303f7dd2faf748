//! Bounding Volume Hierarchy over mesh faces.
//!
//! Built with a median split on the longest axis of each node, so the tree
//! depth is `O(log F)` for any face distribution. Leaves hold at most
//! [`LEAF_SIZE`] faces.

use std::cmp::Ordering;

use dfm_math::{Aabb3, Point3, Tolerance, Vec3};
use dfm_mesh::MeshModel;
use tracing::debug;

use crate::ray::{Ray, RayHit};

/// Maximum number of faces stored in a leaf.
pub const LEAF_SIZE: usize = 4;

/// Fixed oblique direction for parity tests, chosen off every axis and
/// diagonal so that it rarely grazes edges of axis-aligned geometry.
const PARITY_DIRECTION: [f64; 3] = [0.5773, 0.5774, 0.5775];

/// Hierarchy node: a leaf owns face ids, an internal node two children.
#[derive(Debug, Clone)]
enum BvhNode {
    Leaf {
        aabb: Aabb3,
        faces: Vec<u32>,
    },
    Internal {
        aabb: Aabb3,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn aabb(&self) -> &Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Internal { aabb, .. } => aabb,
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn collect_faces(&self, out: &mut Vec<u32>) {
        match self {
            BvhNode::Leaf { faces, .. } => out.extend_from_slice(faces),
            BvhNode::Internal { left, right, .. } => {
                left.collect_faces(out);
                right.collect_faces(out);
            }
        }
    }
}

/// Read-only acceleration structure answering ray queries against a mesh.
///
/// The index borrows the mesh it was built from and can be shared across
/// threads; every query is `&self`.
#[derive(Debug, Clone)]
pub struct SpatialIndex<'m> {
    mesh: &'m MeshModel,
    root: Option<BvhNode>,
    epsilon: f64,
}

impl<'m> SpatialIndex<'m> {
    /// Build the index for `mesh`.
    pub fn build(mesh: &'m MeshModel) -> Self {
        let epsilon = Tolerance::for_scale(mesh.bounding_box().diagonal()).linear;

        let mut face_data: Vec<(u32, Aabb3, Point3)> = (0..mesh.face_count())
            .map(|i| {
                let tri = mesh.face_vertices(i);
                let mut aabb = Aabb3::from_points(tri.iter());
                aabb.expand(epsilon);
                (i as u32, aabb, mesh.face_centroid(i))
            })
            .collect();

        let root = if face_data.is_empty() {
            None
        } else {
            Some(build_node(&mut face_data))
        };

        let index = Self {
            mesh,
            root,
            epsilon,
        };
        debug!(
            faces = mesh.face_count(),
            depth = index.depth(),
            epsilon,
            "built spatial index"
        );
        index
    }

    /// The mesh this index was built from.
    pub fn mesh(&self) -> &'m MeshModel {
        self.mesh
    }

    /// Distance below which hits are ignored (at the origin) or merged
    /// (coincident hits on faces sharing an edge or vertex).
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of levels in the tree, counting the root.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, BvhNode::depth)
    }

    /// All face indices stored in the leaves, in leaf order.
    pub fn leaf_faces(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.mesh.face_count());
        if let Some(root) = &self.root {
            root.collect_faces(&mut out);
        }
        out
    }

    /// Every face crossed by the ray, closest first.
    ///
    /// Hits within [`epsilon`](Self::epsilon) of the origin are ignored.
    /// Hits within `epsilon` of the previous reported hit are merged, keeping
    /// the first in `(distance, face)` order, so a ray through a shared edge
    /// reports one hit and a near-coincident pair reports the nearer face.
    /// A zero or non-finite direction yields no hits.
    pub fn cast_ray(&self, origin: Point3, direction: Vec3) -> Vec<RayHit> {
        self.collect_hits(origin, direction, None)
    }

    /// Like [`cast_ray`](Self::cast_ray), skipping `exclude` (usually the
    /// face the ray starts on).
    pub fn cast_ray_excluding(&self, origin: Point3, direction: Vec3, exclude: u32) -> Vec<RayHit> {
        self.collect_hits(origin, direction, Some(exclude))
    }

    /// The first hit along the ray, skipping `exclude` if given.
    ///
    /// Equal to the first element of [`cast_ray`](Self::cast_ray) but prunes
    /// subtrees beyond the closest hit found so far.
    pub fn closest_hit(
        &self,
        origin: Point3,
        direction: Vec3,
        exclude: Option<u32>,
    ) -> Option<RayHit> {
        let ray = Ray::new(origin, direction)?;
        let mut closest: Option<RayHit> = None;
        if let Some(root) = &self.root {
            self.trace_node_closest(&ray, root, exclude, &mut closest);
        }
        closest
    }

    /// Number of distinct surface crossings along the ray.
    pub fn count_crossings(&self, origin: Point3, direction: Vec3) -> usize {
        self.cast_ray(origin, direction).len()
    }

    /// Parity test for a point against a closed shell.
    ///
    /// Only meaningful when the mesh is a closed manifold.
    pub fn contains_point(&self, point: Point3) -> bool {
        let [x, y, z] = PARITY_DIRECTION;
        self.count_crossings(point, Vec3::new(x, y, z)) % 2 == 1
    }

    fn collect_hits(&self, origin: Point3, direction: Vec3, exclude: Option<u32>) -> Vec<RayHit> {
        let Some(ray) = Ray::new(origin, direction) else {
            return Vec::new();
        };

        let mut hits = Vec::new();
        if let Some(root) = &self.root {
            self.trace_node(&ray, root, exclude, &mut hits);
        }

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.face.cmp(&b.face))
        });

        let mut merged: Vec<RayHit> = Vec::with_capacity(hits.len());
        for hit in hits {
            match merged.last() {
                Some(last) if hit.distance - last.distance <= self.epsilon => {}
                _ => merged.push(hit),
            }
        }
        merged
    }

    fn trace_node(&self, ray: &Ray, node: &BvhNode, exclude: Option<u32>, hits: &mut Vec<RayHit>) {
        if ray.intersect_aabb(node.aabb()).is_none() {
            return;
        }
        match node {
            BvhNode::Leaf { faces, .. } => {
                for &face in faces {
                    if Some(face) == exclude {
                        continue;
                    }
                    if let Some(hit) = self.test_face(ray, face) {
                        hits.push(hit);
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                self.trace_node(ray, left, exclude, hits);
                self.trace_node(ray, right, exclude, hits);
            }
        }
    }

    fn trace_node_closest(
        &self,
        ray: &Ray,
        node: &BvhNode,
        exclude: Option<u32>,
        closest: &mut Option<RayHit>,
    ) {
        let Some((t_min, _)) = ray.intersect_aabb(node.aabb()) else {
            return;
        };
        // Strict comparison keeps equal-distance subtrees so the lower
        // face index can still win the tie.
        if closest.is_some_and(|c| t_min > c.distance) {
            return;
        }

        match node {
            BvhNode::Leaf { faces, .. } => {
                for &face in faces {
                    if Some(face) == exclude {
                        continue;
                    }
                    if let Some(hit) = self.test_face(ray, face) {
                        let better = match closest {
                            None => true,
                            Some(c) => {
                                hit.distance < c.distance
                                    || (hit.distance == c.distance && hit.face < c.face)
                            }
                        };
                        if better {
                            *closest = Some(hit);
                        }
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                // Nearer box first so the farther one can be pruned.
                let left_t = ray.intersect_aabb(left.aabb()).map(|(t, _)| t);
                let right_t = ray.intersect_aabb(right.aabb()).map(|(t, _)| t);

                match (left_t, right_t) {
                    (Some(lt), Some(rt)) if rt < lt => {
                        self.trace_node_closest(ray, right, exclude, closest);
                        self.trace_node_closest(ray, left, exclude, closest);
                    }
                    (Some(_), Some(_)) => {
                        self.trace_node_closest(ray, left, exclude, closest);
                        self.trace_node_closest(ray, right, exclude, closest);
                    }
                    (Some(_), None) => self.trace_node_closest(ray, left, exclude, closest),
                    (None, Some(_)) => self.trace_node_closest(ray, right, exclude, closest),
                    (None, None) => {}
                }
            }
        }
    }

    fn test_face(&self, ray: &Ray, face: u32) -> Option<RayHit> {
        let tri = self.mesh.face_vertices(face as usize);
        let t = ray.intersect_triangle(&tri)?;
        (t > self.epsilon).then(|| RayHit {
            face,
            distance: t,
            point: ray.at(t),
        })
    }
}

/// Build a BVH node recursively by median split on the longest axis.
fn build_node(face_data: &mut [(u32, Aabb3, Point3)]) -> BvhNode {
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in face_data.iter() {
        bounds.include_aabb(aabb);
    }

    if face_data.len() <= LEAF_SIZE {
        return BvhNode::Leaf {
            aabb: bounds,
            faces: face_data.iter().map(|(id, _, _)| *id).collect(),
        };
    }

    let axis = bounds.longest_axis();
    let mid = face_data.len() / 2;
    face_data.select_nth_unstable_by(mid, |a, b| {
        a.2.coords[axis]
            .partial_cmp(&b.2.coords[axis])
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let (left_data, right_data) = face_data.split_at_mut(mid);
    BvhNode::Internal {
        aabb: bounds,
        left: Box::new(build_node(left_data)),
        right: Box::new(build_node(right_data)),
    }
}
