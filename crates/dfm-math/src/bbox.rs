//! Axis-aligned bounding boxes.
//!
//! Used for mesh extents and as the node volume of the face BVH.

use crate::{Point3, Vec3};

/// Axis-aligned box given by its two extreme corners.
///
/// [`Aabb3::empty`] is inverted (`min > max`) and acts as the identity for
/// [`include_point`](Aabb3::include_point) and
/// [`include_aabb`](Aabb3::include_aabb).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Lower corner.
    pub min: Point3,
    /// Upper corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Box with the given corners, taken as-is.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Box containing nothing.
    pub fn empty() -> Self {
        Self {
            min: Point3::from(Vec3::repeat(f64::INFINITY)),
            max: Point3::from(Vec3::repeat(f64::NEG_INFINITY)),
        }
    }

    /// Tightest box around `points`; empty if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        points.into_iter().fold(Self::empty(), |mut aabb, p| {
            aabb.include_point(p);
            aabb
        })
    }

    /// True if the box contains no point.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    /// Grow to contain `p`.
    pub fn include_point(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Grow to contain `other`.
    pub fn include_aabb(&mut self, other: &Aabb3) {
        if !other.is_empty() {
            self.include_point(&other.min);
            self.include_point(&other.max);
        }
    }

    /// Pad every face of the box outward by `margin`.
    pub fn expand(&mut self, margin: f64) {
        let pad = Vec3::repeat(margin);
        self.min -= pad;
        self.max += pad;
    }

    /// Side lengths; zero for an empty box.
    pub fn extents(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::zeros()
        } else {
            self.max - self.min
        }
    }

    /// Corner-to-corner length.
    pub fn diagonal(&self) -> f64 {
        self.extents().norm()
    }

    /// Axis (0 = x, 1 = y, 2 = z) with the largest extent; ties pick the
    /// lower axis.
    pub fn longest_axis(&self) -> usize {
        let e = self.extents();
        (1..3).fold(0, |best, axis| if e[axis] > e[best] { axis } else { best })
    }
}
