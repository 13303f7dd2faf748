//! Rays and the two primitive intersection tests the index needs.

use dfm_math::{Aabb3, Dir3, Point3, Vec3};

/// Barycentric slack so a ray through a shared edge registers on both faces.
/// The duplicate is removed later by distance merging.
const BARY_SLACK: f64 = 1e-12;

/// Half-line from `origin` along a unit `direction`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Start point.
    pub origin: Point3,
    /// Unit direction.
    pub direction: Dir3,
    /// Per-axis `1 / direction`, infinite on axes the ray does not move along.
    reciprocal: Vec3,
}

impl Ray {
    /// Ray from `origin` along `direction`, normalised.
    ///
    /// `None` for a zero or non-finite direction.
    pub fn new(origin: Point3, direction: Vec3) -> Option<Self> {
        let len = direction.norm();
        if !len.is_finite() || len == 0.0 {
            return None;
        }
        let direction = Dir3::new_unchecked(direction / len);
        Some(Self {
            origin,
            direction,
            reciprocal: direction.map(f64::recip),
        })
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction.as_ref() * t
    }

    /// Parameter interval `(enter, exit)` over which the ray is inside
    /// `aabb`, clipped to `t >= 0`.
    ///
    /// Flat boxes (zero extent on one axis) are handled, which matters
    /// because every axis-aligned facet has one.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let mut enter = 0.0_f64;
        let mut exit = f64::INFINITY;
        for axis in 0..3 {
            let near = (aabb.min[axis] - self.origin[axis]) * self.reciprocal[axis];
            let far = (aabb.max[axis] - self.origin[axis]) * self.reciprocal[axis];
            // f64::min/max ignore the NaN from 0 * inf on a slab plane.
            enter = enter.max(near.min(far));
            exit = exit.min(near.max(far));
        }
        (enter <= exit).then_some((enter, exit))
    }

    /// Möller–Trumbore ray-triangle intersection.
    ///
    /// Returns the signed ray parameter, negative behind the origin. Rays
    /// lying in the triangle's plane never hit.
    pub fn intersect_triangle(&self, tri: &[Point3; 3]) -> Option<f64> {
        let d = self.direction.as_ref();
        let ab = tri[1] - tri[0];
        let ac = tri[2] - tri[0];

        let p = d.cross(&ac);
        let det = ab.dot(&p);
        if det.abs() <= 1e-12 * ab.norm() * ac.norm() {
            return None;
        }
        let inv_det = det.recip();

        let to_origin = self.origin - tri[0];
        let u = to_origin.dot(&p) * inv_det;
        if !(-BARY_SLACK..=1.0 + BARY_SLACK).contains(&u) {
            return None;
        }

        let q = to_origin.cross(&ab);
        let v = d.dot(&q) * inv_det;
        if v < -BARY_SLACK || u + v > 1.0 + BARY_SLACK {
            return None;
        }

        Some(ac.dot(&q) * inv_det)
    }
}

/// A ray-face intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Index of the face that was hit.
    pub face: u32,
    /// Distance along the (unit) ray direction.
    pub distance: f64,
    /// Intersection point.
    pub point: Point3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ray(o: [f64; 3], d: [f64; 3]) -> Ray {
        Ray::new(Point3::from(o), Vec3::from(d)).unwrap()
    }

    fn cell() -> Aabb3 {
        Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_direction_is_normalised() {
        let r = ray([1.0, 2.0, 3.0], [0.0, 4.0, 0.0]);
        assert_relative_eq!(r.direction.y, 1.0);
        assert_relative_eq!(r.at(2.5), Point3::new(1.0, 4.5, 3.0));
    }

    #[test]
    fn test_degenerate_direction() {
        assert!(Ray::new(Point3::origin(), Vec3::zeros()).is_none());
        assert!(Ray::new(Point3::origin(), Vec3::new(f64::NAN, 0.0, 1.0)).is_none());
        assert!(Ray::new(Point3::origin(), Vec3::new(f64::INFINITY, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_box_entry_and_exit() {
        let (enter, exit) = ray([0.5, -3.0, 0.5], [0.0, 1.0, 0.0])
            .intersect_aabb(&cell())
            .unwrap();
        assert_relative_eq!(enter, 3.0);
        assert_relative_eq!(exit, 4.0);
    }

    #[test]
    fn test_box_diagonal_entry() {
        let (enter, exit) = ray([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0])
            .intersect_aabb(&cell())
            .unwrap();
        assert_relative_eq!(enter, 3.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(exit, 2.0 * 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_box_passed_by_or_behind() {
        assert!(ray([0.5, -3.0, 2.0], [0.0, 1.0, 0.0])
            .intersect_aabb(&cell())
            .is_none());
        assert!(ray([0.5, -3.0, 0.5], [0.0, -1.0, 0.0])
            .intersect_aabb(&cell())
            .is_none());
    }

    #[test]
    fn test_origin_inside_box_enters_at_zero() {
        let (enter, exit) = ray([0.25, 0.5, 0.5], [-1.0, 0.0, 0.0])
            .intersect_aabb(&cell())
            .unwrap();
        assert_eq!(enter, 0.0);
        assert_relative_eq!(exit, 0.25);
    }

    #[test]
    fn test_flat_box() {
        let facet = Aabb3::new(Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 1.0, 1.0));
        let (enter, exit) = ray([0.5, 0.5, -1.0], [0.0, 0.0, 1.0])
            .intersect_aabb(&facet)
            .unwrap();
        assert_relative_eq!(enter, 2.0);
        assert_relative_eq!(exit, 2.0);
    }

    #[test]
    fn test_triangle_parameter_is_signed() {
        let tri = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let ahead = ray([0.2, 0.2, 0.0], [0.0, 0.0, 1.0]).intersect_triangle(&tri);
        assert_relative_eq!(ahead.unwrap(), 1.0, epsilon = 1e-12);

        let behind = ray([0.2, 0.2, 3.0], [0.0, 0.0, 1.0]).intersect_triangle(&tri);
        assert_relative_eq!(behind.unwrap(), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_triangle_outside_or_in_plane() {
        let tri = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        assert!(ray([0.9, 0.9, 0.0], [0.0, 0.0, 1.0])
            .intersect_triangle(&tri)
            .is_none());
        assert!(ray([0.2, 0.2, 1.0], [1.0, 0.0, 0.0])
            .intersect_triangle(&tri)
            .is_none());
    }

    #[test]
    fn test_triangle_edge_counts_as_hit() {
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        // Exactly on the hypotenuse.
        let t = ray([0.5, 0.5, -1.0], [0.0, 0.0, 1.0]).intersect_triangle(&tri);
        assert!(t.is_some());
    }
}
