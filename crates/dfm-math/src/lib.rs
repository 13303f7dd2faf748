#![warn(missing_docs)]

//! Math types for the dfm manufacturability engine.
//!
//! nalgebra aliases for points, vectors and directions, the linear and
//! angular tolerances used by every comparison, and [`Aabb3`].

use nalgebra::{Unit, Vector3};

mod bbox;

pub use bbox::Aabb3;

/// Point in model space.
pub type Point3 = nalgebra::Point3<f64>;

/// Free vector in model space.
pub type Vec3 = Vector3<f64>;

/// Unit-length direction.
pub type Dir3 = Unit<Vector3<f64>>;

/// Comparison tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Length tolerance, mesh units.
    pub linear: f64,
    /// Angle tolerance, degrees.
    pub angular_deg: f64,
}

impl Tolerance {
    /// Absolute floor: 1e-9 linear, 1e-6° angular.
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        angular_deg: 1e-6,
    };

    /// Tolerances for a model whose bounding-box diagonal is `size`.
    ///
    /// Linear tolerance is relative (1e-9 of the size) but never below the
    /// absolute floor; a non-positive or non-finite size gets the floor.
    pub fn for_scale(size: f64) -> Self {
        let linear = if size.is_finite() && size > 0.0 {
            (size * 1e-9).max(Self::DEFAULT.linear)
        } else {
            Self::DEFAULT.linear
        };
        Self {
            linear,
            ..Self::DEFAULT
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tolerance_for_scale() {
        assert_relative_eq!(Tolerance::for_scale(1e6).linear, 1e-3);
        assert_eq!(Tolerance::for_scale(1.0), Tolerance::DEFAULT);
        assert_eq!(Tolerance::for_scale(f64::NAN), Tolerance::DEFAULT);
        assert_eq!(Tolerance::for_scale(-4.0), Tolerance::DEFAULT);
    }
}
