use glam::{Mat4, Vec3};

/// A ray in 3D space with origin and direction.
///
/// The direction is not required to be unit length on construction;
/// stages that need a normalized direction renormalize explicitly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Apply an affine transform to the ray.
    ///
    /// The origin transforms as a point (homogeneous w=1) and the
    /// direction as a vector (homogeneous w=0). The direction is NOT
    /// renormalized here; its transformed magnitude carries the scale
    /// of the matrix.
    pub fn transformed(&self, m: &Mat4) -> Ray {
        Ray {
            origin: m.transform_point3(self.origin),
            direction: m.transform_vector3(self.direction),
        }
    }
}
