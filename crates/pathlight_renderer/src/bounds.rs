//! Conservative bounding volumes for whole-mesh ray rejection.
//!
//! A closed variant type instead of trait objects: the strategy is
//! picked once at scene setup and the per-ray test stays monomorphic.

use pathlight_math::{Aabb, Ray, Vec3};

use crate::intersect::Sphere;

/// Which bounding volume to build for a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsKind {
    /// No rejection test; every ray proceeds to the ranges
    None,
    Sphere,
    #[default]
    Box,
}

/// A conservative container built once from a mesh's vertex positions.
#[derive(Debug, Clone)]
pub enum BoundingVolume {
    /// Pass-through: always reports an intersection
    None,
    Sphere(Sphere),
    Box(Aabb),
}

impl BoundingVolume {
    /// Build the requested volume from a point set. An empty point set
    /// yields a volume that never intersects (except for `None`, which
    /// is pass-through by definition).
    pub fn build(kind: BoundsKind, points: &[Vec3]) -> Self {
        match kind {
            BoundsKind::None => BoundingVolume::None,
            BoundsKind::Sphere => BoundingVolume::Sphere(bounding_sphere(points)),
            BoundsKind::Box => BoundingVolume::Box(Aabb::from_point_set(points.iter().copied())),
        }
    }

    /// Cheap hit/no-hit rejection test.
    pub fn intersects(&self, ray: &Ray) -> bool {
        match self {
            BoundingVolume::None => true,
            BoundingVolume::Sphere(sphere) => {
                sphere.radius >= 0.0 && sphere.hit_t(ray) < f32::INFINITY
            }
            BoundingVolume::Box(aabb) => aabb.intersects(ray),
        }
    }
}

/// Bounding (not minimal-enclosing) sphere by the iterative
/// furthest-point heuristic: seed with the two mutually furthest points
/// from an arbitrary start, then grow the sphere minimally around each
/// remaining outlier until none are left.
///
/// An empty point set produces a negative radius, which never
/// intersects.
pub fn bounding_sphere(points: &[Vec3]) -> Sphere {
    let Some(&first) = points.first() else {
        return Sphere::new(Vec3::ZERO, -1.0);
    };

    let py = most_distant_point(points, first);
    let pz = most_distant_point(points, py);

    let mut sphere = Sphere::new(0.5 * (py + pz), 0.5 * (py - pz).length());

    let mut remaining: Vec<Vec3> = points.to_vec();
    while let Some(pos) = remaining
        .iter()
        .position(|p| (*p - sphere.center).length() > sphere.radius)
    {
        let p = remaining.swap_remove(pos);

        // Grow minimally: move the center toward p so the far side of
        // the old sphere stays on the surface
        let dist = (p - sphere.center).length();
        let t = (dist - sphere.radius) / (2.0 * dist);
        sphere.center = sphere.center.lerp(p, t);
        sphere.radius = (p - sphere.center).length();
    }

    sphere
}

fn most_distant_point(points: &[Vec3], reference: Vec3) -> Vec3 {
    points
        .iter()
        .copied()
        .max_by(|a, b| {
            (*a - reference)
                .length()
                .total_cmp(&(*b - reference).length())
        })
        .unwrap_or(reference)
}
