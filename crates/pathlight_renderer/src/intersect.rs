//! Closed-form primitive intersection: ray/sphere and the linear-scan
//! form of ray/triangle-range queries.

use pathlight_math::{Ray, Vec3};

use crate::triangle::Triangle;

/// Discriminant epsilon below which a quadratic is treated as tangent.
const DISCRIMINANT_EPS: f32 = 1e-50;

/// Smallest non-negative solution of `a t^2 + b t + c = 0`.
///
/// A discriminant within a tiny epsilon of zero collapses to the single
/// tangent root `-b / 2a`. Returns None when the discriminant is
/// negative or both roots are.
pub fn smallest_positive_root(a: f32, b: f32, c: f32) -> Option<f32> {
    let delta = b * b - 4.0 * a * c;
    if delta < -DISCRIMINANT_EPS {
        return None;
    }

    if delta < DISCRIMINANT_EPS {
        let t = -b / (2.0 * a);
        return (t >= 0.0).then_some(t);
    }

    let sqrt_delta = delta.sqrt();
    let t1 = (-b - sqrt_delta) / (2.0 * a);
    let t2 = (-b + sqrt_delta) / (2.0 * a);

    if t1 < 0.0 {
        (t2 >= 0.0).then_some(t2)
    } else {
        Some(t1.min(t2))
    }
}

/// A sphere, used here as a bounding volume primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Distance along the ray to the nearest sphere hit, or infinity.
    pub fn hit_t(&self, ray: &Ray) -> f32 {
        let dif = ray.origin - self.center;

        let a = ray.direction.dot(ray.direction);
        let b = 2.0 * dif.dot(ray.direction);
        let c = dif.dot(dif) - self.radius * self.radius;

        match smallest_positive_root(a, b, c) {
            Some(t) if t >= DISCRIMINANT_EPS => t,
            _ => f32::INFINITY,
        }
    }
}

/// Result of scanning a triangle range: distance, barycentrics and the
/// arena index of the winning triangle. `t == INFINITY` means no hit,
/// and compares larger than any finite hit in min folds.
#[derive(Debug, Clone, Copy)]
pub struct RangeHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
    pub index: usize,
}

impl RangeHit {
    pub const MISS: RangeHit = RangeHit {
        t: f32::INFINITY,
        u: 0.0,
        v: 0.0,
        index: usize::MAX,
    };

    pub fn is_hit(&self) -> bool {
        self.t < f32::INFINITY
    }
}

/// Linear scan over `triangles[start..end]`: the minimal intersection is
/// the smallest accepted t, first found wins ties. Indices in the result
/// are absolute arena indices.
pub fn closest_hit(ray: &Ray, triangles: &[Triangle], start: usize, end: usize) -> RangeHit {
    let mut best = RangeHit::MISS;
    for (index, tri) in triangles[start..end].iter().enumerate() {
        if let Some(hit) = tri.intersect(ray) {
            if hit.t < best.t {
                best = RangeHit {
                    t: hit.t,
                    u: hit.u,
                    v: hit.v,
                    index: start + index,
                };
            }
        }
    }
    best
}
