use crate::{Interval, Ray};
use glam::Vec3;

/// Axis-aligned bounding box used by the bounding volumes and the octree.
///
/// Defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// An empty box: contains nothing and intersects no ray.
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        }
    }

    /// Create an AABB enclosing a set of points.
    pub fn from_point_set<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.grow(p);
        }
        aabb
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Extend the box to include a point.
    pub fn grow(&mut self, p: Vec3) {
        self.x.grow(p.x);
        self.y.grow(p.y);
        self.z.grow(p.z);
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Minimum corner.
    pub fn min_corner(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max_corner(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Center of the box, the split point for octree subdivision.
    pub fn mid_point(&self) -> Vec3 {
        0.5 * (self.min_corner() + self.max_corner())
    }

    /// True if the box contains nothing.
    pub fn is_empty(&self) -> bool {
        self.x.min > self.x.max
    }

    /// Hit/no-hit predicate for a ray against the box.
    ///
    /// Tests each of the six face planes: axes whose direction component
    /// is near zero are skipped (parallel, cannot cross that face pair);
    /// otherwise the plane-crossing point is checked against the box
    /// extent on the two remaining axes. Any single face hit suffices.
    /// A ray starting inside the box always crosses a face, so this also
    /// reports hits from the interior.
    pub fn intersects(&self, ray: &Ray) -> bool {
        for corner in [self.min_corner(), self.max_corner()] {
            for i in 0..3 {
                if ray.direction[i].abs() < 1e-5 {
                    continue;
                }
                let t = (corner[i] - ray.origin[i]) / ray.direction[i];
                let p = ray.at(t);
                let j = (i + 1) % 3;
                let k = (i + 2) % 3;

                if self.axis_interval(j).contains(p[j]) && self.axis_interval(k).contains(p[k]) {
                    return true;
                }
            }
        }
        false
    }
}
