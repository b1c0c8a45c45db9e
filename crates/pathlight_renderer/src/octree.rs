//! Octree over a contiguous triangle range.
//!
//! Construction reorders the triangles of its range in place, so every
//! node owns an exact `[start, end)` window of the shared arena and no
//! triangle is ever referenced twice. Triangles straddling a splitting
//! plane stay in the upper partition, which keeps the tree lossless at
//! the cost of some unbalanced nodes.

use pathlight_math::{Aabb, Ray};

use crate::intersect::{self, RangeHit};
use crate::triangle::Triangle;

/// Subdivision levels below the root.
pub const DEFAULT_OCTREE_DEPTH: u32 = 4;

#[derive(Debug, Clone)]
pub struct Octree {
    start: usize,
    end: usize,
    bbox: Aabb,
    children: Vec<Octree>,
}

impl Octree {
    /// Build a tree over `triangles[start..end]`, subdividing `level`
    /// more times. Reorders that slice of the arena.
    pub fn build(triangles: &mut [Triangle], start: usize, end: usize, level: u32) -> Self {
        let bbox = Aabb::from_point_set(
            triangles[start..end]
                .iter()
                .flat_map(|tri| tri.positions()),
        );

        let mut node = Octree {
            start,
            end,
            bbox,
            children: Vec::new(),
        };
        // Recursion is bounded by the level countdown alone; occupancy
        // never cuts it short
        if level > 0 {
            node.split(triangles, start, end, 0, level);
        }
        node
    }

    /// Partition `[start, end)` around the node midpoint, one axis at a
    /// time. The x and y splits recurse to the next axis; the z split
    /// emits the up-to-eight octant children.
    fn split(&mut self, triangles: &mut [Triangle], start: usize, end: usize, axis: usize, level: u32) {
        let pivot = partition_in_place(triangles, start, end, axis, self.bbox.mid_point()[axis]);

        if axis < 2 {
            self.split(triangles, start, pivot, axis + 1, level);
            self.split(triangles, pivot, end, axis + 1, level);
        } else {
            self.add_child(triangles, start, pivot, level - 1);
            self.add_child(triangles, pivot, end, level - 1);
        }
    }

    fn add_child(&mut self, triangles: &mut [Triangle], start: usize, end: usize, level: u32) {
        if start < end {
            self.children.push(Octree::build(triangles, start, end, level));
        }
    }

    pub fn bbox(&self) -> &Aabb {
        &self.bbox
    }

    pub fn range(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Closest intersection within this node, pruned by the node box.
    /// Leaves fall back to the linear range scan.
    pub fn closest_hit(&self, ray: &Ray, triangles: &[Triangle]) -> RangeHit {
        if !self.bbox.intersects(ray) {
            return RangeHit::MISS;
        }

        if self.children.is_empty() {
            return intersect::closest_hit(ray, triangles, self.start, self.end);
        }

        self.children
            .iter()
            .map(|child| child.closest_hit(ray, triangles))
            .fold(RangeHit::MISS, |best, hit| {
                if hit.t < best.t {
                    hit
                } else {
                    best
                }
            })
    }

    #[cfg(test)]
    fn leaf_ranges(&self, out: &mut Vec<(usize, usize)>) {
        if self.children.is_empty() {
            out.push((self.start, self.end));
        } else {
            for child in &self.children {
                child.leaf_ranges(out);
            }
        }
    }
}

/// In-place partition: triangles entirely below `mid` on
/// `axis` move to the front of `[start, end)`. Returns the first index
/// of the upper partition.
fn partition_in_place(
    triangles: &mut [Triangle],
    start: usize,
    end: usize,
    axis: usize,
    mid: f32,
) -> usize {
    let mut pivot = start;
    for i in start..end {
        let below = triangles[i].positions().iter().all(|p| p[axis] < mid);
        if below {
            triangles.swap(pivot, i);
            pivot += 1;
        }
    }
    pivot
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathlight_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_triangles(seed: u64, count: usize) -> Vec<Triangle> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut point = |rng: &mut StdRng| {
            Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            )
        };
        (0..count)
            .map(|_| {
                let p0 = point(&mut rng);
                let p1 = p0 + 0.3 * point(&mut rng);
                let p2 = p0 + 0.3 * point(&mut rng);
                Triangle::from_positions(p0, p1, p2)
            })
            .collect()
    }

    #[test]
    fn test_matches_linear_scan() {
        let mut triangles = random_triangles(11, 300);
        let tree = Octree::build(&mut triangles, 0, 300, DEFAULT_OCTREE_DEPTH);

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let origin = Vec3::new(
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
            );
            let dir = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if dir.length() < 1e-3 {
                continue;
            }
            let ray = Ray::new(origin, dir);

            let linear = intersect::closest_hit(&ray, &triangles, 0, 300);
            let tree_hit = tree.closest_hit(&ray, &triangles);
            assert_eq!(linear.is_hit(), tree_hit.is_hit());
            if linear.is_hit() {
                assert!((linear.t - tree_hit.t).abs() < 1e-5);
                assert_eq!(linear.index, tree_hit.index);
            }
        }
    }

    #[test]
    fn test_leaves_cover_arena() {
        let mut triangles = random_triangles(5, 128);
        let tree = Octree::build(&mut triangles, 0, 128, DEFAULT_OCTREE_DEPTH);

        let mut ranges = Vec::new();
        tree.leaf_ranges(&mut ranges);
        ranges.sort();

        // Disjoint, contiguous, and covering [0, 128)
        let mut cursor = 0;
        for (start, end) in ranges {
            assert_eq!(start, cursor);
            assert!(end > start);
            cursor = end;
        }
        assert_eq!(cursor, 128);
    }

    #[test]
    fn test_zero_depth_is_linear() {
        let mut triangles = random_triangles(2, 40);
        let tree = Octree::build(&mut triangles, 0, 40, 0);

        assert_eq!(tree.range(), (0, 40));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), Vec3::new(0.0, 0.0, -1.0));
        let linear = intersect::closest_hit(&ray, &triangles, 0, 40);
        let tree_hit = tree.closest_hit(&ray, &triangles);
        assert_eq!(linear.is_hit(), tree_hit.is_hit());
    }

    #[test]
    fn test_single_triangle_subdivides_to_level_zero() {
        // One triangle never fits strictly below its own box midpoint,
        // so every level passes the full range down a chain of children
        let mut triangles = random_triangles(13, 1);
        let tree = Octree::build(&mut triangles, 0, 1, DEFAULT_OCTREE_DEPTH);

        let mut depth = 0;
        let mut node = &tree;
        while let Some(child) = node.children.first() {
            assert_eq!(node.children.len(), 1);
            assert_eq!(child.range(), (0, 1));
            node = child;
            depth += 1;
        }
        assert_eq!(depth, DEFAULT_OCTREE_DEPTH);

        let mut ranges = Vec::new();
        tree.leaf_ranges(&mut ranges);
        assert_eq!(ranges, vec![(0, 1)]);
    }

    #[test]
    fn test_subrange_build() {
        // A tree over the middle third leaves the rest untouched
        let mut triangles = random_triangles(8, 90);
        let before: Vec<[Vec3; 3]> = triangles.iter().map(|t| t.positions()).collect();

        let tree = Octree::build(&mut triangles, 30, 60, 2);
        assert_eq!(tree.range(), (30, 60));

        for i in (0..30).chain(60..90) {
            assert_eq!(triangles[i].positions(), before[i]);
        }
    }
}
