//! Triangle primitive and the Möller-Trumbore intersection solver.

use glam::{Vec2, Vec3};
use pathlight_core::Vertex;
use pathlight_math::Ray;

/// Ray and triangle count as parallel below this determinant magnitude.
const DEGENERACY_EPS: f32 = 1e-15;

/// Hits closer than this are rejected to guard against surface acne.
/// Deliberately much larger than the numerical degeneracy epsilon.
const SELF_INTERSECTION_EPS: f32 = 1e-3;

/// A triangle assembled from a vertex buffer; immutable once built.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

/// Raw triangle intersection: distance and barycentric (u, v) weighting
/// vertices 1 and 2 respectively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Build a triangle from bare positions with zero texture
    /// coordinates and the flat face normal at every vertex.
    pub fn from_positions(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        let vertex = |position| Vertex {
            position,
            texcoord: Vec2::ZERO,
            normal,
        };
        Self::new(vertex(p0), vertex(p1), vertex(p2))
    }

    pub fn positions(&self) -> [Vec3; 3] {
        [
            self.vertices[0].position,
            self.vertices[1].position,
            self.vertices[2].position,
        ]
    }

    /// Möller-Trumbore: solve `[E1 E2 -D] [u v t]^T = O - P0`.
    ///
    /// Barycentric rejection happens before t is computed; accepted hits
    /// must clear the self-intersection epsilon.
    pub fn intersect(&self, ray: &Ray) -> Option<TriangleHit> {
        let [p0, p1, p2] = self.positions();
        let e1 = p1 - p0;
        let e2 = p2 - p0;

        let d_cross_e2 = ray.direction.cross(e2);
        let det = e1.dot(d_cross_e2);

        // Parallel (or degenerate triangle)
        if det.abs() < DEGENERACY_EPS {
            return None;
        }

        let inv_det = 1.0 / det;
        let c0 = ray.origin - p0;

        let u = c0.dot(d_cross_e2) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let c0_cross_e1 = c0.cross(e1);
        let v = ray.direction.dot(c0_cross_e1) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(c0_cross_e1) * inv_det;
        (t > SELF_INTERSECTION_EPS).then_some(TriangleHit { t, u, v })
    }

    /// Interpolate the vertex attributes at barycentric (u, v).
    pub fn interpolate(&self, u: f32, v: f32) -> Vertex {
        let w = 1.0 - (u + v);
        let [v0, v1, v2] = &self.vertices;
        Vertex {
            position: w * v0.position + u * v1.position + v * v2.position,
            texcoord: w * v0.texcoord + u * v1.texcoord + v * v2.texcoord,
            normal: w * v0.normal + u * v1.normal + v * v2.normal,
        }
    }
}
