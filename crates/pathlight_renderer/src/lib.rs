//! CPU Monte Carlo path tracer.
//!
//! Rays go scene -> mesh -> material range -> triangle: each mesh
//! transforms the ray into model space, tests its bounding volume, and
//! delegates to the per-range octree (or a linear scan); the closest
//! hit feeds a recursive path integrator with cosine-weighted diffuse
//! and mirror specular bounces.

mod bounds;
mod camera;
mod integrator;
mod intersect;
mod mesh;
mod octree;
mod renderer;
mod triangle;

pub use bounds::{bounding_sphere, BoundingVolume, BoundsKind};
pub use camera::Camera;
pub use integrator::{cosine_hemisphere, reflect, trace_path, Scene, ShadingChannels};
pub use intersect::{closest_hit, smallest_positive_root, RangeHit, Sphere};
pub use mesh::{min_intersection, AccelOptions, MeshRange, RtMesh, SurfaceHit};
pub use octree::{Octree, DEFAULT_OCTREE_DEPTH};
pub use renderer::{color_to_rgba, render, render_pixel, ImageBuffer, RenderConfig};
pub use triangle::{Triangle, TriangleHit};

/// Re-export common math types
pub use pathlight_math::{Aabb, Interval, Ray, Vec2, Vec3};
