//! Recursive path integrator.
//!
//! Three surface behaviors keyed on the MTL illumination model:
//! 0 emits, 1 is purely diffuse, everything else splits half/half
//! between a cosine-weighted diffuse bounce and a mirror reflection,
//! each carrying its full channel weight.

use glam::{Vec2, Vec3};
use pathlight_core::{Material, TextureCache, MAGENTA};
use pathlight_math::Ray;
use rand::Rng;

use crate::mesh::{min_intersection, RtMesh};

/// Everything a ray can see: placed meshes, their preloaded textures
/// and the sky color returned for escaping rays.
pub struct Scene {
    pub meshes: Vec<RtMesh>,
    pub textures: TextureCache,
    pub sky: Vec3,
}

impl Scene {
    pub fn new(meshes: Vec<RtMesh>, textures: TextureCache, sky: Vec3) -> Self {
        Self {
            meshes,
            textures,
            sky,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(RtMesh::triangle_count).sum()
    }
}

/// Material channels resolved at one surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingChannels {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl ShadingChannels {
    /// Resolve the channel colors at `texcoord`: a bound texture map
    /// replaces its channel outright (magenta when the map is missing
    /// from the cache), then ambient is modulated by diffuse.
    pub fn resolve(material: &Material, texcoord: Vec2, textures: &TextureCache) -> Self {
        let sample = |map: &Option<String>, plain: Vec3| match map {
            Some(key) => textures
                .get(key)
                .map_or(MAGENTA, |sampler| sampler.sample(texcoord)),
            None => plain,
        };

        let mut channels = Self {
            ambient: sample(&material.ambient_map, material.ambient),
            diffuse: sample(&material.diffuse_map, material.diffuse),
            specular: sample(&material.specular_map, material.specular),
        };
        channels.ambient *= channels.diffuse;
        channels
    }
}

/// Mirror `direction` about the surface normal.
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Cosine-weighted direction in the hemisphere around `normal`.
pub fn cosine_hemisphere(normal: Vec3, rng: &mut impl Rng) -> Vec3 {
    let r1 = 2.0 * std::f32::consts::PI * rng.gen::<f32>();
    let r2: f32 = rng.gen();

    // Tangent frame; pick the axis least aligned with the normal
    let axis = if normal.x.abs() > 0.1 { Vec3::Y } else { Vec3::X };
    let u = axis.cross(normal).normalize();
    let v = normal.cross(u);

    ((u * r1.cos() + v * r1.sin()) * r2.sqrt() + normal * (1.0 - r2).sqrt()).normalize()
}

/// Trace one path, bouncing at most `depth` more times. Escaping rays
/// pick up the sky color; exhausted paths contribute nothing.
pub fn trace_path(scene: &Scene, ray: &Ray, depth: u32, rng: &mut impl Rng) -> Vec3 {
    if depth == 0 {
        return Vec3::ZERO;
    }

    let Some(hit) = min_intersection(ray, &scene.meshes) else {
        return scene.sky;
    };

    let channels = ShadingChannels::resolve(hit.material, hit.texcoord, &scene.textures);

    match hit.material.illum {
        0 => channels.diffuse,
        illum => {
            let diffuse_bounce = illum == 1 || rng.gen::<f32>() < 0.5;
            let (weight, direction) = if diffuse_bounce {
                (channels.diffuse, cosine_hemisphere(hit.normal, rng))
            } else {
                (channels.specular, reflect(ray.direction, hit.normal))
            };
            let bounce = Ray::new(hit.position, direction);
            weight * trace_path(scene, &bounce, depth - 1, rng)
        }
    }
}
