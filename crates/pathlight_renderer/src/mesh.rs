//! Renderable meshes: a triangle arena partitioned into material
//! ranges, each with its own acceleration structure, behind a mesh
//! bounding volume and a model transform.
//!
//! Intersection runs in model space. The incoming world-space ray is
//! mapped through the inverse model matrix once per mesh, and the
//! winning hit is mapped back (position through the model matrix,
//! normal through the inverse-transpose).

use std::path::Path;

use glam::{Mat3, Mat4};
use pathlight_core::{AssetResult, Material, MeshData, TextureCache};
use pathlight_math::{normal_matrix, Ray, Vec2, Vec3};

use crate::bounds::{BoundingVolume, BoundsKind};
use crate::intersect::{self, RangeHit};
use crate::octree::{Octree, DEFAULT_OCTREE_DEPTH};
use crate::triangle::Triangle;

/// Per-mesh acceleration settings.
#[derive(Debug, Clone, Copy)]
pub struct AccelOptions {
    pub bounds: BoundsKind,
    pub use_octree: bool,
    pub octree_depth: u32,
}

impl Default for AccelOptions {
    fn default() -> Self {
        Self {
            bounds: BoundsKind::Box,
            use_octree: true,
            octree_depth: DEFAULT_OCTREE_DEPTH,
        }
    }
}

/// Acceleration structure over one material range.
#[derive(Debug, Clone)]
enum Accel {
    Linear,
    Octree(Octree),
}

/// A contiguous arena range sharing one material.
#[derive(Debug, Clone)]
pub struct MeshRange {
    pub material: Material,
    start: usize,
    end: usize,
    accel: Accel,
}

impl MeshRange {
    fn closest_hit(&self, ray: &Ray, triangles: &[Triangle]) -> RangeHit {
        match &self.accel {
            Accel::Linear => intersect::closest_hit(ray, triangles, self.start, self.end),
            Accel::Octree(tree) => tree.closest_hit(ray, triangles),
        }
    }
}

/// A resolved surface intersection in world space.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit<'a> {
    /// Distance in units of the original ray direction, so that
    /// `ray.at(t)` lands on `position`
    pub t: f32,
    pub position: Vec3,
    pub texcoord: Vec2,
    pub normal: Vec3,
    pub material: &'a Material,
}

/// A placed mesh: triangle arena, material ranges, bounding volume and
/// the model transform pair.
pub struct RtMesh {
    triangles: Vec<Triangle>,
    ranges: Vec<MeshRange>,
    bounding_volume: BoundingVolume,
    model: Mat4,
    model_inv: Mat4,
    normal_m: Mat3,
}

impl RtMesh {
    /// Load an OBJ and build the render mesh. Texture maps referenced
    /// by the materials are resolved against the OBJ's directory,
    /// preloaded into `textures`, and the material map fields are
    /// rewritten to the resolved cache keys.
    pub fn load(
        path: impl AsRef<Path>,
        model: Mat4,
        options: AccelOptions,
        fallback: &Material,
        textures: &mut TextureCache,
    ) -> AssetResult<Self> {
        let data = MeshData::load_obj(path, fallback)?;

        let triangles: Vec<Triangle> = data
            .vertices
            .chunks_exact(3)
            .map(|v| Triangle::new(v[0], v[1], v[2]))
            .collect();

        let mut groups = Vec::with_capacity(data.groups.len());
        for group in &data.groups {
            let mut material = group.material.clone();
            for map in [
                &mut material.ambient_map,
                &mut material.diffuse_map,
                &mut material.specular_map,
            ] {
                if let Some(name) = map {
                    let resolved = data.base_dir.join(name.as_str());
                    textures.load(&resolved)?;
                    *map = Some(resolved.to_string_lossy().to_string());
                }
            }
            groups.push((material, group.start, group.start + group.count));
        }

        Ok(Self::assemble(triangles, groups, model, options))
    }

    /// Build a mesh directly from triangles under a single material.
    pub fn from_triangles(
        triangles: Vec<Triangle>,
        material: Material,
        model: Mat4,
        options: AccelOptions,
    ) -> Self {
        let end = triangles.len();
        Self::assemble(triangles, vec![(material, 0, end)], model, options)
    }

    fn assemble(
        mut triangles: Vec<Triangle>,
        groups: Vec<(Material, usize, usize)>,
        model: Mat4,
        options: AccelOptions,
    ) -> Self {
        let points: Vec<Vec3> = triangles
            .iter()
            .flat_map(|tri| tri.positions())
            .collect();
        let bounding_volume = BoundingVolume::build(options.bounds, &points);

        let ranges = groups
            .into_iter()
            .map(|(material, start, end)| {
                let accel = if options.use_octree {
                    Accel::Octree(Octree::build(&mut triangles, start, end, options.octree_depth))
                } else {
                    Accel::Linear
                };
                MeshRange {
                    material,
                    start,
                    end,
                    accel,
                }
            })
            .collect();

        Self {
            triangles,
            ranges,
            bounding_volume,
            model,
            model_inv: model.inverse(),
            normal_m: normal_matrix(&model),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn ranges(&self) -> &[MeshRange] {
        &self.ranges
    }

    /// Closest intersection of a world-space ray with this mesh.
    pub fn min_intersection(&self, ray: &Ray) -> Option<SurfaceHit<'_>> {
        let mut local = ray.transformed(&self.model_inv);
        // Renormalize so range-space t values are comparable distances
        local.direction = local.direction.normalize();

        if !self.bounding_volume.intersects(&local) {
            return None;
        }

        let mut best = RangeHit::MISS;
        let mut best_material = None;
        for range in &self.ranges {
            let hit = range.closest_hit(&local, &self.triangles);
            if hit.t < best.t {
                best = hit;
                best_material = Some(&range.material);
            }
        }

        let material = best_material?;
        let vertex = self.triangles[best.index].interpolate(best.u, best.v);

        let position = self.model.transform_point3(vertex.position);
        let normal = (self.normal_m * vertex.normal).normalize();
        // Back into the caller's parameterization, whatever the length
        // of its direction vector
        let t = (position - ray.origin).length() / ray.direction.length();

        Some(SurfaceHit {
            t,
            position,
            texcoord: vertex.texcoord,
            normal,
            material,
        })
    }
}

/// Closest intersection across a set of meshes.
pub fn min_intersection<'a>(ray: &Ray, meshes: &'a [RtMesh]) -> Option<SurfaceHit<'a>> {
    meshes
        .iter()
        .filter_map(|mesh| mesh.min_intersection(ray))
        .min_by(|a, b| a.t.total_cmp(&b.t))
}
