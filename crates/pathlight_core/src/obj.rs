//! Wavefront OBJ/MTL loading.
//!
//! Produces a triangle-ordered vertex buffer plus an ordered sequence of
//! (material, contiguous triangle range) pairs, which is the shape the
//! renderer's mesh hierarchy is built from.

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};

use crate::{AssetError, AssetResult, Material};

/// A vertex carrying position, texture coordinates and a shading normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub texcoord: Vec2,
    pub normal: Vec3,
}

/// A material plus the contiguous triangle range that uses it.
#[derive(Clone, Debug)]
pub struct MaterialGroup {
    pub material: Material,
    /// Index of the first triangle of this group
    pub start: usize,
    /// Number of triangles in this group
    pub count: usize,
}

/// Loaded mesh geometry, triangle-ordered and grouped by material.
#[derive(Clone, Debug)]
pub struct MeshData {
    /// Three vertices per triangle; triangles of one group are contiguous
    pub vertices: Vec<Vertex>,
    pub groups: Vec<MaterialGroup>,
    /// Directory containing the OBJ, for resolving texture paths
    pub base_dir: PathBuf,
}

impl MeshData {
    /// Load an OBJ file, triangulating faces and merging position/uv/normal
    /// indices into a single index per vertex.
    ///
    /// Triangles without an MTL entry get the `fallback` material.
    pub fn load_obj(path: impl AsRef<Path>, fallback: &Material) -> AssetResult<Self> {
        let path = path.as_ref();

        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|source| AssetError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

        let materials = match materials {
            Ok(materials) => materials.iter().map(convert_material).collect::<Vec<_>>(),
            Err(e) => {
                log::warn!("no material library for {}: {}", path.display(), e);
                Vec::new()
            }
        };

        // Bucket triangles by material id; the last bucket collects
        // triangles without one.
        let mut buckets: Vec<Vec<Vertex>> = vec![Vec::new(); materials.len() + 1];

        for model in &models {
            let mesh = &model.mesh;
            let positions = unflatten3(&mesh.positions);
            let normals = if mesh.normals.is_empty() {
                smooth_normals(&positions, &mesh.indices)
            } else {
                unflatten3(&mesh.normals)
            };

            let bucket = mesh.material_id.unwrap_or(materials.len());
            let out = &mut buckets[bucket.min(materials.len())];

            for &index in &mesh.indices {
                let i = index as usize;
                let texcoord = if mesh.texcoords.is_empty() {
                    Vec2::ZERO
                } else {
                    Vec2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1])
                };
                out.push(Vertex {
                    position: positions[i],
                    texcoord,
                    normal: normals[i],
                });
            }
        }

        let mut vertices = Vec::new();
        let mut groups = Vec::new();

        for (id, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let material = materials.get(id).cloned().unwrap_or_else(|| fallback.clone());
            groups.push(MaterialGroup {
                material,
                start: vertices.len() / 3,
                count: bucket.len() / 3,
            });
            vertices.extend(bucket);
        }

        if vertices.is_empty() {
            return Err(AssetError::EmptyMesh(path.to_path_buf()));
        }

        let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        log::info!(
            "loaded {}: {} triangles in {} material group(s)",
            path.display(),
            vertices.len() / 3,
            groups.len()
        );

        Ok(Self {
            vertices,
            groups,
            base_dir,
        })
    }

    /// Number of triangles across all groups.
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// All vertex positions, for bounding volume construction.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| v.position)
    }
}

fn unflatten3(values: &[f32]) -> Vec<Vec3> {
    values
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect()
}

/// Smooth per-vertex normals averaged from face normals, used when the
/// OBJ carries none.
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for face in indices.chunks_exact(3) {
        let (i0, i1, i2) = (face[0] as usize, face[1] as usize, face[2] as usize);
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            continue;
        }
        let edge1 = positions[i1] - positions[i0];
        let edge2 = positions[i2] - positions[i0];
        let face_normal = edge1.cross(edge2);

        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }

    for normal in &mut normals {
        let len = normal.length();
        if len > 0.0 {
            *normal /= len;
        } else {
            *normal = Vec3::Y;
        }
    }

    normals
}

fn convert_material(mat: &tobj::Material) -> Material {
    Material {
        name: mat.name.clone(),
        ambient: mat.ambient.map_or(Vec3::splat(0.1), Vec3::from_array),
        diffuse: mat.diffuse.map_or(Vec3::ONE, Vec3::from_array),
        specular: mat.specular.map_or(Vec3::ONE, Vec3::from_array),
        shininess: mat.shininess.unwrap_or(12.0),
        illum: mat.illumination_model.unwrap_or(2),
        ambient_map: mat.ambient_texture.clone(),
        diffuse_map: mat.diffuse_texture.clone(),
        specular_map: mat.specular_texture.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("pathlight_obj_tests");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_without_materials() {
        let path = write_temp(
            "plain.obj",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\n\
             f 1 2 3\nf 2 4 3\n",
        );

        let fallback = Material::new("grey", Vec3::splat(0.5));
        let data = MeshData::load_obj(&path, &fallback).unwrap();

        assert_eq!(data.triangle_count(), 2);
        assert_eq!(data.groups.len(), 1);
        assert_eq!(data.groups[0].material.name, "grey");
        assert_eq!(data.groups[0].start, 0);
        assert_eq!(data.groups[0].count, 2);

        // No normals in the file: smooth normals are computed, and for a
        // flat quad in the XY plane they all face +Z
        for v in &data.vertices {
            assert!((v.normal - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_load_with_material_ranges() {
        write_temp(
            "two.mtl",
            "newmtl red\nKd 1 0 0\nillum 1\n\
             newmtl light\nKd 5 5 5\nillum 0\n",
        );
        let path = write_temp(
            "two.obj",
            "mtllib two.mtl\n\
             v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             usemtl red\nf 1 2 3\n\
             usemtl light\nf 3 2 1\n",
        );

        let data = MeshData::load_obj(&path, &Material::standard()).unwrap();

        assert_eq!(data.triangle_count(), 2);
        assert_eq!(data.groups.len(), 2);

        let red = data.groups.iter().find(|g| g.material.name == "red").unwrap();
        assert_eq!(red.count, 1);
        assert_eq!(red.material.illum, 1);
        assert!((red.material.diffuse - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);

        let light = data
            .groups
            .iter()
            .find(|g| g.material.name == "light")
            .unwrap();
        assert_eq!(light.material.illum, 0);

        // Ranges are contiguous and cover all triangles
        let mut covered = 0;
        for g in &data.groups {
            assert_eq!(g.start, covered);
            covered += g.count;
        }
        assert_eq!(covered, data.triangle_count());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = MeshData::load_obj("/nonexistent/mesh.obj", &Material::standard());
        assert!(result.is_err());
    }
}
