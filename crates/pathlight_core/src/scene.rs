//! JSON scene description.
//!
//! A scene file lists mesh placements (OBJ path + transform + optional
//! fallback material), the camera, and render settings.

use std::fs;
use std::path::Path;

use glam::{Mat4, Vec3};
use serde::Deserialize;

use crate::{AssetError, AssetResult, Material};

#[derive(Deserialize, Debug, Clone)]
pub struct SceneDescription {
    pub camera: CameraDescription,
    #[serde(default)]
    pub render: RenderSettings,
    pub meshes: Vec<MeshPlacement>,
}

impl SceneDescription {
    pub fn from_file(path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| AssetError::Scene {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CameraDescription {
    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    #[serde(default = "default_vfov")]
    pub vfov: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub sky: [f32; 3],
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            samples_per_pixel: 64,
            max_depth: 10,
            sky: [1.0, 1.0, 1.0],
            seed: 0,
        }
    }
}

/// One mesh instance: an OBJ path and its placement in the world.
#[derive(Deserialize, Debug, Clone)]
pub struct MeshPlacement {
    pub path: String,
    #[serde(default)]
    pub translate: [f32; 3],
    /// Rotation about the Y axis, degrees
    #[serde(default)]
    pub rotate_y: f32,
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    /// Fallback material for triangle ranges without an MTL entry
    #[serde(default)]
    pub material: Option<MaterialOverride>,
}

impl MeshPlacement {
    /// Model-to-world matrix, composed scale, then rotate, then translate.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from_array(self.translate))
            * Mat4::from_rotation_y(self.rotate_y.to_radians())
            * Mat4::from_scale(Vec3::from_array(self.scale))
    }

    /// The material used for triangles without an MTL entry: the
    /// standard material with any overrides applied.
    pub fn fallback_material(&self) -> Material {
        let mut mat = Material::standard();
        if let Some(over) = &self.material {
            if let Some(illum) = over.illum {
                mat.illum = illum;
            }
            if let Some(diffuse) = over.diffuse {
                mat.diffuse = Vec3::from_array(diffuse);
            }
            if let Some(specular) = over.specular {
                mat.specular = Vec3::from_array(specular);
            }
        }
        mat
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct MaterialOverride {
    #[serde(default)]
    pub illum: Option<u8>,
    #[serde(default)]
    pub diffuse: Option<[f32; 3]>,
    #[serde(default)]
    pub specular: Option<[f32; 3]>,
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_vfov() -> f32 {
    45.0
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
