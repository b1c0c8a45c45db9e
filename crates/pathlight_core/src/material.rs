use glam::Vec3;

/// A wavefront-style material: reflectance triples, a shininess
/// exponent, an illumination-model code and up to three texture maps.
///
/// One material owns a contiguous range of a mesh's triangle buffer;
/// materials are immutable for the lifetime of the mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,

    /// Ambient reflectance (Ka)
    pub ambient: Vec3,

    /// Diffuse reflectance (Kd); doubles as the emitted radiance for
    /// illumination model 0
    pub diffuse: Vec3,

    /// Specular reflectance (Ks)
    pub specular: Vec3,

    /// Shininess exponent (Ns)
    pub shininess: f32,

    /// Illumination model code: 0 = emission, 1 = diffuse,
    /// anything else = stochastic diffuse/specular mix
    pub illum: u8,

    /// Texture map paths, resolved relative to the mesh's directory
    pub ambient_map: Option<String>,
    pub diffuse_map: Option<String>,
    pub specular_map: Option<String>,
}

impl Material {
    /// The fallback material used for triangle ranges without an MTL entry.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            shininess: 12.0,
            illum: 2,
            ambient_map: None,
            diffuse_map: None,
            specular_map: None,
        }
    }

    /// Create a named material with the given diffuse color, other
    /// fields from the standard material.
    pub fn new(name: impl Into<String>, diffuse: Vec3) -> Self {
        Self {
            name: name.into(),
            diffuse,
            ..Self::standard()
        }
    }

    /// Check if this material references any texture maps.
    pub fn has_textures(&self) -> bool {
        self.ambient_map.is_some() || self.diffuse_map.is_some() || self.specular_map.is_some()
    }

    /// Pure emitter: surfaces with this material terminate light paths.
    pub fn is_emissive(&self) -> bool {
        self.illum == 0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard()
    }
}
