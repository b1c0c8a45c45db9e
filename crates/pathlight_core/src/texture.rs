//! Texture decoding, sampling and caching.
//!
//! Textures are loaded from disk into linear RGB, wrapped in a
//! `Sampler2D` (filter + per-axis wrap mode) and cached by resolved
//! path. The cache is populated entirely during scene construction and
//! only read during rendering.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::{AssetError, AssetResult};

/// Sentinel color for absent or zero-sized textures.
pub const MAGENTA: Vec3 = Vec3::new(1.0, 0.0, 1.0);

/// Texture filtering mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Filter {
    Nearest,
    #[default]
    Bilinear,
}

/// Per-axis texture coordinate wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WrapMode {
    Clamp,
    #[default]
    Repeat,
    MirroredRepeat,
}

/// Decoded texture pixels in linear RGB, row-major.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
    /// Original file path (for logging)
    pub path: String,
}

impl Texture {
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// A texture with no pixels; sampling it yields the sentinel color.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            path: "<empty>".to_string(),
        }
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
            path: "<solid>".to_string(),
        }
    }

    fn get_pixel(&self, x: i32, y: i32) -> Vec3 {
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels.get(idx).copied().unwrap_or(MAGENTA)
    }

    /// Approximate memory footprint.
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Vec3>()
    }
}

/// A texture bound to a filter and per-axis wrap modes.
#[derive(Clone, Debug)]
pub struct Sampler2D {
    pub texture: Texture,
    pub filter: Filter,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
}

impl Sampler2D {
    pub fn new(texture: Texture, filter: Filter, wrap_u: WrapMode, wrap_v: WrapMode) -> Self {
        Self {
            texture,
            filter,
            wrap_u,
            wrap_v,
        }
    }

    /// Sample at texture coordinates in [0,1]^2.
    ///
    /// Zero-sized textures return magenta rather than failing.
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        if self.texture.width == 0 || self.texture.height == 0 {
            return MAGENTA;
        }

        // Half-texel offset so integer sample coordinates land on texel centers
        let sx = uv.x * self.texture.width as f32 - 0.5;
        let sy = uv.y * self.texture.height as f32 - 0.5;

        match self.filter {
            Filter::Bilinear => self.sample_bilinear(sx, sy),
            Filter::Nearest => self.sample_nearest(sx, sy),
        }
    }

    fn sample_nearest(&self, sx: f32, sy: f32) -> Vec3 {
        let x = wrap_index(sx.round() as i32, self.texture.width as i32, self.wrap_u);
        let y = wrap_index(sy.round() as i32, self.texture.height as i32, self.wrap_v);
        self.texture.get_pixel(x, y)
    }

    fn sample_bilinear(&self, sx: f32, sy: f32) -> Vec3 {
        let x = sx.floor() as i32;
        let y = sy.floor() as i32;
        let fx = sx - x as f32;
        let fy = sy - y as f32;

        let w = self.texture.width as i32;
        let h = self.texture.height as i32;
        let x0 = wrap_index(x, w, self.wrap_u);
        let y0 = wrap_index(y, h, self.wrap_v);
        let x1 = wrap_index(x + 1, w, self.wrap_u);
        let y1 = wrap_index(y + 1, h, self.wrap_v);

        let p00 = self.texture.get_pixel(x0, y0);
        let p10 = self.texture.get_pixel(x1, y0);
        let p01 = self.texture.get_pixel(x0, y1);
        let p11 = self.texture.get_pixel(x1, y1);

        let top = p00 * (1.0 - fx) + p10 * fx;
        let bottom = p01 * (1.0 - fx) + p11 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

/// Map a texel index into [0, max) according to the wrap mode.
fn wrap_index(v: i32, vmax: i32, wrap: WrapMode) -> i32 {
    if wrap == WrapMode::Clamp {
        return v.clamp(0, vmax - 1);
    }

    let n = if v >= 0 { v / vmax } else { (v - vmax + 1) / vmax };
    let r = v - n * vmax;

    if wrap == WrapMode::MirroredRepeat && n % 2 != 0 {
        vmax - 1 - r
    } else {
        r
    }
}

/// Cache of loaded samplers keyed by resolved file path.
#[derive(Default)]
pub struct TextureCache {
    samplers: HashMap<String, Arc<Sampler2D>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a texture, using the cache if it was loaded before.
    ///
    /// Loaded samplers use bilinear filtering and repeat wrapping.
    pub fn load(&mut self, path: &Path) -> AssetResult<Arc<Sampler2D>> {
        let key = path.to_string_lossy().to_string();

        if let Some(sampler) = self.samplers.get(&key) {
            return Ok(sampler.clone());
        }

        let texture = load_texture_file(path)?;
        log::info!(
            "loaded texture {} ({}x{}, {:.1} KB)",
            path.display(),
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        let sampler = Arc::new(Sampler2D::new(
            texture,
            Filter::Bilinear,
            WrapMode::Repeat,
            WrapMode::Repeat,
        ));
        self.samplers.insert(key, sampler.clone());
        Ok(sampler)
    }

    /// Get a cached sampler without loading.
    pub fn get(&self, path: &str) -> Option<&Arc<Sampler2D>> {
        self.samplers.get(path)
    }

    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }
}

fn load_texture_file(path: &Path) -> AssetResult<Texture> {
    let img = image::open(path).map_err(|source| AssetError::Texture {
        path: path.to_path_buf(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    // Flip rows so v=0 addresses the bottom of the image, matching
    // wavefront texture coordinates.
    let pixels: Vec<Vec3> = rgb
        .rows()
        .rev()
        .flatten()
        .map(|p| {
            Vec3::new(
                srgb_to_linear(p[0]),
                srgb_to_linear(p[1]),
                srgb_to_linear(p[2]),
            )
        })
        .collect();

    Ok(Texture::new(
        width,
        height,
        pixels,
        path.to_string_lossy().to_string(),
    ))
}

/// Convert an sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Texture {
        // Row 0: black, red; row 1: green, blue
        Texture::new(
            2,
            2,
            vec![
                Vec3::ZERO,
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            "<test>",
        )
    }

    #[test]
    fn test_empty_texture_samples_magenta() {
        let sampler = Sampler2D::new(
            Texture::empty(),
            Filter::Bilinear,
            WrapMode::Repeat,
            WrapMode::Repeat,
        );
        assert_eq!(sampler.sample(Vec2::new(0.5, 0.5)), MAGENTA);
    }

    #[test]
    fn test_nearest_texel_centers() {
        let sampler = Sampler2D::new(
            two_by_two(),
            Filter::Nearest,
            WrapMode::Clamp,
            WrapMode::Clamp,
        );

        assert_eq!(sampler.sample(Vec2::new(0.25, 0.25)), Vec3::ZERO);
        assert_eq!(
            sampler.sample(Vec2::new(0.75, 0.25)),
            Vec3::new(1.0, 0.0, 0.0)
        );
        assert_eq!(
            sampler.sample(Vec2::new(0.25, 0.75)),
            Vec3::new(0.0, 1.0, 0.0)
        );
    }

    #[test]
    fn test_bilinear_midpoint() {
        let sampler = Sampler2D::new(
            two_by_two(),
            Filter::Bilinear,
            WrapMode::Clamp,
            WrapMode::Clamp,
        );

        // Center of the texture blends all four texels equally
        let c = sampler.sample(Vec2::new(0.5, 0.5));
        assert!((c - Vec3::new(0.25, 0.25, 0.25)).length() < 1e-5);
    }

    #[test]
    fn test_wrap_index_modes() {
        // Clamp pins out-of-range indices to the edge
        assert_eq!(wrap_index(-3, 4, WrapMode::Clamp), 0);
        assert_eq!(wrap_index(7, 4, WrapMode::Clamp), 3);

        // Repeat tiles
        assert_eq!(wrap_index(5, 4, WrapMode::Repeat), 1);
        assert_eq!(wrap_index(-1, 4, WrapMode::Repeat), 3);

        // Mirror reflects every other tile
        assert_eq!(wrap_index(4, 4, WrapMode::MirroredRepeat), 3);
        assert_eq!(wrap_index(5, 4, WrapMode::MirroredRepeat), 2);
        assert_eq!(wrap_index(-1, 4, WrapMode::MirroredRepeat), 0);
    }

    #[test]
    fn test_solid_color() {
        let sampler = Sampler2D::new(
            Texture::solid_color(Vec3::new(0.2, 0.4, 0.6)),
            Filter::Bilinear,
            WrapMode::Repeat,
            WrapMode::Repeat,
        );
        let c = sampler.sample(Vec2::new(0.3, 0.9));
        assert!((c - Vec3::new(0.2, 0.4, 0.6)).length() < 1e-5);
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);
        let mid = srgb_to_linear(128);
        assert!(mid < 0.5 && mid > 0.1);
    }
}
