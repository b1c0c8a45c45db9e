//! Parallel render driver: rows fan out across the rayon pool, each
//! with its own deterministically seeded RNG, so a fixed seed produces
//! the same image at any thread count.

use std::path::Path;

use pathlight_math::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::integrator::{trace_path, Scene};

/// Sub-pixel jitter half-width, in pixels.
const JITTER: f32 = 0.1;

/// Per-render sampling settings.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 64,
            max_depth: 10,
            seed: 0,
        }
    }
}

/// Linear HDR framebuffer.
pub struct ImageBuffer {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Vec3>,
}

impl ImageBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; width * height],
        }
    }

    pub fn set(&mut self, x: usize, y: usize, color: Vec3) {
        if x >= self.width || y >= self.height {
            log::warn!("pixel write out of bounds: ({}, {})", x, y);
            return;
        }
        self.pixels[y * self.width + x] = color;
    }

    pub fn get(&self, x: usize, y: usize) -> Vec3 {
        if x >= self.width || y >= self.height {
            log::warn!("pixel read out of bounds: ({}, {})", x, y);
            return Vec3::ZERO;
        }
        self.pixels[y * self.width + x]
    }

    /// Convert to 8-bit RGBA with gamma 2 encoding.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&c| color_to_rgba(c))
            .collect()
    }

    /// Encode and write the image; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        image::save_buffer(
            path,
            &self.to_rgba(),
            self.width as u32,
            self.height as u32,
            image::ColorType::Rgba8,
        )
    }
}

/// Gamma 2 encode a linear color into an opaque RGBA texel.
pub fn color_to_rgba(color: Vec3) -> [u8; 4] {
    let encode = |v: f32| (v.max(0.0).sqrt().min(1.0) * 255.0) as u8;
    [encode(color.x), encode(color.y), encode(color.z), 255]
}

/// Average `samples_per_pixel` jittered paths through pixel (x, y).
pub fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    x: usize,
    y: usize,
    config: &RenderConfig,
    rng: &mut impl Rng,
) -> Vec3 {
    let mut sum = Vec3::ZERO;
    for _ in 0..config.samples_per_pixel {
        let px = x as f32 + rng.gen_range(-JITTER..JITTER);
        let py = y as f32 + rng.gen_range(-JITTER..JITTER);
        let ray = camera.ray(px, py);
        sum += trace_path(scene, &ray, config.max_depth, rng);
    }
    sum / config.samples_per_pixel as f32
}

/// Render the full frame. Rows are independent work items; row `y`
/// derives its RNG from `config.seed` and `y` alone.
pub fn render(scene: &Scene, camera: &Camera, config: &RenderConfig) -> ImageBuffer {
    let width = camera.image_width as usize;
    let height = camera.image_height as usize;

    log::info!(
        "rendering {}x{} at {} spp, depth {}, over {} triangles",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        scene.triangle_count()
    );

    let mut image = ImageBuffer::new(width, height);

    image
        .pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let mut rng = row_rng(config.seed, y);
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = render_pixel(scene, camera, x, y, config, &mut rng);
            }
        });

    image
}

fn row_rng(seed: u64, y: usize) -> SmallRng {
    SmallRng::seed_from_u64(seed ^ (y as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{AccelOptions, RtMesh};
    use crate::triangle::Triangle;
    use glam::Mat4;
    use pathlight_core::{Material, TextureCache};

    fn test_camera(width: u32, height: u32) -> Camera {
        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_position(Vec3::new(0.0, 0.0, 3.0))
            .with_look_at(Vec3::ZERO)
            .with_vfov(60.0);
        camera.initialize();
        camera
    }

    fn quad_scene(material: Material, sky: Vec3) -> Scene {
        let mesh = RtMesh::from_triangles(
            vec![
                Triangle::from_positions(
                    Vec3::new(-50.0, -50.0, 0.0),
                    Vec3::new(50.0, -50.0, 0.0),
                    Vec3::new(50.0, 50.0, 0.0),
                ),
                Triangle::from_positions(
                    Vec3::new(-50.0, -50.0, 0.0),
                    Vec3::new(50.0, 50.0, 0.0),
                    Vec3::new(-50.0, 50.0, 0.0),
                ),
            ],
            material,
            Mat4::IDENTITY,
            AccelOptions::default(),
        );
        Scene::new(vec![mesh], TextureCache::new(), sky)
    }

    fn emissive_quad_scene(color: Vec3) -> Scene {
        let mut material = Material::new("light", color);
        material.illum = 0;
        quad_scene(material, Vec3::ZERO)
    }

    #[test]
    fn test_color_to_rgba_gamma() {
        assert_eq!(color_to_rgba(Vec3::ZERO), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba(Vec3::ONE), [255, 255, 255, 255]);

        // 0.25 linear encodes to 0.5
        let [r, _, _, _] = color_to_rgba(Vec3::splat(0.25));
        assert!((r as i32 - 127).abs() <= 1);

        // Overbright values clamp instead of wrapping
        assert_eq!(color_to_rgba(Vec3::splat(9.0))[0], 255);
        assert_eq!(color_to_rgba(Vec3::splat(-1.0))[0], 0);
    }

    #[test]
    fn test_render_emissive_frame() {
        let color = Vec3::new(0.49, 0.25, 0.09);
        let scene = emissive_quad_scene(color);
        let camera = test_camera(16, 12);

        let config = RenderConfig {
            samples_per_pixel: 4,
            ..RenderConfig::default()
        };
        let image = render(&scene, &camera, &config);

        assert_eq!(image.width, 16);
        assert_eq!(image.height, 12);
        // Every primary ray lands on the emitter
        for y in 0..image.height {
            for x in 0..image.width {
                assert!((image.get(x, y) - color).length() < 1e-5);
            }
        }
    }

    #[test]
    fn test_render_is_deterministic_per_seed() {
        let scene = emissive_quad_scene(Vec3::splat(0.8));
        let camera = test_camera(8, 8);
        let config = RenderConfig {
            samples_per_pixel: 2,
            seed: 42,
            ..RenderConfig::default()
        };

        let a = render(&scene, &camera, &config);
        let b = render(&scene, &camera, &config);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(a.get(x, y), b.get(x, y));
            }
        }
    }

    #[test]
    fn test_variance_shrinks_with_sample_count() {
        // A half/half diffuse-specular material under a white sky:
        // each path yields either the diffuse or the specular weight,
        // so the pixel estimate is a coin-flip average whose stddev
        // must fall roughly as 1/sqrt(N)
        let mut material = Material::new("mix", Vec3::splat(0.2));
        material.specular = Vec3::splat(0.8);
        material.illum = 2;
        let scene = quad_scene(material, Vec3::ONE);
        let camera = test_camera(16, 12);

        let stddev_at = |samples: u32| {
            let config = RenderConfig {
                samples_per_pixel: samples,
                ..RenderConfig::default()
            };
            let trials: u64 = 64;
            let values: Vec<f32> = (0..trials)
                .map(|i| {
                    let mut rng = SmallRng::seed_from_u64(1000 + i);
                    render_pixel(&scene, &camera, 8, 6, &config, &mut rng).x
                })
                .collect();
            let mean = values.iter().sum::<f32>() / trials as f32;
            let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>()
                / (trials - 1) as f32;
            var.sqrt()
        };

        let coarse = stddev_at(8);
        let fine = stddev_at(32);

        // Quadrupling the sample count should halve the stddev
        assert!(coarse > 0.0);
        let ratio = coarse / fine;
        assert!(
            (1.4..2.8).contains(&ratio),
            "stddev ratio {} out of range (coarse {}, fine {})",
            ratio,
            coarse,
            fine
        );
    }

    #[test]
    fn test_out_of_bounds_access_guarded() {
        let mut image = ImageBuffer::new(4, 4);
        image.set(10, 10, Vec3::ONE);
        assert_eq!(image.get(3, 3), Vec3::ZERO);
        // Reads outside the image are rejected the same way as writes
        assert_eq!(image.get(10, 10), Vec3::ZERO);
        assert_eq!(image.get(4, 0), Vec3::ZERO);
    }

    #[test]
    fn test_to_rgba_layout() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(1, 0, Vec3::ONE);

        let rgba = image.to_rgba();
        assert_eq!(rgba.len(), 8);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[255, 255, 255, 255]);
    }
}
