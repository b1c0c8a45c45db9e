//! Pinhole camera mapping pixel coordinates to primary rays.

use pathlight_math::{Ray, Vec3};

/// A pinhole camera. Configure with the builder methods, then call
/// [`Camera::initialize`] to derive the viewport frame before asking
/// for rays.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,

    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            image_width: 800,
            image_height: 600,
            position: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            vfov: 60.0,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_look_at(mut self, look_at: Vec3) -> Self {
        self.look_at = look_at;
        self
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    pub fn with_vfov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Derive the viewport frame from the current settings.
    pub fn initialize(&mut self) {
        let focus_dist = 1.0;
        let aspect = self.image_width as f32 / self.image_height as f32;

        let theta = self.vfov.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan() * focus_dist;
        let viewport_width = viewport_height * aspect;

        // Orthonormal basis: w points away from the view direction
        let w = (self.position - self.look_at).normalize();
        let u = self.up.cross(w).normalize();
        let v = w.cross(u);

        let viewport_u = viewport_width * u;
        let viewport_v = viewport_height * -v;

        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        let viewport_upper_left =
            self.position - focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }

    /// Ray through fractional pixel coordinates. (0, 0) is the center
    /// of the top-left pixel; callers supply their own sub-pixel
    /// jitter.
    pub fn ray(&self, px: f32, py: f32) -> Ray {
        let pixel = self.pixel00_loc + px * self.pixel_delta_u + py * self.pixel_delta_v;
        Ray::new(self.position, pixel - self.position)
    }
}
