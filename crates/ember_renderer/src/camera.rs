//! Pinhole camera.
//!
//! The image plane sits one unit in front of the eye. Pixel `(0, 0)` is the
//! top-left corner; `j` grows downward.

use crate::sampling::{gen_f32, sample_square};
use ember_math::{Ray, Vec3};
use rand::RngCore;

/// Image-plane placement derived from the user-facing settings.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    /// Center of pixel (0, 0)
    origin: Vec3,
    /// Step one pixel right
    step_u: Vec3,
    /// Step one pixel down
    step_v: Vec3,
    /// Right, up and backward axes
    basis: (Vec3, Vec3, Vec3),
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,
    aspect_ratio: f32,

    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    /// Vertical field of view in degrees
    vfov: f32,

    viewport: Viewport,
}

impl Camera {
    /// 400x225 image at the origin looking down -Z with a 90 degree field
    /// of view. Ready to use as-is.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 400,
            image_height: 225,
            aspect_ratio: 16.0 / 9.0,
            look_from: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            vup: Vec3::Y,
            vfov: 90.0,
            viewport: Viewport {
                origin: Vec3::ZERO,
                step_u: Vec3::ZERO,
                step_v: Vec3::ZERO,
                basis: (Vec3::X, Vec3::Y, Vec3::Z),
            },
        };
        camera.initialize();
        camera
    }

    /// Set the width and aspect ratio; height is `max(1, width / aspect)`.
    pub fn with_image(mut self, width: u32, aspect_ratio: f32) -> Self {
        self.image_width = width.max(1);
        self.aspect_ratio = aspect_ratio;
        self.image_height = ((self.image_width as f32 / aspect_ratio) as u32).max(1);
        self
    }

    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Recompute the viewport. Call after the last `with_*` builder.
    pub fn initialize(&mut self) {
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        let (width, height) = (self.image_width as f32, self.image_height as f32);
        let plane_height = 2.0 * (self.vfov.to_radians() * 0.5).tan();
        let plane_width = plane_height * width / height;

        // Rows run top to bottom, so the vertical edge points down
        let edge_u = plane_width * u;
        let edge_v = -plane_height * v;
        let step_u = edge_u / width;
        let step_v = edge_v / height;

        let top_left = self.look_from - w - 0.5 * (edge_u + edge_v);

        self.viewport = Viewport {
            origin: top_left + 0.5 * (step_u + step_v),
            step_u,
            step_v,
            basis: (u, v, w),
        };
    }

    /// Ray from the eye through a jittered point inside pixel `(i, j)`.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let jitter = sample_square(rng);
        let Viewport {
            origin,
            step_u,
            step_v,
            ..
        } = self.viewport;

        let target = origin + (i as f32 + jitter.x) * step_u + (j as f32 + jitter.y) * step_v;
        Ray::new(self.look_from, target - self.look_from, gen_f32(rng))
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Camera basis `(u, v, w)`: right, up, backward.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        self.viewport.basis
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initialize_sizes_image() {
        let mut camera = Camera::new()
            .with_image(800, 4.0 / 3.0)
            .with_position(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y)
            .with_fov(90.0);
        camera.initialize();

        assert_eq!(camera.image_height, 600);
        assert!((camera.basis().2 - Vec3::Z).length() < 1e-3);
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let mut camera = Camera::new()
            .with_image(480, 16.0 / 9.0)
            .with_position(Vec3::new(0.0, 4.0, 12.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_fov(65.0);
        camera.initialize();

        let (u, v, w) = camera.basis();
        for axis in [u, v, w] {
            assert!((axis.length() - 1.0).abs() < 1e-5);
        }
        assert!(u.dot(v).abs() < 1e-5);
        assert!(v.dot(w).abs() < 1e-5);
        assert!(w.dot(u).abs() < 1e-5);
        assert!(v.y > 0.0);
        assert!((w - Vec3::new(0.0, 4.0, 13.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_image_height_never_zero() {
        assert_eq!(Camera::new().with_image(3, 10.0).image_height, 1);
        assert_eq!(Camera::new().with_image(480, 16.0 / 9.0).image_height, 270);
    }

    #[test]
    fn test_rays_leave_eye_through_pixels() {
        let mut camera = Camera::new()
            .with_image(100, 1.0)
            .with_position(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, 2.0), Vec3::Y)
            .with_fov(90.0);
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(42);

        let center = camera.get_ray(50, 50, &mut rng);
        assert_eq!(center.origin(), Vec3::new(1.0, 2.0, 3.0));
        assert!(center.direction().z < 0.0);
        assert!(center.direction().x.abs() < 0.03 && center.direction().y.abs() < 0.03);
        assert!((0.0..1.0).contains(&center.time()));

        // Top-left pixel points up and left
        let corner = camera.get_ray(0, 0, &mut rng);
        assert!(corner.direction().x < 0.0);
        assert!(corner.direction().y > 0.0);
    }
}
