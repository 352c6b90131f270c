//! Core path tracing integrator.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing bounded by a depth budget
//! - Selectable miss background
//! - Gamma correction (2.2) once per pixel, or per bounce in legacy mode
//! - Anti-aliasing via multi-sampling

use crate::{Camera, Color, Hittable};
use ember_core::{GammaPlacement, RenderSettings, ScheduleKind};
use ember_math::{Interval, Ray};
use rand::RngCore;
use std::time::Duration;

/// Display gamma applied before quantization.
pub const GAMMA: f32 = 2.2;

/// Closest hit distance accepted by the integrator; avoids shadow acne.
pub const T_MIN: f32 = 0.001;

/// Radiance returned for rays that leave the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Solid(Color),
    /// White at the horizon blending to blue straight up.
    Sky,
    /// Near-black constant (0.005 per channel).
    Dark,
}

impl Background {
    pub const DARK: Color = Color::splat(0.005);

    /// Radiance seen along `ray`.
    pub fn radiance(&self, ray: &Ray) -> Color {
        match *self {
            Background::Solid(color) => color,
            Background::Sky => sky_gradient(ray),
            Background::Dark => Self::DARK,
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(Color::new(0.70, 0.80, 1.00))
    }
}

/// Where gamma correction is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GammaMode {
    /// Once per pixel, after averaging.
    #[default]
    PerPixel,
    /// On every scattered recursive return, with no final pass.
    PerSample,
}

impl From<GammaPlacement> for GammaMode {
    fn from(placement: GammaPlacement) -> Self {
        match placement {
            GammaPlacement::PerPixel => GammaMode::PerPixel,
            GammaPlacement::PerSample => GammaMode::PerSample,
        }
    }
}

/// How pixels are distributed over worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// One contiguous block of rows per worker.
    #[default]
    Rows,
    /// Square buckets, center-out, work-stealing.
    Buckets { size: u32 },
}

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Radiance for rays that miss everything
    pub background: Background,
    pub gamma: GammaMode,
    /// Worker threads, 0 for one per hardware thread
    pub threads: usize,
    pub schedule: Schedule,
    /// Base seed for the per-pixel random streams
    pub seed: u64,
    /// How often the progress monitor logs
    pub progress_interval: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Background::default(),
            gamma: GammaMode::PerPixel,
            threads: 0,
            schedule: Schedule::Rows,
            seed: 0x5EED,
            progress_interval: Duration::from_millis(500),
        }
    }
}

impl From<&RenderSettings> for RenderConfig {
    fn from(settings: &RenderSettings) -> Self {
        let schedule = match settings.schedule {
            ScheduleKind::Rows => Schedule::Rows,
            ScheduleKind::Buckets => Schedule::Buckets {
                size: settings.bucket_size,
            },
        };

        Self {
            samples_per_pixel: settings.samples_per_pixel,
            max_depth: settings.max_depth,
            background: Background::default(),
            gamma: settings.gamma.into(),
            threads: settings.threads,
            schedule,
            seed: settings.seed,
            progress_interval: Duration::from_millis(settings.progress_interval_ms),
        }
    }
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and accumulating color. A depth of zero
/// contributes no light.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f32::INFINITY)) else {
        return config.background.radiance(ray);
    };

    // Get emission from material (for lights)
    let emission = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, world, depth - 1, config, rng);
            let color = emission + result.attenuation * scattered_color;
            match config.gamma {
                GammaMode::PerPixel => color,
                GammaMode::PerSample => gamma_correct(color),
            }
        }
        // Ray was absorbed - just return emission
        None => emission,
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.1, 0.5, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction to a single channel.
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / GAMMA)
    } else {
        0.0
    }
}

/// Apply gamma correction to every channel.
#[inline]
pub fn gamma_correct(color: Color) -> Color {
    Color::new(
        linear_to_gamma(color.x),
        linear_to_gamma(color.y),
        linear_to_gamma(color.z),
    )
}

/// Quantize a display-space color to bytes.
///
/// Channels are clamped to `[0, 0.999]` and scaled by 256, so 1.0 maps to 255.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let intensity = Interval::new(0.0, 0.999);
    let to_byte = |x: f32| (256.0 * intensity.clamp(x)) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// Render a single pixel with multi-sampling.
///
/// Returns the averaged color, gamma corrected according to `config.gamma`.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, config.max_depth, config, rng);
    }

    // Average the samples
    let averaged = pixel_color / config.samples_per_pixel.max(1) as f32;
    match config.gamma {
        GammaMode::PerPixel => gamma_correct(averaged),
        GammaMode::PerSample => averaged,
    }
}

/// Rendered image: display-space colors in row-major order, top row first.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Quantize every pixel for the image sink.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.pixels.iter().map(|c| color_to_rgb8(*c)).collect()
    }
}
