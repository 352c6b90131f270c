//! Textures: functions from surface coordinates to a color.

use std::sync::Arc;

use ember_core::TextureImage;
use ember_math::{Interval, Vec3};

use crate::perlin::{Perlin, DEFAULT_OCTAVES};
use crate::Color;

/// Returned by [`ImageTexture`] when it has no pixels to sample.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

pub trait Texture: Send + Sync {
    /// Color at surface coordinates `(u, v)` and world point `p`.
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// Constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(Color::new(red, green, blue))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.albedo
    }
}

/// 3-D checkerboard alternating between two textures.
#[derive(Clone)]
pub struct CheckerTexture {
    inv_scale: f32,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    /// `scale` is the edge length of one cell in world units.
    pub fn new(scale: f32, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    pub fn from_colors(scale: f32, even: Color, odd: Color) -> Self {
        Self::new(
            scale,
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
        )
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let cell = (self.inv_scale * p).floor();
        let sum = cell.x as i64 + cell.y as i64 + cell.z as i64;

        // rem_euclid keeps parity alternating across negative cells
        if sum.rem_euclid(2) == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

/// Image lookup by `(u, v)`.
///
/// An image that failed to load (0x0) yields [`MISSING_TEXTURE_COLOR`].
#[derive(Clone)]
pub struct ImageTexture {
    image: Arc<TextureImage>,
}

impl ImageTexture {
    pub fn new(image: Arc<TextureImage>) -> Self {
        Self { image }
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        if self.image.is_empty() {
            return MISSING_TEXTURE_COLOR;
        }

        let unit = Interval::new(0.0, 1.0);
        let u = unit.clamp(u);
        // Flip V to image coordinates
        let v = 1.0 - unit.clamp(v);

        let i = (u * self.image.width as f32) as i64;
        let j = (v * self.image.height as f32) as i64;

        Color::from(self.image.pixel(i, j))
    }
}

/// Perlin turbulence in grayscale.
#[derive(Clone)]
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    pub fn new(scale: f32) -> Self {
        Self {
            noise: Perlin::new(),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        Color::ONE * self.noise.turbulence(self.scale * p, DEFAULT_OCTAVES)
    }
}
