//! Texture image decoding and caching.
//!
//! Images are decoded once through the `image` crate into linear RGB floats.
//! Renderers sample them through [`TextureImage::pixel`]; a texture that
//! failed to load is represented by an empty (0x0) image so the sampling side
//! can substitute its own fallback instead of failing mid-render.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Texture {path} not found")]
    NotFound { path: PathBuf },

    #[error("Failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Decoded image in linear RGB, row-major, top row first.
#[derive(Clone, Debug)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 3]>,
    /// Where the pixels came from, for log messages
    pub path: String,
}

impl TextureImage {
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 3]>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// A 0x0 image standing in for one that could not be decoded.
    pub fn empty(path: impl Into<String>) -> Self {
        Self::new(0, 0, Vec::new(), path)
    }

    /// Decode an image file, converting sRGB bytes to linear values.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TextureError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let rgb = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgb8();

        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|px| px.0.map(srgb_to_linear))
            .collect();

        Ok(Self::new(width, height, pixels, path.to_string_lossy()))
    }

    /// Like [`TextureImage::load`], but logs the failure and returns an
    /// empty image instead.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("{}; using fallback color", e);
            Self::empty(path.to_string_lossy())
        })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at `(x, y)` with both coordinates clamped into the image.
    /// Black for an empty image.
    pub fn pixel(&self, x: i64, y: i64) -> [f32; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.pixels.get(y * self.width as usize + x).copied().unwrap_or([0.0; 3])
    }

    /// Approximate decoded size.
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of_val(self.pixels.as_slice())
    }
}

/// Decodes each image file once and shares it between materials.
///
/// Failed loads are cached too, as empty images, so a missing file warns
/// once no matter how many materials use it.
#[derive(Default)]
pub struct TextureCache {
    /// Keyed by the path as requested, before resolution
    textures: HashMap<String, Arc<TextureImage>>,
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative paths passed to [`TextureCache::load`] resolve against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Shared image for `path`. Never fails; see [`TextureImage::load_or_empty`].
    pub fn load(&mut self, path: &str) -> Arc<TextureImage> {
        let resolved = match &self.base_dir {
            Some(base) => base.join(path),
            None => PathBuf::from(path),
        };

        self.textures
            .entry(path.to_string())
            .or_insert_with(|| {
                let texture = TextureImage::load_or_empty(&resolved);
                if !texture.is_empty() {
                    log::debug!(
                        "Decoded texture {} ({}x{}, {:.1} KB)",
                        resolved.display(),
                        texture.width,
                        texture.height,
                        texture.size_bytes() as f32 / 1024.0
                    );
                }
                Arc::new(texture)
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// sRGB transfer curve, byte to linear.
fn srgb_to_linear(byte: u8) -> f32 {
    let c = byte as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_clamps_coordinates() {
        let tex = TextureImage::new(2, 1, vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]], "<memory>");

        assert_eq!(tex.pixel(0, 0), [1.0, 0.0, 0.0]);
        assert_eq!(tex.pixel(1, 0), [0.0, 0.0, 1.0]);
        assert_eq!(tex.pixel(-5, 3), [1.0, 0.0, 0.0]);
        assert_eq!(tex.pixel(99, -1), [0.0, 0.0, 1.0]);
        assert_eq!(tex.size_bytes(), 24);
    }

    #[test]
    fn test_missing_file() {
        let path = "/definitely/not/here/earth.jpg";
        assert!(matches!(TextureImage::load(path), Err(TextureError::NotFound { .. })));

        let tex = TextureImage::load_or_empty(path);
        assert!(tex.is_empty());
        assert_eq!(tex.pixel(0, 0), [0.0; 3]);
    }

    #[test]
    fn test_decode_round_trip() {
        let path = std::env::temp_dir().join(format!("ember_texture_{}.png", std::process::id()));
        let bytes = [255u8, 0, 0, 0, 0, 0];
        image::save_buffer(&path, &bytes, 2, 1, image::ColorType::Rgb8).unwrap();

        let tex = TextureImage::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((tex.width, tex.height), (2, 1));
        assert!((tex.pixel(0, 0)[0] - 1.0).abs() < 1e-6);
        assert_eq!(tex.pixel(1, 0), [0.0; 3]);
    }

    #[test]
    fn test_texture_cache_reuses_entries() {
        let mut cache = TextureCache::with_base_dir("/definitely/not/here");
        assert!(cache.is_empty());

        let a = cache.load("wall.jpg");
        let b = cache.load("wall.jpg");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert!(a.is_empty());
    }

    #[test]
    fn test_srgb_to_linear() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(10) - 10.0 / 255.0 / 12.92).abs() < 1e-6);

        // Mid-gray is darker in linear
        let mid = srgb_to_linear(128);
        assert!(mid > 0.2 && mid < 0.25);
    }
}
