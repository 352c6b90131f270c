//! Image sink: ASCII PPM (`P3`) writer and reader.
//!
//! The renderer hands over a row-major grid of 8-bit RGB triples. `.ppm`
//! targets are written as plain-text P3; any other extension is handed to
//! the `image` crate encoder.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

/// Errors produced by the image sink.
#[derive(Error, Debug)]
pub enum PpmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Pixel count {actual} does not match {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },

    #[error("Malformed PPM: {0}")]
    Format(String),
}

pub type PpmResult<T> = Result<T, PpmError>;

/// Decoded contents of a PPM file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpmImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

fn check_size(width: u32, height: u32, pixels: &[[u8; 3]]) -> PpmResult<()> {
    if pixels.len() != width as usize * height as usize {
        return Err(PpmError::SizeMismatch {
            width,
            height,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Write a P3 image to any writer.
pub fn write_ppm<W: Write>(mut writer: W, width: u32, height: u32, pixels: &[[u8; 3]]) -> PpmResult<()> {
    check_size(width, height, pixels)?;

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", width, height)?;
    writeln!(writer, "255")?;

    for [r, g, b] in pixels {
        writeln!(writer, "{} {} {}", r, g, b)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a P3 image to a file.
pub fn save_ppm(path: impl AsRef<Path>, width: u32, height: u32, pixels: &[[u8; 3]]) -> PpmResult<()> {
    let file = File::create(path)?;
    write_ppm(BufWriter::new(file), width, height, pixels)
}

/// Persist pixels, choosing the encoder from the file extension.
pub fn save_image(path: impl AsRef<Path>, width: u32, height: u32, pixels: &[[u8; 3]]) -> PpmResult<()> {
    let path = path.as_ref();
    let is_ppm = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(true, |ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        return save_ppm(path, width, height, pixels);
    }

    check_size(width, height, pixels)?;
    let bytes: Vec<u8> = pixels.iter().flatten().copied().collect();
    image::save_buffer(path, &bytes, width, height, image::ColorType::Rgb8)?;
    Ok(())
}

/// Read a P3 image back from any reader.
///
/// `#` comments are allowed between tokens. Channel values are rescaled to
/// 0-255 when the header declares a different maximum.
pub fn read_ppm<R: BufRead>(mut reader: R) -> PpmResult<PpmImage> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut tokens = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace);

    let magic = tokens.next().ok_or_else(|| PpmError::Format("empty file".into()))?;
    if magic != "P3" {
        return Err(PpmError::Format(format!("unsupported format tag '{}'", magic)));
    }

    let mut next_number = |what: &str| -> PpmResult<u32> {
        tokens
            .next()
            .ok_or_else(|| PpmError::Format(format!("missing {}", what)))?
            .parse()
            .map_err(|_| PpmError::Format(format!("invalid {}", what)))
    };

    let width = next_number("width")?;
    let height = next_number("height")?;
    let max_value = next_number("max value")?;
    if max_value == 0 || max_value > 255 {
        return Err(PpmError::Format(format!("unsupported max value {}", max_value)));
    }

    let count = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| PpmError::Format(format!("image size {}x{} is too large", width, height)))?;
    // Each pixel takes at least six bytes of text
    let mut pixels = Vec::with_capacity(count.min(text.len() / 6));
    for _ in 0..count {
        let mut rgb = [0u8; 3];
        for channel in &mut rgb {
            let value = next_number("channel value")?.min(max_value);
            *channel = (value * 255 / max_value) as u8;
        }
        pixels.push(rgb);
    }

    Ok(PpmImage {
        width,
        height,
        pixels,
    })
}

/// Read a P3 image from a file.
pub fn load_ppm(path: impl AsRef<Path>) -> PpmResult<PpmImage> {
    let file = File::open(path)?;
    read_ppm(BufReader::new(file))
}
