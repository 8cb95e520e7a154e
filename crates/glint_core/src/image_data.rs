//! Decoded 8-bit RGB image data for texture lookups.
//!
//! The renderer never decodes files itself; it asks this module for an
//! `ImageData` and treats any error as "no image".

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Bytes per pixel in an `ImageData` buffer.
pub const BYTES_PER_PIXEL: usize = 3;

/// Errors that can occur while loading an image asset.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image {path} has no pixels")]
    Empty { path: PathBuf },

    #[error("Pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGB")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type ImageResult<T> = Result<T, ImageError>;

/// A decoded image: interleaved RGB bytes, row-major, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl ImageData {
    /// Wrap an existing RGB buffer, checking that its length matches the size.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> ImageResult<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(ImageError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Raw interleaved RGB bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn bytes_per_scanline(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// RGB triple at integer coordinates, clamped to the image edges.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let y = y.min(self.height.saturating_sub(1)) as usize;
        let offset = y * self.bytes_per_scanline() + x * BYTES_PER_PIXEL;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ]
    }

    /// Get total size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.pixels.len()
    }
}

/// Decode an image file into 8-bit RGB.
///
/// Any format the `image` crate understands is accepted; alpha is dropped.
pub fn load_rgb8(path: impl AsRef<Path>) -> ImageResult<ImageData> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| ImageError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(ImageError::Empty {
            path: path.to_path_buf(),
        });
    }

    let data = ImageData::new(width, height, rgb.into_raw())?;
    log::debug!(
        "Loaded image: {} ({}x{}, {:.1} KB)",
        path.display(),
        width,
        height,
        data.size_bytes() as f32 / 1024.0
    );
    Ok(data)
}
