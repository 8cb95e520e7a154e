//! Glint Core - asset loading shared by the renderer and tools.
//!
//! This crate provides:
//!
//! - **Image decoding**: `load_rgb8` turns an image file on disk into a
//!   tightly packed 8-bit RGB buffer (`ImageData`) that image textures sample.
//!
//! # Example
//!
//! ```ignore
//! use glint_core::load_rgb8;
//!
//! let earth = load_rgb8("assets/earthmap.jpg")?;
//! println!("{}x{}", earth.width, earth.height);
//! ```

pub mod image_data;

// Re-export commonly used types
pub use image_data::{load_rgb8, ImageData, ImageError, ImageResult};
