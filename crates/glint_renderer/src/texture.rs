//! Textures: color fields sampled by UV and world position.

use std::path::Path;
use std::sync::Arc;

use glint_core::{load_rgb8, ImageData};
use glint_math::Point3;
use rand::RngCore;

use crate::perlin::Perlin;
use crate::Color;

/// Debug color returned when an image texture has no pixels to sample.
pub const MISSING_IMAGE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// Default spatial frequency of the checker pattern.
pub const DEFAULT_CHECKER_SCALE: f64 = 10.0;

/// Octaves summed by the marble noise texture.
pub const TURBULENCE_DEPTH: usize = 7;

/// Every color source a material can sample.
#[derive(Debug, Clone)]
pub enum Texture {
    Solid(Color),
    Checker(Checker),
    Image(ImageTexture),
    Noise(NoiseTexture),
}

impl Texture {
    pub fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker(checker) => checker.value(u, v, p),
            Texture::Image(image) => image.value(u, v),
            Texture::Noise(noise) => noise.value(p),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}

impl From<Checker> for Texture {
    fn from(checker: Checker) -> Self {
        Texture::Checker(checker)
    }
}

impl From<ImageTexture> for Texture {
    fn from(image: ImageTexture) -> Self {
        Texture::Image(image)
    }
}

impl From<NoiseTexture> for Texture {
    fn from(noise: NoiseTexture) -> Self {
        Texture::Noise(noise)
    }
}

/// 3D spatial checker alternating between two sub-textures.
#[derive(Debug, Clone)]
pub struct Checker {
    even: Arc<Texture>,
    odd: Arc<Texture>,
    scale: f64,
}

impl Checker {
    pub fn new(even: Arc<Texture>, odd: Arc<Texture>) -> Self {
        Self::with_scale(even, odd, DEFAULT_CHECKER_SCALE)
    }

    pub fn with_scale(even: Arc<Texture>, odd: Arc<Texture>, scale: f64) -> Self {
        Self { even, odd, scale }
    }

    pub fn from_colors(even: Color, odd: Color) -> Self {
        Self::new(Arc::new(Texture::Solid(even)), Arc::new(Texture::Solid(odd)))
    }

    fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        let s = self.scale;
        let sines = (s * p.x).sin() * (s * p.y).sin() * (s * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Nearest-pixel lookup into a decoded RGB image.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    image: Option<Arc<ImageData>>,
}

impl ImageTexture {
    /// Load an image file. Failures are logged and leave the texture empty.
    pub fn load(path: impl AsRef<Path>) -> Self {
        match load_rgb8(path.as_ref()) {
            Ok(image) => Self::from_image(image),
            Err(err) => {
                log::warn!("Image texture unavailable, rendering cyan: {}", err);
                Self { image: None }
            }
        }
    }

    pub fn from_image(image: ImageData) -> Self {
        Self {
            image: Some(Arc::new(image)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    fn value(&self, u: f64, v: f64) -> Color {
        let Some(image) = self.image.as_deref() else {
            return MISSING_IMAGE_COLOR;
        };
        if image.width == 0 || image.height == 0 {
            return MISSING_IMAGE_COLOR;
        }

        // Clamp input texture coordinates to [0,1] x [1,0]
        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        // u = 1.0 would index one past the last column; pixel() clamps it
        let x = (u * image.width as f64) as u32;
        let y = (v * image.height as f64) as u32;

        let [r, g, b] = image.pixel(x, y);
        const COLOR_SCALE: f64 = 1.0 / 255.0;
        Color::new(r as f64, g as f64, b as f64) * COLOR_SCALE
    }
}

/// Marble-like Perlin turbulence texture.
#[derive(Debug, Clone)]
pub struct NoiseTexture {
    noise: Perlin,
    scale: f64,
}

impl NoiseTexture {
    pub fn new(scale: f64, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }

    fn value(&self, p: Point3) -> Color {
        let phase = self.scale * p.z + 10.0 * self.noise.turbulence(p, TURBULENCE_DEPTH);
        Color::ONE * 0.5 * (1.0 + phase.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_math::DVec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_texture_ignores_inputs() {
        let texture = Texture::Solid(Color::new(0.1, 0.2, 0.3));
        assert_eq!(texture.value(0.9, 0.1, DVec3::splat(42.0)), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_checker_alternates_in_space() {
        let texture: Texture = Checker::from_colors(Color::ONE, Color::ZERO).into();
        let step = std::f64::consts::PI / DEFAULT_CHECKER_SCALE;

        // Inside the first positive octant cell: all sines positive
        let even = DVec3::splat(step * 0.5);
        assert_eq!(texture.value(0.0, 0.0, even), Color::ONE);

        // Step one cell along x: sign flips
        let odd = even + DVec3::new(step, 0.0, 0.0);
        assert_eq!(texture.value(0.0, 0.0, odd), Color::ZERO);

        // Zero product counts as even
        assert_eq!(texture.value(0.0, 0.0, DVec3::ZERO), Color::ONE);
    }

    #[test]
    fn test_missing_image_is_cyan() {
        let texture: Texture = ImageTexture::load("no/such/earthmap.jpg").into();
        assert_eq!(texture.value(0.5, 0.5, DVec3::ZERO), MISSING_IMAGE_COLOR);
    }

    #[test]
    fn test_is_loaded() {
        assert!(!ImageTexture::load("no/such/earthmap.jpg").is_loaded());

        let image = ImageData::new(1, 1, vec![10, 20, 30]).unwrap();
        assert!(ImageTexture::from_image(image).is_loaded());
    }

    #[test]
    fn test_image_lookup_flips_v_and_clamps() {
        #[rustfmt::skip]
        let pixels = vec![
            255, 0, 0,    0, 255, 0,
            0, 0, 255,    255, 255, 255,
        ];
        let image = ImageData::new(2, 2, pixels).unwrap();
        let texture: Texture = ImageTexture::from_image(image).into();
        let p = DVec3::ZERO;

        // v = 1 is the top row of the image
        assert_eq!(texture.value(0.0, 1.0, p), Color::new(1.0, 0.0, 0.0));
        assert_eq!(texture.value(0.99, 0.99, p), Color::new(0.0, 1.0, 0.0));
        assert_eq!(texture.value(0.0, 0.0, p), Color::new(0.0, 0.0, 1.0));
        // Out-of-range coordinates clamp to the edges
        assert_eq!(texture.value(7.0, -3.0, p), Color::ONE);
    }

    #[test]
    fn test_noise_texture_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let texture: Texture = NoiseTexture::new(4.0, &mut rng).into();

        for i in 0..200 {
            let p = DVec3::new(i as f64 * 0.13, 1.0 - i as f64 * 0.07, i as f64 * 0.021);
            let c = texture.value(0.0, 0.0, p);
            assert!(c.x >= 0.0 && c.x <= 1.0);
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
        }
    }
}
