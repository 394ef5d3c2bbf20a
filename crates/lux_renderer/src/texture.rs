//! Procedural and image-backed textures.

use crate::perlin::Perlin;
use crate::Color;
use lux_core::asset::{AssetCache, ImageData};
use lux_math::Vec3;
use std::sync::Arc;

/// Debug color returned by an image texture whose backing image has not
/// been resolved. A deliberate fallback, not an error.
const UNRESOLVED_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// A texture maps surface coordinates (and the hit point) to a color.
pub enum Texture {
    SolidColor {
        albedo: Color,
    },
    /// 3-D checker lattice: parity of the summed integer lattice coordinates
    /// picks one of two child textures.
    Checker {
        inv_scale: f32,
        even: Box<Texture>,
        odd: Box<Texture>,
    },
    /// Image sampled by UV. Constructed unresolved; `prepare` fills in the
    /// decoded buffer during the scene-build phase.
    Image {
        source: String,
        image: Option<Arc<ImageData>>,
    },
    /// Perlin turbulence marble pattern.
    Noise {
        scale: f32,
        noise: Perlin,
    },
}

impl Texture {
    pub fn solid(albedo: Color) -> Self {
        Texture::SolidColor { albedo }
    }

    pub fn checker(scale: f32, even: Texture, odd: Texture) -> Self {
        Texture::Checker {
            inv_scale: 1.0 / scale,
            even: Box::new(even),
            odd: Box::new(odd),
        }
    }

    pub fn image(source: impl Into<String>) -> Self {
        Texture::Image {
            source: source.into(),
            image: None,
        }
    }

    pub fn noise(scale: f32, seed: u64) -> Self {
        Texture::Noise {
            scale,
            noise: Perlin::new(seed),
        }
    }

    /// Resolve deferred image loads through the asset cache.
    ///
    /// Called once per texture during scene build, before any `value` call.
    /// A failed load is logged and leaves the texture unresolved; sampling
    /// then yields the debug color instead of failing the render.
    pub fn prepare(&mut self, assets: &mut AssetCache) {
        match self {
            Texture::Image { source, image } => match assets.fetch(source) {
                Ok(data) => *image = Some(data),
                Err(e) => log::warn!("asset '{}' unavailable: {}", source, e),
            },
            Texture::Checker { even, odd, .. } => {
                even.prepare(assets);
                odd.prepare(assets);
            }
            _ => {}
        }
    }

    /// Sample the texture.
    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::SolidColor { albedo } => *albedo,

            Texture::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let x = (inv_scale * p.x).floor() as i64;
                let y = (inv_scale * p.y).floor() as i64;
                let z = (inv_scale * p.z).floor() as i64;

                if (x + y + z) % 2 == 0 {
                    even.value(u, v, p)
                } else {
                    odd.value(u, v, p)
                }
            }

            Texture::Image { image, .. } => {
                let Some(image) = image else {
                    return UNRESOLVED_COLOR;
                };
                let u = u.clamp(0.0, 1.0);
                let v = 1.0 - v.clamp(0.0, 1.0); // flip V to image coordinates

                let i = (u * image.width as f32) as u32;
                let j = (v * image.height as f32) as u32;
                let pixel = image.pixel(i, j);
                Color::new(pixel[0], pixel[1], pixel[2])
            }

            Texture::Noise { scale, noise } => {
                Color::splat(0.5) * (1.0 + (scale * p.z + 10.0 * noise.turb(p, 7)).sin())
            }
        }
    }
}
