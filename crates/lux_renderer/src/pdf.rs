//! Sampling densities for importance-sampled scatter directions.

use crate::gen_f32;
use crate::hittable::Primitive;
use crate::material::random_unit_vector;
use lux_math::{Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A probability density over directions on the sphere.
///
/// `value` returns the density of a direction; `generate` draws one.
/// By construction each variant integrates to one over the sphere.
pub enum Pdf<'a> {
    /// Uniform over the whole sphere.
    Sphere,
    /// Cosine-weighted about a normal.
    Cosine(Onb),
    /// Importance-sampled toward a shape (typically the light list).
    Toward { objects: &'a Primitive, origin: Vec3 },
    /// 50/50 blend of two densities: the standard combination of BRDF
    /// sampling and light sampling for direct lighting.
    Mixture(Box<Pdf<'a>>, Box<Pdf<'a>>),
}

impl<'a> Pdf<'a> {
    /// Cosine-weighted density about `normal`.
    pub fn cosine(normal: Vec3) -> Pdf<'static> {
        Pdf::Cosine(Onb::new(normal))
    }

    /// Density concentrated on the directions subtended by `objects`.
    pub fn toward(objects: &'a Primitive, origin: Vec3) -> Pdf<'a> {
        Pdf::Toward { objects, origin }
    }

    /// Equal-weight mixture of two densities.
    pub fn mixture(a: Pdf<'a>, b: Pdf<'a>) -> Pdf<'a> {
        Pdf::Mixture(Box::new(a), Box::new(b))
    }

    /// Probability density of `direction`.
    pub fn value(&self, direction: Vec3) -> f32 {
        match self {
            Pdf::Sphere => 1.0 / (4.0 * PI),

            Pdf::Cosine(uvw) => {
                let cos_theta = direction.normalize().dot(uvw.w);
                (cos_theta / PI).max(0.0)
            }

            Pdf::Toward { objects, origin } => objects.pdf_value(*origin, direction),

            Pdf::Mixture(a, b) => 0.5 * a.value(direction) + 0.5 * b.value(direction),
        }
    }

    /// Draw a direction from the density.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Pdf::Sphere => random_unit_vector(rng),

            Pdf::Cosine(uvw) => uvw.transform(random_cosine_direction(rng)),

            Pdf::Toward { objects, origin } => objects.random_toward(*origin, rng),

            Pdf::Mixture(a, b) => {
                if gen_f32(rng) < 0.5 {
                    a.generate(rng)
                } else {
                    b.generate(rng)
                }
            }
        }
    }
}

/// Cosine-weighted direction in local coordinates (+z up).
fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);

    let phi = 2.0 * PI * r1;
    let x = phi.cos() * r2.sqrt();
    let y = phi.sin() * r2.sqrt();
    let z = (1.0 - r2).sqrt();

    Vec3::new(x, y, z)
}
