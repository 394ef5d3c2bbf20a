//! Constant-density participating medium.

use crate::hittable::{HitRecord, Primitive};
use crate::material::Material;
use crate::texture::Texture;
use lux_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// A volume of constant density filling a boundary shape.
///
/// A ray entering the boundary scatters after an exponentially distributed
/// free path; if the sampled path leaves the boundary first, the ray passes
/// through. Volume hits have no real surface, so the recorded normal and
/// face flag are arbitrary.
pub struct ConstantMedium {
    boundary: Arc<Primitive>,
    neg_inv_density: f32,
    phase_function: Arc<Material>,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<Primitive>, density: f32, texture: Texture) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Arc::new(Material::Isotropic { texture }),
        }
    }

    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        // The ray must cross the boundary twice: once in, once out.
        let mut rec1 = HitRecord::default();
        if !self.boundary.hit(ray, Interval::UNIVERSE, &mut rec1) {
            return false;
        }

        let mut rec2 = HitRecord::default();
        let after_entry = Interval::new(rec1.t + 0.0001, f32::INFINITY);
        if !self.boundary.hit(ray, after_entry, &mut rec2) {
            return false;
        }

        let mut t1 = rec1.t.max(ray_t.min);
        let t2 = rec2.t.min(ray_t.max);
        if t1 >= t2 {
            return false;
        }
        if t1 < 0.0 {
            t1 = 0.0;
        }

        let ray_length = ray.direction.length();
        let distance_inside_boundary = (t2 - t1) * ray_length;
        let hit_distance = self.neg_inv_density * rand::random::<f32>().ln();

        if hit_distance > distance_inside_boundary {
            return false;
        }

        rec.t = t1 + hit_distance / ray_length;
        rec.p = ray.at(rec.t);
        rec.normal = Vec3::X; // arbitrary
        rec.front_face = true; // also arbitrary
        rec.material = self.phase_function.as_ref();

        true
    }

    pub fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }
}
