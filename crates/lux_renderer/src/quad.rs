//! Planar parallelogram primitive.

use crate::gen_f32;
use crate::hittable::HitRecord;
use crate::material::Material;
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A parallelogram spanned by edge vectors `u` and `v` from corner `q`.
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// n / (n.n), used to project hit points onto planar coordinates
    w: Vec3,
    normal: Vec3,
    d: f32,
    area: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: Arc<Material>) -> Self {
        let n = u.cross(v);
        let normal = n.normalize();
        let d = normal.dot(q);
        let w = n / n.dot(n);
        let area = n.length();

        // Box over both diagonals; padding handles the flat axis.
        let diag1 = Aabb::from_points(q, q + u + v);
        let diag2 = Aabb::from_points(q + u, q + v);
        let bbox = Aabb::surrounding(&diag1, &diag2);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d,
            area,
            material,
            bbox,
        }
    }

    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let denom = self.normal.dot(ray.direction);

        // No hit if the ray is parallel to the plane.
        if denom.abs() < 1e-8 {
            return false;
        }

        let t = (self.d - self.normal.dot(ray.origin)) / denom;
        if !ray_t.contains(t) {
            return false;
        }

        // Planar coordinates of the hit point; inside iff both lie in [0,1].
        let intersection = ray.at(t);
        let planar_hit = intersection - self.q;
        let alpha = self.w.dot(planar_hit.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hit));

        if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
            return false;
        }

        rec.t = t;
        rec.p = intersection;
        rec.u = alpha;
        rec.v = beta;
        rec.material = self.material.as_ref();
        rec.set_face_normal(ray, self.normal);

        true
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Density of sampling `direction` from `origin` toward this quad:
    /// distance squared over projected area.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let mut rec = HitRecord::default();
        let ray = Ray::new(origin, direction, 0.0);
        if !self.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec) {
            return 0.0;
        }

        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();
        distance_squared / (cosine * self.area)
    }

    /// Direction from `origin` to a uniformly sampled point on the quad.
    pub fn random_toward(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.q + self.u * gen_f32(rng) + self.v * gen_f32(rng) - origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::Texture;
    use crate::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn white() -> Arc<Material> {
        Arc::new(Material::Lambertian {
            texture: Texture::solid(Color::splat(0.73)),
        })
    }

    fn unit_quad() -> Quad {
        // Unit square in the z=0 plane
        Quad::new(Vec3::ZERO, Vec3::X, Vec3::Y, white())
    }

    #[test]
    fn test_quad_hit_inside() {
        let quad = unit_quad();
        let ray = Ray::new(Vec3::new(0.25, 0.75, 1.0), Vec3::new(0.0, 0.0, -1.0), 0.0);

        let mut rec = HitRecord::default();
        assert!(quad.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 1.0).abs() < 1e-4);
        // Planar coordinates double as UV
        assert!((rec.u - 0.25).abs() < 1e-4);
        assert!((rec.v - 0.75).abs() < 1e-4);
        assert!(rec.front_face);
    }

    #[test]
    fn test_quad_miss_outside_bounds() {
        let quad = unit_quad();
        let ray = Ray::new(Vec3::new(1.5, 0.5, 1.0), Vec3::new(0.0, 0.0, -1.0), 0.0);

        let mut rec = HitRecord::default();
        assert!(!quad.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_quad_parallel_ray_misses() {
        let quad = unit_quad();
        // Ray travels inside the quad's plane
        let ray = Ray::new(Vec3::new(-1.0, 0.5, 0.0), Vec3::X, 0.0);

        let mut rec = HitRecord::default();
        assert!(!quad.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_quad_sampled_directions_hit_it() {
        let quad = Quad::new(
            Vec3::new(343.0, 554.0, 332.0),
            Vec3::new(-130.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -105.0),
            white(),
        );
        let origin = Vec3::new(278.0, 278.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..200 {
            let dir = quad.random_toward(origin, &mut rng);
            assert!(quad.pdf_value(origin, dir) > 0.0);
        }
    }
}
