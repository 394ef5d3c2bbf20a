//! Sphere primitive.

use crate::gen_f32;
use crate::hittable::HitRecord;
use crate::material::Material;
use lux_math::{Aabb, Interval, Onb, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere, possibly moving linearly between two centers over the shutter
/// interval. The center is stored as a ray so `center.at(time)` samples the
/// motion.
pub struct Sphere {
    center: Ray,
    radius: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        Self::new_moving(center, center, radius, material)
    }

    /// Create a sphere moving from `center1` at time 0 to `center2` at time 1.
    pub fn new_moving(center1: Vec3, center2: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let center = Ray::new(center1, center2 - center1, 0.0);

        // Box covering the sphere at both ends of its motion.
        let rvec = Vec3::splat(radius);
        let box0 = Aabb::from_points(center.at(0.0) - rvec, center.at(0.0) + rvec);
        let box1 = Aabb::from_points(center.at(1.0) - rvec, center.at(1.0) + rvec);
        let bbox = Aabb::surrounding(&box0, &box1);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    /// UV coordinates for a point on the unit sphere centered at the origin.
    ///
    /// u: angle around the Y axis from X=-1, in [0,1].
    /// v: angle from Y=-1 up to Y=+1, in [0,1].
    fn sphere_uv(p: Vec3) -> (f32, f32) {
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        (phi / (2.0 * PI), theta / PI)
    }

    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let current_center = self.center.at(ray.time);
        let oc = current_center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.p = ray.at(rec.t);
        let outward_normal = (rec.p - current_center) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        (rec.u, rec.v) = Self::sphere_uv(outward_normal);
        rec.material = self.material.as_ref();

        true
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Density of sampling `direction` from `origin` toward this sphere,
    /// uniform over its subtended solid angle. Motion is ignored; lights are
    /// sampled at their time-0 position.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let mut rec = HitRecord::default();
        let ray = Ray::new(origin, direction, 0.0);
        if !self.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec) {
            return 0.0;
        }

        let distance_squared = (self.center.at(0.0) - origin).length_squared();
        let cos_theta_max = (1.0 - self.radius * self.radius / distance_squared).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        1.0 / solid_angle
    }

    /// Draw a direction from `origin` toward the sphere, uniform over the
    /// cone it subtends.
    pub fn random_toward(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center.at(0.0) - origin;
        let distance_squared = direction.length_squared();
        let uvw = Onb::new(direction);
        uvw.transform(random_to_sphere(self.radius, distance_squared, rng))
    }
}

/// Sample a direction inside the cone subtended by a sphere of `radius` at
/// squared distance `distance_squared`, in cone-local coordinates (+z toward
/// the sphere center).
fn random_to_sphere(radius: f32, distance_squared: f32, rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);
    let cos_theta_max = (1.0 - radius * radius / distance_squared).sqrt();
    let z = 1.0 + r2 * (cos_theta_max - 1.0);

    let phi = 2.0 * PI * r1;
    let sin_theta = (1.0 - z * z).sqrt();
    Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, z)
}
