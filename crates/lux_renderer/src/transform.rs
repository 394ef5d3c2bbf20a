//! Affine-transform wrappers: translation and rotation about Y.
//!
//! Both transform the incoming ray into object space, delegate to the
//! wrapped primitive, and map the hit back out; the wrapped object is never
//! mutated.

use crate::hittable::{HitRecord, Primitive};
use lux_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// Moves a primitive by a fixed offset.
pub struct Translate {
    object: Arc<Primitive>,
    offset: Vec3,
    bbox: Aabb,
}

impl Translate {
    pub fn new(object: Arc<Primitive>, offset: Vec3) -> Self {
        let bbox = object.bounding_box().translate(offset);
        Self {
            object,
            offset,
            bbox,
        }
    }

    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        // Move the ray backwards by the offset
        let offset_ray = Ray::new(ray.origin - self.offset, ray.direction, ray.time);

        if !self.object.hit(&offset_ray, ray_t, rec) {
            return false;
        }

        // Move the intersection point forwards by the offset
        rec.p += self.offset;
        true
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Rotates a primitive about the world Y axis.
pub struct RotateY {
    object: Arc<Primitive>,
    sin_theta: f32,
    cos_theta: f32,
    bbox: Aabb,
}

impl RotateY {
    pub fn new(object: Arc<Primitive>, angle_degrees: f32) -> Self {
        let radians = angle_degrees.to_radians();
        let sin_theta = radians.sin();
        let cos_theta = radians.cos();

        // Rotate all 8 corners of the wrapped box and take their extent.
        let bbox = object.bounding_box();
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    let x = if i == 0 { bbox.x.min } else { bbox.x.max };
                    let y = if j == 0 { bbox.y.min } else { bbox.y.max };
                    let z = if k == 0 { bbox.z.min } else { bbox.z.max };

                    let new_x = cos_theta * x + sin_theta * z;
                    let new_z = -sin_theta * x + cos_theta * z;

                    let corner = Vec3::new(new_x, y, new_z);
                    min = min.min(corner);
                    max = max.max(corner);
                }
            }
        }

        Self {
            object,
            sin_theta,
            cos_theta,
            bbox: Aabb::from_points(min, max),
        }
    }

    fn to_object_space(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    fn to_world_space(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let rotated = Ray::new(
            self.to_object_space(ray.origin),
            self.to_object_space(ray.direction),
            ray.time,
        );

        if !self.object.hit(&rotated, ray_t, rec) {
            return false;
        }

        rec.p = self.to_world_space(rec.p);
        rec.normal = self.to_world_space(rec.normal);
        true
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
