//! The geometry family and ray-object intersection records.

use crate::material::{Material, ABSORB};
use crate::{BvhNode, ConstantMedium, Quad, RotateY, Sphere, Translate};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::{Rng, RngCore};
use std::sync::Arc;

/// Record of a ray-object intersection.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at the intersection (always points against the ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Ray parameter of the intersection
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: &ABSORB,
            u: 0.0,
            v: 0.0,
            t: 0.0,
            front_face: false,
        }
    }
}

impl<'a> HitRecord<'a> {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is stored pointing against the ray; `front_face` records
    /// the original orientation.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// A geometric scene node.
///
/// The family is a closed set of variants dispatched by match; it mirrors
/// the tagged-variant tree the scene description serializes to. Children are
/// shared via `Arc` so a shape can appear both in the world and as, say, a
/// medium boundary or a singleton BVH leaf.
pub enum Primitive {
    Sphere(Sphere),
    Quad(Quad),
    Medium(ConstantMedium),
    Translate(Translate),
    RotateY(RotateY),
    List(PrimitiveList),
    Bvh(BvhNode),
}

impl Primitive {
    /// Test if a ray hits this node within the given interval.
    ///
    /// Returns true if hit, and fills in the hit record.
    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t, rec),
            Primitive::Quad(q) => q.hit(ray, ray_t, rec),
            Primitive::Medium(m) => m.hit(ray, ray_t, rec),
            Primitive::Translate(t) => t.hit(ray, ray_t, rec),
            Primitive::RotateY(r) => r.hit(ray, ray_t, rec),
            Primitive::List(l) => l.hit(ray, ray_t, rec),
            Primitive::Bvh(b) => b.hit(ray, ray_t, rec),
        }
    }

    /// Axis-aligned bounding box, valid over the node's whole time range.
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Quad(q) => q.bounding_box(),
            Primitive::Medium(m) => m.bounding_box(),
            Primitive::Translate(t) => t.bounding_box(),
            Primitive::RotateY(r) => r.bounding_box(),
            Primitive::List(l) => l.bounding_box(),
            Primitive::Bvh(b) => b.bounding_box(),
        }
    }

    /// Probability density of sampling `direction` from `origin` toward this
    /// shape. Only shapes usable as light-sampling targets return non-zero.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        match self {
            Primitive::Sphere(s) => s.pdf_value(origin, direction),
            Primitive::Quad(q) => q.pdf_value(origin, direction),
            Primitive::List(l) => l.pdf_value(origin, direction),
            _ => 0.0,
        }
    }

    /// Draw a direction from `origin` toward this shape.
    pub fn random_toward(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Primitive::Sphere(s) => s.random_toward(origin, rng),
            Primitive::Quad(q) => q.random_toward(origin, rng),
            Primitive::List(l) => l.random_toward(origin, rng),
            _ => Vec3::X,
        }
    }
}

/// An unordered group of primitives.
pub struct PrimitiveList {
    objects: Vec<Arc<Primitive>>,
    bbox: Aabb,
}

impl PrimitiveList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object, growing the list's box to cover it.
    pub fn add(&mut self, object: Arc<Primitive>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[Arc<Primitive>] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<Arc<Primitive>> {
        self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if object.hit(ray, interval, rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Average of the member densities.
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.objects.is_empty() {
            return 0.0;
        }
        let weight = 1.0 / self.objects.len() as f32;
        self.objects
            .iter()
            .map(|o| weight * o.pdf_value(origin, direction))
            .sum()
    }

    /// Sample a uniformly chosen member.
    pub fn random_toward(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }
        let i = rng.gen_range(0..self.objects.len());
        self.objects[i].random_toward(origin, rng)
    }
}

impl Default for PrimitiveList {
    fn default() -> Self {
        Self::new()
    }
}
