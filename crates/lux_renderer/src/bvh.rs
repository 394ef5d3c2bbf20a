//! Bounding Volume Hierarchy acceleration structure.

use crate::hittable::{HitRecord, Primitive, PrimitiveList};
use lux_math::{Aabb, Interval, Ray};
use std::sync::Arc;

/// A binary BVH node.
///
/// Built by median split: sort the objects by bounding-box minimum along the
/// longest axis of their aggregate box and split at the midpoint index. Not
/// a surface-area-heuristic optimum, but intersection cost dominates over
/// construction cost for the scene sizes involved.
pub struct BvhNode {
    left: Arc<Primitive>,
    right: Arc<Primitive>,
    bbox: Aabb,
}

impl BvhNode {
    /// Build a BVH over a list of primitives.
    ///
    /// A single object becomes a node whose children alias it; an empty list
    /// becomes an empty group that hits nothing.
    pub fn build(mut objects: Vec<Arc<Primitive>>) -> Primitive {
        if objects.is_empty() {
            return Primitive::List(PrimitiveList::new());
        }

        let bbox = objects
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounding_box()));
        let axis = bbox.longest_axis();

        let (left, right) = match objects.len() {
            1 => {
                let only = objects.remove(0);
                (only.clone(), only)
            }
            2 => {
                let right = objects.remove(1);
                (objects.remove(0), right)
            }
            n => {
                objects.sort_unstable_by(|a, b| {
                    let a_min = a.bounding_box().axis_interval(axis).min;
                    let b_min = b.bounding_box().axis_interval(axis).min;
                    a_min.partial_cmp(&b_min).unwrap_or(std::cmp::Ordering::Equal)
                });

                let right_objects = objects.split_off(n / 2);
                (
                    Arc::new(Self::build(objects)),
                    Arc::new(Self::build(right_objects)),
                )
            }
        };

        Primitive::Bvh(BvhNode { left, right, bbox })
    }

    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if !self.bbox.hit(ray, ray_t) {
            return false;
        }

        let hit_left = self.left.hit(ray, ray_t, rec);

        // Only search the right subtree up to the closest hit so far.
        let right_max = if hit_left { rec.t } else { ray_t.max };
        let hit_right = self
            .right
            .hit(ray, Interval::new(ray_t.min, right_max), rec);

        hit_left || hit_right
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::texture::Texture;
    use crate::{Color, Sphere};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sphere(center: Vec3, radius: f32) -> Arc<Primitive> {
        Arc::new(Primitive::Sphere(Sphere::new(
            center,
            radius,
            Arc::new(Material::Lambertian {
                texture: Texture::solid(Color::splat(0.5)),
            }),
        )))
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = BvhNode::build(vec![sphere(Vec3::new(0.0, 0.0, -1.0), 0.5)]);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_bvh_empty_hits_nothing() {
        let bvh = BvhNode::build(vec![]);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rec = HitRecord::default();
        assert!(!bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_bvh_finds_closest_among_many() {
        let objects: Vec<Arc<Primitive>> = (0..10)
            .map(|i| sphere(Vec3::new(i as f32, 0.0, -5.0), 0.5))
            .collect();
        let bvh = BvhNode::build(objects);

        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.p.z - (-4.5)).abs() < 0.01);
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        // BVH intersection must agree exactly with a brute-force scan over
        // the same primitives, for randomized scenes and rays.
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let objects: Vec<Arc<Primitive>> = (0..rng.gen_range(1..40))
                .map(|_| {
                    let center = Vec3::new(
                        rng.gen_range(-10.0..10.0),
                        rng.gen_range(-10.0..10.0),
                        rng.gen_range(-10.0..10.0),
                    );
                    sphere(center, rng.gen_range(0.1..2.0))
                })
                .collect();

            let mut list = PrimitiveList::new();
            for o in &objects {
                list.add(o.clone());
            }
            let bvh = BvhNode::build(objects);

            for _ in 0..50 {
                let origin = Vec3::new(
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-20.0..20.0),
                );
                let direction = Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                );
                if direction.length_squared() < 1e-6 {
                    continue;
                }
                let ray = Ray::new(origin, direction, 0.0);
                let interval = Interval::new(0.001, f32::INFINITY);

                let mut bvh_rec = HitRecord::default();
                let mut list_rec = HitRecord::default();
                let bvh_hit = bvh.hit(&ray, interval, &mut bvh_rec);
                let list_hit = list.hit(&ray, interval, &mut list_rec);

                assert_eq!(bvh_hit, list_hit, "hit disagreement for ray {:?}", ray);
                if bvh_hit {
                    assert!(
                        (bvh_rec.t - list_rec.t).abs() < 1e-4,
                        "t disagreement: {} vs {}",
                        bvh_rec.t,
                        list_rec.t
                    );
                    assert!((bvh_rec.p - list_rec.p).length() < 1e-3);
                    assert!(std::ptr::eq(bvh_rec.material, list_rec.material));
                }
            }
        }
    }

    #[test]
    fn test_bvh_box_bounds_all_children() {
        let objects: Vec<Arc<Primitive>> = (0..8)
            .map(|i| sphere(Vec3::new(i as f32 * 3.0, 0.0, 0.0), 1.0))
            .collect();
        let boxes: Vec<Aabb> = objects.iter().map(|o| o.bounding_box()).collect();
        let bvh = BvhNode::build(objects);

        let root = bvh.bounding_box();
        for b in boxes {
            assert!(root.x.min <= b.x.min && root.x.max >= b.x.max);
            assert!(root.y.min <= b.y.min && root.y.max >= b.y.max);
            assert!(root.z.min <= b.z.min && root.z.max >= b.z.max);
        }
    }
}
