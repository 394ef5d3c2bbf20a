//! Core path tracing estimator.
//!
//! Recursive Monte Carlo estimation of the radiance arriving along a ray,
//! combining material sampling with light-importance sampling, plus the
//! linear-to-display conversion applied to finished pixels.

use crate::hittable::{HitRecord, Primitive};
use crate::material::Scatter;
use crate::pdf::Pdf;
use crate::{Camera, Color};
use lux_math::{Interval, Ray};
use rand::RngCore;

/// Compute the color seen by a ray.
///
/// Termination is by fixed depth: a path that exhausts its bounce budget
/// contributes black. Secondary rays start at t=0.001 to avoid
/// re-intersecting the surface they left.
pub fn ray_color(
    ray: &Ray,
    depth: u32,
    world: &Primitive,
    lights: Option<&Primitive>,
    background: Color,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();
    if !world.hit(ray, Interval::new(0.001, f32::INFINITY), &mut rec) {
        return background;
    }

    let emitted = rec.material.emitted(&rec);

    let Some(scatter) = rec.material.scatter(ray, &rec, rng) else {
        // Absorbed: light sources and full absorbers terminate here.
        return emitted;
    };

    match scatter.scatter {
        Scatter::Specular(specular_ray) => {
            // Deterministic bounce: no density weighting.
            scatter.attenuation
                * ray_color(&specular_ray, depth - 1, world, lights, background, rng)
        }

        Scatter::Diffuse(surface_pdf) => {
            // Blend the material's density with light sampling when the
            // scene carries a light list.
            let pdf = match lights {
                Some(lights) => Pdf::mixture(Pdf::toward(lights, rec.p), surface_pdf),
                None => surface_pdf,
            };

            let direction = pdf.generate(rng);
            let pdf_value = pdf.value(direction);

            let scattered = Ray::new(rec.p, direction, ray.time);
            let scattering_pdf = rec.material.scattering_pdf(ray, &rec, &scattered);

            let incoming = ray_color(&scattered, depth - 1, world, lights, background, rng);
            let weighted = scatter.attenuation * scattering_pdf * incoming / pdf_value;

            // A zero-density direction yields a non-finite weight; count it
            // as a zero contribution rather than poisoning the pixel.
            if weighted.is_finite() {
                emitted + weighted
            } else {
                emitted
            }
        }
    }
}

/// Render a single pixel: one jittered sample per stratification cell,
/// averaged.
pub fn render_pixel(
    camera: &Camera,
    world: &Primitive,
    lights: Option<&Primitive>,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for sj in 0..camera.sqrt_spp() {
        for si in 0..camera.sqrt_spp() {
            let ray = camera.get_ray(x, y, si, sj, rng);
            pixel_color += ray_color(
                &ray,
                camera.max_depth,
                world,
                lights,
                camera.background,
                rng,
            );
        }
    }

    pixel_color * camera.samples_scale()
}

/// Linear to display mapping (gamma 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA with gamma applied; alpha is 255.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let intensity = Interval::new(0.0, 0.999);
    let r = (256.0 * intensity.clamp(linear_to_gamma(color.x))) as u8;
    let g = (256.0 * intensity.clamp(linear_to_gamma(color.y))) as u8;
    let b = (256.0 * intensity.clamp(linear_to_gamma(color.z))) as u8;
    [r, g, b, 255]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::texture::Texture;
    use crate::{BvhNode, PrimitiveList, Quad, Sphere};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn single_sphere_world(material: Material) -> Primitive {
        BvhNode::build(vec![Arc::new(Primitive::Sphere(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(material),
        )))])
    }

    #[test]
    fn test_depth_zero_is_black() {
        let world = single_sphere_world(Material::Lambertian {
            texture: Texture::solid(Color::splat(0.5)),
        });
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rng = StdRng::seed_from_u64(1);

        let c = ray_color(&ray, 0, &world, None, Color::ONE, &mut rng);
        assert_eq!(c, Color::ZERO);
    }

    #[test]
    fn test_miss_returns_background() {
        let world = single_sphere_world(Material::Lambertian {
            texture: Texture::solid(Color::splat(0.5)),
        });
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        let mut rng = StdRng::seed_from_u64(2);

        let background = Color::new(0.1, 0.2, 0.3);
        let c = ray_color(&ray, 10, &world, None, background, &mut rng);
        assert_eq!(c, background);
    }

    #[test]
    fn test_emitter_returns_its_radiance() {
        let world = single_sphere_world(Material::DiffuseLight {
            texture: Texture::solid(Color::new(4.0, 3.0, 2.0)),
        });
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rng = StdRng::seed_from_u64(3);

        let c = ray_color(&ray, 10, &world, None, Color::ZERO, &mut rng);
        assert_eq!(c, Color::new(4.0, 3.0, 2.0));
    }

    #[test]
    fn test_lambertian_under_flat_white_converges_to_albedo() {
        // Under a uniform white background every path terminates on the
        // background, so the expected radiance at the first bounce is the
        // albedo itself. Average enough samples and compare.
        let albedo = Color::new(0.5, 0.5, 0.5);
        let world = single_sphere_world(Material::Lambertian {
            texture: Texture::solid(albedo),
        });
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rng = StdRng::seed_from_u64(4);

        let samples = 2000;
        let mut sum = Color::ZERO;
        for _ in 0..samples {
            sum += ray_color(&ray, 50, &world, None, Color::ONE, &mut rng);
        }
        let mean = sum / samples as f32;

        // E[color] = albedo * 1.0 plus higher-order self-occlusion terms;
        // generous tolerance for Monte-Carlo noise.
        assert!(
            (mean.x - 0.5).abs() < 0.05,
            "mean {:?} too far from albedo",
            mean
        );
        assert!((mean.x - mean.y).abs() < 0.02);
        assert!((mean.x - mean.z).abs() < 0.02);
    }

    #[test]
    fn test_light_sampling_agrees_with_brdf_sampling() {
        // A diffuse floor lit by an overhead quad: estimates with and
        // without light-importance sampling must agree in expectation.
        let mut objects = PrimitiveList::new();
        objects.add(Arc::new(Primitive::Quad(Quad::new(
            Vec3::new(-50.0, 0.0, -50.0),
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 100.0),
            Arc::new(Material::Lambertian {
                texture: Texture::solid(Color::splat(0.7)),
            }),
        ))));
        let light_quad = |mat: Arc<Material>| {
            Quad::new(
                Vec3::new(-2.0, 6.0, -2.0),
                Vec3::new(4.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 4.0),
                mat,
            )
        };
        let light_mat = Arc::new(Material::DiffuseLight {
            texture: Texture::solid(Color::splat(8.0)),
        });
        objects.add(Arc::new(Primitive::Quad(light_quad(light_mat.clone()))));

        let world = BvhNode::build(objects.into_objects());
        let lights = Primitive::Quad(light_quad(light_mat));

        let ray = Ray::new(Vec3::new(0.0, 3.0, 8.0), Vec3::new(0.0, -3.0, -8.0), 0.0);
        let mut rng = StdRng::seed_from_u64(5);

        let estimate = |lights: Option<&Primitive>, rng: &mut StdRng| {
            let samples = 4000;
            let mut sum = Color::ZERO;
            for _ in 0..samples {
                sum += ray_color(&ray, 8, &world, lights, Color::ZERO, rng);
            }
            sum / samples as f32
        };

        let with_lights = estimate(Some(&lights), &mut rng);
        let without = estimate(None, &mut rng);

        assert!(with_lights.x > 0.0, "lit floor must not be black");
        assert!(
            (with_lights.x - without.x).abs() < 0.25 * without.x.max(0.1),
            "importance sampling changed the mean: {:?} vs {:?}",
            with_lights,
            without
        );
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 1e-4);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_color_to_rgba() {
        let [r, g, b, a] = color_to_rgba(Color::new(0.0, 0.25, 1.0));
        assert_eq!(r, 0);
        assert_eq!(g, 128);
        assert_eq!(b, 255);
        assert_eq!(a, 255);

        // Out-of-range radiance clamps instead of wrapping.
        let [r, _, _, _] = color_to_rgba(Color::new(15.0, 0.0, 0.0));
        assert_eq!(r, 255);
    }

    #[test]
    fn test_render_pixel_averages_samples() {
        let world = single_sphere_world(Material::Lambertian {
            texture: Texture::solid(Color::splat(0.5)),
        });
        let mut camera = Camera::new()
            .with_image(1.0, 11)
            .with_quality(16, 4)
            .with_background(Color::new(0.5, 0.7, 1.0));
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(6);
        let color = render_pixel(&camera, &world, None, 5, 5, &mut rng);

        // Center pixel hits the sphere; the result is a bounded average,
        // not a sum over samples.
        assert!(color.length() > 0.0);
        assert!(color.max_element() <= 1.0);
    }
}
