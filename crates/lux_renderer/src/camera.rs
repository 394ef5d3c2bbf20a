//! Camera for primary ray generation.

use crate::{gen_f32, Color};
use lux_core::describe::CameraDesc;
use lux_math::{Ray, Vec3};
use rand::RngCore;

/// Camera for generating rays into the scene.
///
/// Configured once, then `initialize` precomputes the pixel grid and lens
/// bases; nothing is mutated during rendering. Sub-pixel sampling is
/// stratified: samples per pixel is rounded down to a square grid and one
/// jittered sample is drawn per sub-cell.
#[derive(Clone)]
pub struct Camera {
    // Image settings
    pub aspect_ratio: f32,
    pub image_width: u32,
    pub image_height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub background: Color,

    // Camera positioning
    lookfrom: Vec3,
    lookat: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,          // Vertical field of view in degrees
    defocus_angle: f32, // Variation angle of rays through each pixel
    focus_dist: f32,    // Distance from camera to plane of perfect focus

    // Cached computed values (set by initialize())
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
    sqrt_spp: u32,
    recip_sqrt_spp: f32,
    samples_scale: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            aspect_ratio: 16.0 / 9.0,
            image_width: 400,
            image_height: 225,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            lookfrom: Vec3::ZERO,
            lookat: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
            sqrt_spp: 10,
            recip_sqrt_spp: 0.1,
            samples_scale: 0.01,
        }
    }

    /// Set aspect ratio and image width; height is derived.
    pub fn with_image(mut self, aspect_ratio: f32, image_width: u32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.image_width = image_width;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, lookfrom: Vec3, lookat: Vec3, vup: Vec3) -> Self {
        self.lookfrom = lookfrom;
        self.lookat = lookat;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Set background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Image height for a given width and aspect ratio.
    pub fn height_for(aspect_ratio: f32, image_width: u32) -> u32 {
        ((image_width as f32 / aspect_ratio) as u32).max(1)
    }

    /// Build a camera from its serialized description.
    pub fn from_desc(desc: &CameraDesc) -> Self {
        let mut camera = Camera::new()
            .with_image(desc.aspect_ratio, desc.image_width)
            .with_quality(desc.samples_per_pixel, desc.max_depth)
            .with_position(desc.lookfrom.into(), desc.lookat.into(), desc.vup.into())
            .with_lens(desc.vfov, desc.defocus_angle, desc.focus_dist)
            .with_background(desc.background.into());
        camera.initialize();
        camera
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        self.image_height = Self::height_for(self.aspect_ratio, self.image_width);

        self.sqrt_spp = (self.samples_per_pixel as f32).sqrt() as u32;
        self.sqrt_spp = self.sqrt_spp.max(1);
        self.recip_sqrt_spp = 1.0 / self.sqrt_spp as f32;
        self.samples_scale = 1.0 / (self.sqrt_spp * self.sqrt_spp) as f32;

        self.center = self.lookfrom;

        // Viewport dimensions from the vertical field of view
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Camera basis vectors
        self.w = (self.lookfrom - self.lookat).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Viewport edge vectors and per-pixel deltas
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;
        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        let viewport_upper_left =
            self.center - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        // Defocus disk basis vectors
        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;
    }

    /// Generate a ray through pixel (i, j), jittered within stratification
    /// cell (si, sj), carrying a random time for motion blur.
    pub fn get_ray(&self, i: u32, j: u32, si: u32, sj: u32, rng: &mut dyn RngCore) -> Ray {
        // Jittered offset inside the sub-cell, centered on the pixel
        let offset_x = (si as f32 + gen_f32(rng)) * self.recip_sqrt_spp - 0.5;
        let offset_y = (sj as f32 + gen_f32(rng)) * self.recip_sqrt_spp - 0.5;

        let pixel_sample = self.pixel00_loc
            + (i as f32 + offset_x) * self.pixel_delta_u
            + (j as f32 + offset_y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin, gen_f32(rng))
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }

    /// Side length of the stratified sub-pixel grid.
    pub fn sqrt_spp(&self) -> u32 {
        self.sqrt_spp
    }

    /// 1 / effective samples per pixel.
    pub fn samples_scale(&self) -> f32 {
        self.samples_scale
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample a random point in the unit disk.
fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_image_height_derived_from_aspect() {
        let mut camera = Camera::new().with_image(16.0 / 9.0, 400);
        camera.initialize();
        assert_eq!(camera.image_height, 225);

        let mut camera = Camera::new().with_image(1.0, 600);
        camera.initialize();
        assert_eq!(camera.image_height, 600);

        // Height never collapses to zero
        let mut camera = Camera::new().with_image(100.0, 10);
        camera.initialize();
        assert_eq!(camera.image_height, 1);
    }

    #[test]
    fn test_stratification_factor() {
        let mut camera = Camera::new().with_quality(100, 50);
        camera.initialize();
        assert_eq!(camera.sqrt_spp(), 10);
        assert!((camera.samples_scale() - 0.01).abs() < 1e-6);

        // Non-square counts round down
        let mut camera = Camera::new().with_quality(90, 50);
        camera.initialize();
        assert_eq!(camera.sqrt_spp(), 9);

        let mut camera = Camera::new().with_quality(1, 50);
        camera.initialize();
        assert_eq!(camera.sqrt_spp(), 1);
        assert_eq!(camera.samples_scale(), 1.0);
    }

    #[test]
    fn test_camera_basis_faces_target() {
        let mut camera = Camera::new()
            .with_image(1.0, 100)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();

        assert!((camera.w - Vec3::Z).length() < 1e-5);

        // Center ray points roughly towards -Z
        let mut rng = StdRng::seed_from_u64(42);
        let ray = camera.get_ray(50, 50, 0, 0, &mut rng);
        assert!(ray.direction.z < 0.0);
        assert!(ray.direction.x.abs() < 0.1 * ray.direction.z.abs());
    }

    #[test]
    fn test_pinhole_rays_share_origin() {
        let mut camera = Camera::new().with_lens(90.0, 0.0, 1.0);
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            let ray = camera.get_ray(0, 0, 0, 0, &mut rng);
            assert_eq!(ray.origin, Vec3::ZERO);
            assert!((0.0..1.0).contains(&ray.time));
        }
    }

    #[test]
    fn test_defocus_jitters_ray_origin() {
        let mut camera = Camera::new()
            .with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
            .with_lens(40.0, 2.0, 5.0);
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(2);
        let jittered = (0..20)
            .map(|_| camera.get_ray(0, 0, 0, 0, &mut rng))
            .filter(|r| (r.origin - Vec3::new(0.0, 0.0, 5.0)).length() > 1e-6)
            .count();
        assert!(jittered > 0);
    }

    #[test]
    fn test_stratified_cells_partition_the_pixel() {
        // With a 2x2 grid, samples from opposite corner cells stay on their
        // side of the pixel center.
        let mut camera = Camera::new().with_image(1.0, 100).with_quality(4, 10);
        camera.initialize();
        assert_eq!(camera.sqrt_spp(), 2);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let low = camera.get_ray(50, 50, 0, 0, &mut rng);
            let high = camera.get_ray(50, 50, 1, 1, &mut rng);
            // pixel_delta_v points down the image, so compare along it.
            let low_proj = low.direction.dot(camera.pixel_delta_u);
            let high_proj = high.direction.dot(camera.pixel_delta_u);
            assert!(low_proj < high_proj);
        }
    }
}
