//! Serializable scene description.
//!
//! The scheduler hands each worker a scene exactly once per render session,
//! as a JSON tree of tagged variants: every geometry node, material, and
//! texture carries a `type` tag and is reconstructed by dispatching on it.
//! An unknown tag fails deserialization, which the worker reports back as a
//! build failure; no partial scene is ever used.

use lux_math::Vec3;
use serde::{Deserialize, Serialize};

/// A serializable 3-component vector (also used for colors).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3Desc {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3Desc {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for Vec3Desc {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Vec3Desc> for Vec3 {
    fn from(v: Vec3Desc) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// Texture variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TextureDesc {
    /// A single flat color.
    SolidColor { albedo: Vec3Desc },
    /// 3-D checker lattice alternating between two child textures.
    Checker {
        scale: f32,
        even: Box<TextureDesc>,
        odd: Box<TextureDesc>,
    },
    /// UV-mapped image, resolved through the asset loader at build time.
    Image { source: String },
    /// Perlin turbulence. The seed travels with the scene so every worker
    /// rebuilds identical noise.
    Noise { scale: f32, seed: u64 },
}

impl TextureDesc {
    pub fn solid(r: f32, g: f32, b: f32) -> Self {
        TextureDesc::SolidColor {
            albedo: Vec3Desc::new(r, g, b),
        }
    }
}

/// Material variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaterialDesc {
    Lambertian { texture: TextureDesc },
    Metal { albedo: Vec3Desc, fuzz: f32 },
    Dielectric { refraction_index: f32 },
    DiffuseLight { texture: TextureDesc },
    Isotropic { texture: TextureDesc },
}

impl MaterialDesc {
    /// Diffuse material with a flat albedo.
    pub fn lambertian_color(r: f32, g: f32, b: f32) -> Self {
        MaterialDesc::Lambertian {
            texture: TextureDesc::solid(r, g, b),
        }
    }

    /// Emitter with a flat radiance.
    pub fn light_color(r: f32, g: f32, b: f32) -> Self {
        MaterialDesc::DiffuseLight {
            texture: TextureDesc::solid(r, g, b),
        }
    }
}

/// Geometry variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryDesc {
    /// Sphere, optionally moving linearly from `center` to `center2` over
    /// the shutter interval.
    Sphere {
        center: Vec3Desc,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        center2: Option<Vec3Desc>,
        radius: f32,
        material: MaterialDesc,
    },
    /// Planar parallelogram spanned by `u` and `v` from corner `q`.
    Quad {
        q: Vec3Desc,
        u: Vec3Desc,
        v: Vec3Desc,
        material: MaterialDesc,
    },
    /// Participating medium filling a boundary shape.
    ConstantMedium {
        boundary: Box<GeometryDesc>,
        density: f32,
        texture: TextureDesc,
    },
    Translate {
        object: Box<GeometryDesc>,
        offset: Vec3Desc,
    },
    RotateY {
        object: Box<GeometryDesc>,
        angle: f32,
    },
    List { objects: Vec<GeometryDesc> },
}

impl GeometryDesc {
    /// The six quads of an axis-aligned box between two opposite corners.
    pub fn box_from_corners(a: Vec3, b: Vec3, material: MaterialDesc) -> GeometryDesc {
        let min = a.min(b);
        let max = a.max(b);

        let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
        let dy = Vec3::new(0.0, max.y - min.y, 0.0);
        let dz = Vec3::new(0.0, 0.0, max.z - min.z);

        let quad = |q: Vec3, u: Vec3, v: Vec3| GeometryDesc::Quad {
            q: q.into(),
            u: u.into(),
            v: v.into(),
            material: material.clone(),
        };

        GeometryDesc::List {
            objects: vec![
                quad(Vec3::new(min.x, min.y, max.z), dx, dy),  // front
                quad(Vec3::new(max.x, min.y, max.z), -dz, dy), // right
                quad(Vec3::new(max.x, min.y, min.z), -dx, dy), // back
                quad(Vec3::new(min.x, min.y, min.z), dz, dy),  // left
                quad(Vec3::new(min.x, max.y, max.z), dx, -dz), // top
                quad(Vec3::new(min.x, min.y, min.z), dx, dz),  // bottom
            ],
        }
    }
}

/// Per-render camera configuration.
///
/// All fields default so a partial description parses; height is derived
/// from width and aspect ratio when the camera is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDesc {
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f32,
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_samples_per_pixel")]
    pub samples_per_pixel: u32,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default = "default_background")]
    pub background: Vec3Desc,
    #[serde(default = "default_vfov")]
    pub vfov: f32,
    #[serde(default = "default_lookfrom")]
    pub lookfrom: Vec3Desc,
    #[serde(default = "default_lookat")]
    pub lookat: Vec3Desc,
    #[serde(default = "default_vup")]
    pub vup: Vec3Desc,
    #[serde(default)]
    pub defocus_angle: f32,
    #[serde(default = "default_focus_dist")]
    pub focus_dist: f32,
}

fn default_aspect_ratio() -> f32 {
    16.0 / 9.0
}
fn default_image_width() -> u32 {
    400
}
fn default_samples_per_pixel() -> u32 {
    100
}
fn default_max_depth() -> u32 {
    50
}
fn default_background() -> Vec3Desc {
    Vec3Desc::new(0.0, 0.0, 0.0)
}
fn default_vfov() -> f32 {
    90.0
}
fn default_lookfrom() -> Vec3Desc {
    Vec3Desc::new(0.0, 0.0, 0.0)
}
fn default_lookat() -> Vec3Desc {
    Vec3Desc::new(0.0, 0.0, -1.0)
}
fn default_vup() -> Vec3Desc {
    Vec3Desc::new(0.0, 1.0, 0.0)
}
fn default_focus_dist() -> f32 {
    10.0
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            aspect_ratio: default_aspect_ratio(),
            image_width: default_image_width(),
            samples_per_pixel: default_samples_per_pixel(),
            max_depth: default_max_depth(),
            background: default_background(),
            vfov: default_vfov(),
            lookfrom: default_lookfrom(),
            lookat: default_lookat(),
            vup: default_vup(),
            defocus_angle: 0.0,
            focus_dist: default_focus_dist(),
        }
    }
}

/// The complete payload broadcast to every worker at the start of a render
/// session: geometry tree, camera, and optionally the list of shapes the
/// integrator importance-samples as lights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    pub world: GeometryDesc,
    pub camera: CameraDesc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lights: Option<GeometryDesc>,
}
