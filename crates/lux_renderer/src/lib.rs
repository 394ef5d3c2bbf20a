//! LUX Renderer - parallel CPU path tracing.
//!
//! A Monte Carlo path tracer with importance-sampled direct lighting and a
//! worker-pool scheduler: the image is carved into row-bounded pixel
//! chunks, each worker renders its chunks against a private copy of the
//! scene, and finished spans stream back to a compositor as they land.

mod bvh;
mod camera;
mod chunk;
mod hittable;
mod material;
mod medium;
mod pdf;
mod perlin;
mod quad;
mod renderer;
mod scene;
mod scheduler;
mod sphere;
mod texture;
mod transform;
mod worker;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use chunk::{ChunkCursor, PixelRange};
pub use hittable::{HitRecord, Primitive, PrimitiveList};
pub use material::{Color, Material, Scatter, ScatterRecord};
pub use medium::ConstantMedium;
pub use pdf::Pdf;
pub use perlin::Perlin;
pub use quad::Quad;
pub use renderer::{color_to_rgba, linear_to_gamma, ray_color, render_pixel};
pub use scene::{build_scene, build_scene_from_json, BuildError, BuiltScene};
pub use scheduler::{
    Compositor, ImageCompositor, PauseHandle, PoolError, RenderPool, RenderProgress,
};
pub use sphere::Sphere;
pub use texture::Texture;
pub use transform::{RotateY, Translate};
pub use worker::{spawn_worker, WorkerReply, WorkerRequest};

/// Re-export common math types from lux_math
pub use lux_math::{Aabb, Interval, Onb, Ray, Vec3};

use rand::{Rng, RngCore};

/// Uniform random f32 in [0, 1).
#[inline]
pub(crate) fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}
