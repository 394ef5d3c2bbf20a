//! Builds runtime scenes from serialized descriptions.
//!
//! Each worker receives the scene description once per render session,
//! rebuilds its own primitive tree and BVH, and resolves deferred image
//! assets before accepting pixel work.

use crate::hittable::{Primitive, PrimitiveList};
use crate::material::Material;
use crate::texture::Texture;
use crate::{BvhNode, Camera, ConstantMedium, Quad, RotateY, Sphere, Translate};
use lux_core::asset::{AssetCache, AssetLoader};
use lux_core::describe::{GeometryDesc, MaterialDesc, SceneDesc, TextureDesc};
use std::sync::Arc;
use thiserror::Error;

/// Errors that make a scene description unusable.
///
/// Any of these is fatal for the build message that carried the scene; no
/// partial scene is used.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Malformed scene payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// A worker's private, ready-to-render scene.
pub struct BuiltScene {
    /// BVH over the world geometry
    pub world: Primitive,
    /// Shapes the integrator importance-samples as lights
    pub lights: Option<Arc<Primitive>>,
    pub camera: Camera,
}

/// Parse and build a scene from its JSON payload.
pub fn build_scene_from_json(
    payload: &str,
    loader: Arc<dyn AssetLoader>,
) -> Result<BuiltScene, BuildError> {
    let desc: SceneDesc = serde_json::from_str(payload)?;
    build_scene(&desc, loader)
}

/// Build a runtime scene from a description.
pub fn build_scene(desc: &SceneDesc, loader: Arc<dyn AssetLoader>) -> Result<BuiltScene, BuildError> {
    let mut assets = AssetCache::new(loader);

    let world_root = build_geometry(&desc.world, &mut assets)?;

    // Rebuild our own BVH over the top-level objects.
    let objects = match world_root.as_ref() {
        Primitive::List(list) => list.objects().to_vec(),
        _ => vec![world_root.clone()],
    };
    let world = BvhNode::build(objects);

    let lights = match &desc.lights {
        Some(lights) => Some(build_geometry(lights, &mut assets)?),
        None => None,
    };

    Ok(BuiltScene {
        world,
        lights,
        camera: Camera::from_desc(&desc.camera),
    })
}

fn build_geometry(
    desc: &GeometryDesc,
    assets: &mut AssetCache,
) -> Result<Arc<Primitive>, BuildError> {
    let primitive = match desc {
        GeometryDesc::Sphere {
            center,
            center2,
            radius,
            material,
        } => {
            if *radius <= 0.0 {
                return Err(BuildError::InvalidGeometry(format!(
                    "sphere radius must be positive, got {}",
                    radius
                )));
            }
            let material = build_material(material, assets);
            let sphere = match center2 {
                Some(center2) => {
                    Sphere::new_moving((*center).into(), (*center2).into(), *radius, material)
                }
                None => Sphere::new((*center).into(), *radius, material),
            };
            Primitive::Sphere(sphere)
        }

        GeometryDesc::Quad { q, u, v, material } => {
            let u_vec: glam::Vec3 = (*u).into();
            let v_vec: glam::Vec3 = (*v).into();
            if u_vec.cross(v_vec).length_squared() < 1e-12 {
                return Err(BuildError::InvalidGeometry(
                    "quad edge vectors are parallel or zero".to_string(),
                ));
            }
            Primitive::Quad(Quad::new(
                (*q).into(),
                u_vec,
                v_vec,
                build_material(material, assets),
            ))
        }

        GeometryDesc::ConstantMedium {
            boundary,
            density,
            texture,
        } => {
            if *density <= 0.0 {
                return Err(BuildError::InvalidGeometry(format!(
                    "medium density must be positive, got {}",
                    density
                )));
            }
            let boundary = build_geometry(boundary, assets)?;
            Primitive::Medium(ConstantMedium::new(
                boundary,
                *density,
                build_texture(texture, assets),
            ))
        }

        GeometryDesc::Translate { object, offset } => {
            let object = build_geometry(object, assets)?;
            Primitive::Translate(Translate::new(object, (*offset).into()))
        }

        GeometryDesc::RotateY { object, angle } => {
            let object = build_geometry(object, assets)?;
            Primitive::RotateY(RotateY::new(object, *angle))
        }

        GeometryDesc::List { objects } => {
            let mut list = PrimitiveList::new();
            for object in objects {
                list.add(build_geometry(object, assets)?);
            }
            Primitive::List(list)
        }
    };

    Ok(Arc::new(primitive))
}

fn build_material(desc: &MaterialDesc, assets: &mut AssetCache) -> Arc<Material> {
    let material = match desc {
        MaterialDesc::Lambertian { texture } => Material::Lambertian {
            texture: build_texture(texture, assets),
        },
        MaterialDesc::Metal { albedo, fuzz } => Material::Metal {
            albedo: (*albedo).into(),
            fuzz: fuzz.clamp(0.0, 1.0),
        },
        MaterialDesc::Dielectric { refraction_index } => Material::Dielectric {
            refraction_index: *refraction_index,
        },
        MaterialDesc::DiffuseLight { texture } => Material::DiffuseLight {
            texture: build_texture(texture, assets),
        },
        MaterialDesc::Isotropic { texture } => Material::Isotropic {
            texture: build_texture(texture, assets),
        },
    };
    Arc::new(material)
}

fn build_texture(desc: &TextureDesc, assets: &mut AssetCache) -> Texture {
    let mut texture = match desc {
        TextureDesc::SolidColor { albedo } => Texture::solid((*albedo).into()),
        TextureDesc::Checker { scale, even, odd } => Texture::checker(
            *scale,
            build_texture(even, assets),
            build_texture(odd, assets),
        ),
        TextureDesc::Image { source } => Texture::image(source.clone()),
        TextureDesc::Noise { scale, seed } => Texture::noise(*scale, *seed),
    };
    // Resolve deferred image loads now; scene build is the barrier that
    // keeps asset IO out of the render loop.
    texture.prepare(assets);
    texture
}
