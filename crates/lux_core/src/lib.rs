//! LUX Core - Scene description and asset loading.
//!
//! This crate provides:
//!
//! - **Scene description**: the serializable scene tree (`SceneDesc`,
//!   `GeometryDesc`, `MaterialDesc`, `TextureDesc`, `CameraDesc`) that the
//!   scheduler ships to render workers as a tagged-variant JSON tree
//! - **Asset loading**: decoded image buffers and the loader/cache layer
//!   textures resolve through during scene build
//!
//! # Example
//!
//! ```ignore
//! use lux_core::describe::{GeometryDesc, MaterialDesc, SceneDesc, Vec3Desc};
//!
//! let world = GeometryDesc::List {
//!     objects: vec![GeometryDesc::Sphere {
//!         center: Vec3Desc::new(0.0, 0.0, -1.0),
//!         center2: None,
//!         radius: 0.5,
//!         material: MaterialDesc::lambertian_color(0.5, 0.5, 0.5),
//!     }],
//! };
//! let json = serde_json::to_string(&world)?;
//! ```

pub mod asset;
pub mod describe;

// Re-export commonly used types
pub use asset::{AssetCache, AssetError, AssetLoader, FileLoader, ImageData};
pub use describe::{CameraDesc, GeometryDesc, MaterialDesc, SceneDesc, TextureDesc, Vec3Desc};
