//! Image asset loading for textures.
//!
//! Scene descriptions reference images by source string; workers resolve
//! them during the scene-build phase through an [`AssetLoader`] and cache
//! the decoded buffers. The renderer treats loading as an opaque dependency:
//! a texture whose image never resolved falls back to a debug color instead
//! of failing the render.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur while resolving an image asset.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to load asset: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type AssetResult<T> = Result<T, AssetError>;

/// A decoded image.
///
/// Pixels are linear RGB floats in row-major order.
#[derive(Clone, Debug)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 3]>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Get the pixel at integer coordinates, clamped to the image bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or([0.0, 0.0, 0.0])
    }

    /// Total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 3]>()
    }
}

/// Resolves an image source string into a decoded buffer.
///
/// The renderer only ever calls this during the scene-build phase; by the
/// time pixel tasks are accepted, every resolvable image has been resolved.
pub trait AssetLoader: Send + Sync {
    fn load(&self, source: &str) -> AssetResult<ImageData>;
}

/// Loads images from the filesystem via the `image` crate.
pub struct FileLoader {
    /// Base directory for resolving relative sources
    base_dir: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self { base_dir: None }
    }

    /// Create a loader that resolves relative sources against a directory.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve_path(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for FileLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for FileLoader {
    fn load(&self, source: &str) -> AssetResult<ImageData> {
        let path = self.resolve_path(source);
        let img = image::open(&path)
            .map_err(|e| AssetError::LoadError(format!("{}: {}", path.display(), e)))?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| [srgb_to_linear(p[0]), srgb_to_linear(p[1]), srgb_to_linear(p[2])])
            .collect();

        Ok(ImageData::new(width, height, pixels))
    }
}

/// Convert an sRGB byte value to a linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Cache of decoded images, keyed by source string.
///
/// One cache lives in each worker; duplicate references within a scene
/// resolve to the same buffer.
pub struct AssetCache {
    loader: Arc<dyn AssetLoader>,
    images: HashMap<String, Arc<ImageData>>,
}

impl AssetCache {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            images: HashMap::new(),
        }
    }

    /// Fetch a decoded image, loading it on first use.
    pub fn fetch(&mut self, source: &str) -> AssetResult<Arc<ImageData>> {
        if let Some(image) = self.images.get(source) {
            return Ok(image.clone());
        }

        let image = Arc::new(self.loader.load(source)?);
        self.images.insert(source.to_string(), image.clone());

        log::debug!(
            "Loaded asset: {} ({}x{}, {:.1} KB)",
            source,
            image.width,
            image.height,
            image.size_bytes() as f32 / 1024.0
        );

        Ok(image)
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
