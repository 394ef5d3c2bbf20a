use crate::Vec3;

/// A ray in 3D space with origin, direction, and time.
///
/// The `time` field selects where moving geometry is sampled (motion blur).
/// `norm_dir` is the unit direction, cached at construction because the
/// dielectric and background math consume it on every bounce.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub norm_dir: Vec3,
    pub time: f32,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3, time: f32) -> Self {
        Self {
            origin,
            direction,
            norm_dir: direction.normalize_or_zero(),
            time,
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
