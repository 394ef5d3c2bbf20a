use crate::Vec3;

/// Orthonormal basis around a normal, used to map locally sampled scatter
/// directions into world space.
#[derive(Debug, Copy, Clone)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    /// Build a basis with `w` along the given normal.
    pub fn new(n: Vec3) -> Self {
        let w = n.normalize();
        // Helper axis: world up, unless the normal is nearly vertical.
        let a = if w.y.abs() > 0.9 { Vec3::X } else { Vec3::Y };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { u, v, w }
    }

    /// Transform a vector from basis coordinates to world space.
    pub fn transform(&self, local: Vec3) -> Vec3 {
        self.u * local.x + self.v * local.y + self.w * local.z
    }
}
