//! Seeded Perlin noise for procedural textures.

use lux_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const POINT_COUNT: usize = 256;

/// Gradient Perlin noise.
///
/// Deterministic for a given seed; the seed travels with the scene
/// description so every worker rebuilds identical noise fields.
pub struct Perlin {
    rand_vec: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let rand_vec = (0..POINT_COUNT)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
                .try_normalize()
                .unwrap_or(Vec3::X)
            })
            .collect();

        let perm_x = generate_perm(&mut rng);
        let perm_y = generate_perm(&mut rng);
        let perm_z = generate_perm(&mut rng);

        Self {
            rand_vec,
            perm_x,
            perm_y,
            perm_z,
        }
    }

    /// Noise value in roughly [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let u = p.x - p.x.floor();
        let v = p.y - p.y.floor();
        let w = p.z - p.z.floor();

        let i = p.x.floor() as i64;
        let j = p.y.floor() as i64;
        let k = p.z.floor() as i64;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let ix = self.perm_x[((i + di as i64) & 255) as usize];
                    let iy = self.perm_y[((j + dj as i64) & 255) as usize];
                    let iz = self.perm_z[((k + dk as i64) & 255) as usize];
                    *cell = self.rand_vec[ix ^ iy ^ iz];
                }
            }
        }

        perlin_interp(&c, u, v, w)
    }

    /// Turbulence: sum of `depth` octaves of absolute noise.
    pub fn turb(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

fn generate_perm(rng: &mut StdRng) -> Vec<usize> {
    let mut p: Vec<usize> = (0..POINT_COUNT).collect();
    for i in (1..POINT_COUNT).rev() {
        let target = rng.gen_range(0..=i);
        p.swap(i, target);
    }
    p
}

/// Trilinear interpolation of gradient dot products, with Hermitian
/// smoothing of the lattice coordinates.
fn perlin_interp(c: &[[[Vec3; 2]; 2]; 2], u: f32, v: f32, w: f32) -> f32 {
    let uu = u * u * (3.0 - 2.0 * u);
    let vv = v * v * (3.0 - 2.0 * v);
    let ww = w * w * (3.0 - 2.0 * w);

    let mut accum = 0.0;
    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, cell) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let weight = Vec3::new(u - fi, v - fj, w - fk);
                accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                    * (fj * vv + (1.0 - fj) * (1.0 - vv))
                    * (fk * ww + (1.0 - fk) * (1.0 - ww))
                    * cell.dot(weight);
            }
        }
    }
    accum
}
