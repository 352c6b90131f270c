//! Gradient (Perlin) noise and turbulence.

use ember_math::Vec3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::sampling::gen_range;

const POINT_COUNT: usize = 256;

/// Seed for the lattice tables, fixed so every run sees the same noise.
const PERLIN_SEED: u64 = 0x7E47_17E5;

/// Octaves summed by [`Perlin::turbulence`] when callers don't choose.
pub const DEFAULT_OCTAVES: u32 = 7;

/// Lattice of random unit gradients indexed through three permutations.
#[derive(Clone)]
pub struct Perlin {
    gradients: Box<[Vec3; POINT_COUNT]>,
    perm_x: [u8; POINT_COUNT],
    perm_y: [u8; POINT_COUNT],
    perm_z: [u8; POINT_COUNT],
}

impl Perlin {
    /// Build the tables from the fixed seed.
    pub fn new() -> Self {
        Self::with_seed(PERLIN_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut gradients = Box::new([Vec3::ZERO; POINT_COUNT]);
        for g in gradients.iter_mut() {
            *g = loop {
                let v = Vec3::new(
                    gen_range(&mut rng, -1.0, 1.0),
                    gen_range(&mut rng, -1.0, 1.0),
                    gen_range(&mut rng, -1.0, 1.0),
                );
                if v.length_squared() > 1e-6 {
                    break v.normalize();
                }
            };
        }

        let mut generate_perm = || {
            let mut perm = [0u8; POINT_COUNT];
            for (i, p) in perm.iter_mut().enumerate() {
                *p = i as u8;
            }
            perm.shuffle(&mut rng);
            perm
        };

        let perm_x = generate_perm();
        let perm_y = generate_perm();
        let perm_z = generate_perm();

        Self {
            gradients,
            perm_x,
            perm_y,
            perm_z,
        }
    }

    /// Noise value at `p`, roughly in `[-1, 1]`.
    pub fn noise(&self, p: Vec3) -> f32 {
        let floor = p.floor();
        let (u, v, w) = (p.x - floor.x, p.y - floor.y, p.z - floor.z);

        let i = floor.x as i64;
        let j = floor.y as i64;
        let k = floor.z as i64;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let index = self.perm_x[((i + di as i64) & 255) as usize]
                        ^ self.perm_y[((j + dj as i64) & 255) as usize]
                        ^ self.perm_z[((k + dk as i64) & 255) as usize];
                    *cell = self.gradients[index as usize];
                }
            }
        }

        perlin_interp(&c, u, v, w)
    }

    /// Sum of `depth` octaves, amplitude halving and frequency doubling.
    ///
    /// Returns the absolute value, so the result is never negative.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 0.5;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

impl Default for Perlin {
    fn default() -> Self {
        Self::new()
    }
}

/// Trilinear blend of the corner gradients with Hermite smoothing.
fn perlin_interp(c: &[[[Vec3; 2]; 2]; 2], u: f32, v: f32, w: f32) -> f32 {
    let uu = u * u * (3.0 - 2.0 * u);
    let vv = v * v * (3.0 - 2.0 * v);
    let ww = w * w * (3.0 - 2.0 * w);

    let mut accum = 0.0;
    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let weight_v = Vec3::new(u - fi, v - fj, w - fk);
                accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                    * (fj * vv + (1.0 - fj) * (1.0 - vv))
                    * (fk * ww + (1.0 - fk) * (1.0 - ww))
                    * gradient.dot(weight_v);
            }
        }
    }

    accum
}
