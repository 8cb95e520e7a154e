//! Gradient (Perlin) noise.

use glint_math::{DVec3, Point3};
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::sampling::random_unit_vector;

const POINT_COUNT: usize = 256;

/// Gradient noise over a 256-cell lattice, repeating every 256 units.
#[derive(Debug, Clone)]
pub struct Perlin {
    ranvec: Vec<DVec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let ranvec = (0..POINT_COUNT).map(|_| random_unit_vector(rng)).collect();
        Self {
            ranvec,
            perm_x: Self::generate_perm(rng),
            perm_y: Self::generate_perm(rng),
            perm_z: Self::generate_perm(rng),
        }
    }

    fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
        perm.shuffle(rng);
        perm
    }

    /// Smooth noise in roughly [-1, 1].
    pub fn noise(&self, p: Point3) -> f64 {
        let floor = p.floor();
        let (u, v, w) = (p.x - floor.x, p.y - floor.y, p.z - floor.z);
        let (i, j, k) = (floor.x as i64, floor.y as i64, floor.z as i64);

        let mut c = [[[DVec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let index = self.perm_x[Self::wrap(i + di as i64)]
                        ^ self.perm_y[Self::wrap(j + dj as i64)]
                        ^ self.perm_z[Self::wrap(k + dk as i64)];
                    *cell = self.ranvec[index];
                }
            }
        }

        Self::interpolate(&c, u, v, w)
    }

    /// Sum of `depth` octaves of absolute noise, each at double the frequency and half the weight.
    pub fn turbulence(&self, p: Point3, depth: usize) -> f64 {
        let mut accum = 0.0;
        let mut temp = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp);
            weight *= 0.5;
            temp *= 2.0;
        }

        accum.abs()
    }

    #[inline]
    fn wrap(n: i64) -> usize {
        (n & (POINT_COUNT as i64 - 1)) as usize
    }

    fn interpolate(c: &[[[DVec3; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
        // Hermite smoothing hides the lattice
        let uu = u * u * (3.0 - 2.0 * u);
        let vv = v * v * (3.0 - 2.0 * v);
        let ww = w * w * (3.0 - 2.0 * w);

        let mut accum = 0.0;
        for (i, plane) in c.iter().enumerate() {
            for (j, row) in plane.iter().enumerate() {
                for (k, gradient) in row.iter().enumerate() {
                    let (fi, fj, fk) = (i as f64, j as f64, k as f64);
                    let weight = DVec3::new(u - fi, v - fj, w - fk);
                    accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                        * (fj * vv + (1.0 - fj) * (1.0 - vv))
                        * (fk * ww + (1.0 - fk) * (1.0 - ww))
                        * gradient.dot(weight);
                }
            }
        }
        accum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_is_zero_on_lattice_points() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(42));
        for p in [DVec3::ZERO, DVec3::new(3.0, -7.0, 12.0), DVec3::splat(255.0)] {
            assert!(perlin.noise(p).abs() < 1e-12);
        }
    }

    #[test]
    fn test_noise_is_bounded_and_deterministic() {
        let a = Perlin::new(&mut StdRng::seed_from_u64(42));
        let b = Perlin::new(&mut StdRng::seed_from_u64(42));

        for i in 0..500 {
            let p = DVec3::new(i as f64 * 0.37, -(i as f64) * 0.11, i as f64 * 0.05 + 0.5);
            let n = a.noise(p);
            assert!(n.abs() <= 2.0, "noise {} at {:?}", n, p);
            assert_eq!(n, b.noise(p));
        }
    }

    #[test]
    fn test_noise_wraps_every_256_units() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(1));
        let p = DVec3::new(0.3, 1.7, -2.2);
        let shifted = p + DVec3::new(256.0, -256.0, 512.0);
        assert!((perlin.noise(p) - perlin.noise(shifted)).abs() < 1e-9);
    }

    #[test]
    fn test_turbulence_is_non_negative() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(5));
        for i in 0..100 {
            let p = DVec3::splat(i as f64 * 0.173);
            assert!(perlin.turbulence(p, 7) >= 0.0);
        }
        assert_eq!(perlin.turbulence(DVec3::ONE * 0.5, 0), 0.0);
    }
}
