//! Homogeneous participating medium (smoke, fog) bounded by another primitive.

use std::sync::Arc;

use glint_math::{Aabb, DVec3, Interval, Ray};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, Primitive};
use crate::sampling::gen_f64;
use crate::{Color, Isotropic, Material, Texture};

/// Gap between the entry hit and the search for the exit hit.
const EXIT_OFFSET: f64 = 1e-4;

/// A volume of constant density filling a closed boundary.
///
/// Rays scatter at an exponentially distributed free-flight distance
/// inside the boundary, using an isotropic phase function.
#[derive(Debug, Clone)]
pub struct ConstantMedium {
    boundary: Arc<Primitive>,
    density: f64,
    phase_function: Material,
}

impl ConstantMedium {
    /// A medium with non-positive density is transparent.
    pub fn new(boundary: Arc<Primitive>, density: f64, albedo: Arc<Texture>) -> Self {
        Self {
            boundary,
            density,
            phase_function: Isotropic::textured(albedo).into(),
        }
    }

    pub fn from_color(boundary: Arc<Primitive>, density: f64, albedo: Color) -> Self {
        Self::new(boundary, density, Arc::new(Texture::Solid(albedo)))
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        if self.density <= 0.0 || self.density.is_nan() {
            return None;
        }

        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry.t + EXIT_OFFSET, f64::INFINITY), rng)?;

        let mut t_entry = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_entry >= t_exit {
            return None;
        }
        t_entry = t_entry.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside = (t_exit - t_entry) * ray_length;
        // 1 - [0, 1) lies in (0, 1], so the log is finite
        let hit_distance = -(1.0 - gen_f64(rng)).ln() / self.density;
        if hit_distance > distance_inside {
            return None;
        }

        let t = t_entry + hit_distance / ray_length;
        Some(HitRecord {
            p: ray.at(t),
            normal: DVec3::X,
            material: &self.phase_function,
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Aabb {
        self.boundary.bounding_box(time0, time1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fog_ball(density: f64) -> ConstantMedium {
        let boundary = Sphere::new(DVec3::ZERO, 1.0, Arc::new(Lambertian::new(Color::ONE).into()));
        ConstantMedium::from_color(Arc::new(boundary.into()), density, Color::ONE)
    }

    #[test]
    fn test_dense_medium_scatters_near_entry() {
        let medium = fog_ball(1e6);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new_simple(DVec3::new(0.0, 0.0, -5.0), DVec3::Z);
        let rec = medium
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();

        assert!(rec.t >= 4.0 && rec.t < 4.001, "t = {}", rec.t);
        assert!(rec.front_face);
        assert_eq!(rec.normal, DVec3::X);
        assert!(matches!(rec.material, Material::Isotropic(_)));
    }

    #[test]
    fn test_thin_medium_mostly_passes() {
        let medium = fog_ball(1e-6);
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new_simple(DVec3::new(0.0, 0.0, -5.0), DVec3::Z);

        let hits = (0..1000)
            .filter(|_| {
                medium
                    .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
                    .is_some()
            })
            .count();
        assert!(hits < 10, "hits = {}", hits);
    }

    #[test]
    fn test_ray_starting_inside_uses_zero_entry() {
        let medium = fog_ball(1e6);
        let mut rng = StdRng::seed_from_u64(3);

        let ray = Ray::new_simple(DVec3::ZERO, DVec3::Z);
        let rec = medium
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();

        assert!(rec.t >= 0.001 && rec.t < 0.01, "t = {}", rec.t);
    }

    #[test]
    fn test_non_positive_density_is_transparent() {
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new_simple(DVec3::new(0.0, 0.0, -5.0), DVec3::Z);

        for density in [0.0, -1.0, f64::NAN] {
            let medium = fog_ball(density);
            for _ in 0..100 {
                assert!(medium
                    .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
                    .is_none());
            }
        }
    }

    #[test]
    fn test_miss_and_range_outside_volume() {
        let medium = fog_ball(1.0);
        let mut rng = StdRng::seed_from_u64(42);

        let miss = Ray::new_simple(DVec3::new(0.0, 5.0, -5.0), DVec3::Z);
        assert!(medium.hit(&miss, Interval::new(0.001, f64::INFINITY), &mut rng).is_none());

        // Ray interval ends before the volume starts
        let short = Ray::new_simple(DVec3::new(0.0, 0.0, -5.0), DVec3::Z);
        assert!(medium.hit(&short, Interval::new(0.001, 3.0), &mut rng).is_none());
    }

    #[test]
    fn test_hit_distance_respects_direction_length() {
        let medium = fog_ball(1e6);
        let mut rng = StdRng::seed_from_u64(42);

        // Direction of length 2: entry at t = 2
        let ray = Ray::new_simple(DVec3::new(0.0, 0.0, -5.0), DVec3::new(0.0, 0.0, 2.0));
        let rec = medium
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!(rec.t >= 2.0 && rec.t < 2.001, "t = {}", rec.t);
    }
}
