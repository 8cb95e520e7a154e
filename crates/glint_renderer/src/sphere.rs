//! Sphere primitive, optionally moving linearly over the shutter interval.

use std::f64::consts::PI;
use std::sync::Arc;

use glint_math::{Aabb, DVec3, Interval, Point3, Ray};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;

/// Two shutter times closer than this describe a static sphere.
const MOTION_EPSILON: f64 = 1e-8;

/// A sphere defined by a (possibly moving) center and radius.
///
/// A negative radius flips the outward normal, which turns a dielectric
/// sphere into a hollow shell when nested inside a positive one.
#[derive(Debug, Clone)]
pub struct Sphere {
    center0: Point3,
    center1: Point3,
    time0: f64,
    time1: f64,
    radius: f64,
    material: Arc<Material>,
}

impl Sphere {
    /// Create a static sphere.
    pub fn new(center: Point3, radius: f64, material: Arc<Material>) -> Self {
        Self::moving(center, center, 0.0, 0.0, radius, material)
    }

    /// Create a sphere whose center moves from `center0` at `time0` to
    /// `center1` at `time1`.
    pub fn moving(
        center0: Point3,
        center1: Point3,
        time0: f64,
        time1: f64,
        radius: f64,
        material: Arc<Material>,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius,
            material,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_moving(&self) -> bool {
        (self.time1 - self.time0).abs() > MOTION_EPSILON
    }

    /// Center position at `time`, extrapolated linearly outside the shutter.
    pub fn center(&self, time: f64) -> Point3 {
        if !self.is_moving() {
            return self.center0;
        }
        let frac = (time - self.time0) / (self.time1 - self.time0);
        self.center0 + frac * (self.center1 - self.center0)
    }

    /// Spherical UV for a point on the unit sphere.
    ///
    /// u runs around the Y axis starting at -X, v from the south pole (0)
    /// to the north pole (1).
    pub fn uv(p: DVec3) -> (f64, f64) {
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let center = self.center(ray.time());
        let oc = ray.origin() - center;
        let a = ray.direction().length_squared();
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Find the nearest root that lies in the acceptable range
        let mut root = (-half_b - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (-half_b + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let outward_normal = (p - center) / self.radius;
        Some(HitRecord::new(
            ray,
            root,
            p,
            outward_normal,
            Self::uv(outward_normal),
            &self.material,
        ))
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Aabb {
        let rvec = DVec3::splat(self.radius.abs());
        let box_at = |center: Point3| Aabb::new(center - rvec, center + rvec);

        let start = box_at(self.center(time0));
        if !self.is_moving() {
            return start;
        }
        Aabb::surrounding(&start, &box_at(self.center(time1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_sphere_at(center: Point3) -> Sphere {
        Sphere::new(center, 1.0, Arc::new(Lambertian::new(Color::ONE).into()))
    }

    fn forward() -> Interval {
        Interval::new(0.001, f64::INFINITY)
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let sphere = unit_sphere_at(DVec3::new(0.0, 0.0, -5.0));
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new_simple(DVec3::ZERO, -DVec3::Z);
        let rec = sphere.hit(&ray, forward(), &mut rng).unwrap();

        assert!((rec.t - 4.0).abs() < 1e-9);
        assert!(rec.front_face);
        assert!((rec.normal - DVec3::Z).length() < 1e-9);
    }

    #[test]
    fn test_sphere_miss_and_tangent() {
        let sphere = unit_sphere_at(DVec3::new(0.0, 0.0, -5.0));
        let mut rng = StdRng::seed_from_u64(42);

        let miss = Ray::new_simple(DVec3::new(0.0, 3.0, 0.0), -DVec3::Z);
        assert!(sphere.hit(&miss, forward(), &mut rng).is_none());

        // Grazing ray with a slightly negative discriminant
        let grazing = Ray::new_simple(DVec3::new(0.0, 1.0 + 1e-9, 0.0), -DVec3::Z);
        assert!(sphere.hit(&grazing, forward(), &mut rng).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside_is_back_face() {
        let sphere = unit_sphere_at(DVec3::ZERO);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new_simple(DVec3::ZERO, DVec3::X);
        let rec = sphere.hit(&ray, forward(), &mut rng).unwrap();

        assert!((rec.t - 1.0).abs() < 1e-9);
        assert!(!rec.front_face);
        assert!((rec.normal + DVec3::X).length() < 1e-9);
    }

    #[test]
    fn test_sphere_normals_are_unit_length() {
        let sphere = Sphere::new(
            DVec3::new(1.0, -2.0, -7.0),
            2.5,
            Arc::new(Lambertian::new(Color::ONE).into()),
        );
        let mut rng = StdRng::seed_from_u64(9);

        for i in 0..64 {
            let jitter = DVec3::new((i % 8) as f64 * 0.25 - 1.0, (i / 8) as f64 * 0.25 - 1.0, 0.0);
            let target = DVec3::new(1.0, -2.0, -7.0) + jitter;
            let ray = Ray::new_simple(DVec3::ZERO, target);
            let rec = sphere.hit(&ray, forward(), &mut rng).unwrap();
            assert!((rec.normal.length() - 1.0).abs() < 1e-9, "normal {:?}", rec.normal);
        }
    }

    #[test]
    fn test_negative_radius_points_inward() {
        let sphere = Sphere::new(
            DVec3::ZERO,
            -0.5,
            Arc::new(Lambertian::new(Color::ONE).into()),
        );
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new_simple(DVec3::new(0.0, 0.0, 5.0), -DVec3::Z);
        let rec = sphere.hit(&ray, forward(), &mut rng).unwrap();

        // The geometric outward normal is +Z, but the stored outward normal is -Z
        assert!(!rec.front_face);
        assert!((rec.t - 4.5).abs() < 1e-9);

        let bbox = sphere.bounding_box(0.0, 1.0);
        assert_eq!(bbox.max, DVec3::splat(0.5));
    }

    #[test]
    fn test_moving_sphere_center_and_bbox() {
        let sphere = Sphere::moving(
            DVec3::ZERO,
            DVec3::new(0.0, 2.0, 0.0),
            0.0,
            1.0,
            0.5,
            Arc::new(Lambertian::new(Color::ONE).into()),
        );
        assert!(sphere.is_moving());
        assert_eq!(sphere.center(0.5), DVec3::new(0.0, 1.0, 0.0));

        let bbox = sphere.bounding_box(0.0, 1.0);
        assert_eq!(bbox.min, DVec3::splat(-0.5));
        assert_eq!(bbox.max, DVec3::new(0.5, 2.5, 0.5));

        // A ray at the end of the shutter sees the moved sphere
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(DVec3::new(0.0, 2.0, 5.0), -DVec3::Z, 1.0);
        assert!(sphere.hit(&ray, forward(), &mut rng).is_some());
        let early = Ray::new(DVec3::new(0.0, 2.0, 5.0), -DVec3::Z, 0.0);
        assert!(sphere.hit(&early, forward(), &mut rng).is_none());
    }

    #[test]
    fn test_sphere_uv() {
        let (u, v) = Sphere::uv(DVec3::new(-1.0, 0.0, 0.0));
        assert!(u.abs() < 1e-9 || (u - 1.0).abs() < 1e-9);
        assert!((v - 0.5).abs() < 1e-9);

        let (_, v) = Sphere::uv(DVec3::Y);
        assert!((v - 1.0).abs() < 1e-9);

        let (u, _) = Sphere::uv(DVec3::Z);
        assert!((u - 0.25).abs() < 1e-9);
    }
}
