//! Oriented box built from six rectangles.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use glint_math::{rigid_transform, Aabb, DMat4, DQuat, DVec3, Interval, Point3, Ray, TransformExt};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::{Material, Rect};

/// A `width` x `height` x `depth` box centered at `center`.
///
/// The faces live in the box's local frame with normals pointing away from
/// its center; rays are moved into that frame once per query.
#[derive(Debug, Clone)]
pub struct Cuboid {
    faces: [Rect; 6],
    transform: DMat4,
    inverse: DMat4,
    vertices: [Point3; 8],
    bbox: Aabb,
}

impl Cuboid {
    pub fn new(
        center: Point3,
        rotation: DQuat,
        width: f64,
        height: f64,
        depth: f64,
        material: Arc<Material>,
    ) -> Self {
        let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);
        let face = |w: f64, h: f64, offset: DVec3, rotation: DQuat| {
            Rect::new(w, h, offset, rotation, Arc::clone(&material))
        };

        let faces = [
            // front (+Z) and back (-Z)
            face(width, height, DVec3::new(0.0, 0.0, hd), DQuat::IDENTITY),
            face(width, height, DVec3::new(0.0, 0.0, -hd), DQuat::from_rotation_y(PI)),
            // right (+X) and left (-X)
            face(depth, height, DVec3::new(hw, 0.0, 0.0), DQuat::from_rotation_y(FRAC_PI_2)),
            face(depth, height, DVec3::new(-hw, 0.0, 0.0), DQuat::from_rotation_y(-FRAC_PI_2)),
            // top (+Y) and bottom (-Y)
            face(width, depth, DVec3::new(0.0, hh, 0.0), DQuat::from_rotation_x(-FRAC_PI_2)),
            face(width, depth, DVec3::new(0.0, -hh, 0.0), DQuat::from_rotation_x(FRAC_PI_2)),
        ];

        let transform = rigid_transform(center, rotation);
        let local = Aabb::new(DVec3::new(-hw, -hh, -hd), DVec3::new(hw, hh, hd));
        let vertices = local.vertices().map(|v| transform.transform_point3(v));
        let bbox = Aabb::from_points(vertices);

        Self {
            faces,
            transform,
            inverse: transform.inverse(),
            vertices,
            bbox,
        }
    }

    /// World-space corners of the box.
    pub fn vertices(&self) -> &[Point3; 8] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Rect] {
        &self.faces
    }
}

impl Hittable for Cuboid {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local = self.inverse.transform_ray(ray);

        let mut closest: Option<HitRecord<'a>> = None;
        for face in &self.faces {
            let max = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = face.hit(&local, Interval::new(ray_t.min, max), rng) {
                closest = Some(rec);
            }
        }

        // Rigid transform: the orientation relative to the ray is unchanged
        closest.map(|mut rec| {
            rec.p = self.transform.transform_point3(rec.p);
            rec.normal = self.transform.transform_vector3(rec.normal);
            rec
        })
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Aabb {
        self.bbox
    }
}
