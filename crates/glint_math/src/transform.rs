// Transform utilities for DMat4
//
// Extends glam::DMat4 with the operations the intersection code needs.
// glam already provides transform_point3(), transform_vector3() and inverse().

use crate::{Aabb, Point3, Ray, DMat4, DQuat, DVec3};

/// Build the local-to-world matrix for an object placed at `location` with `rotation`.
///
/// Rotation is applied first, then translation.
pub fn rigid_transform(location: Point3, rotation: DQuat) -> DMat4 {
    DMat4::from_rotation_translation(rotation, location)
}

/// Extension trait for DMat4 to provide additional transform utilities
pub trait TransformExt {
    /// Transform a ray's origin as a point and its direction as a vector.
    ///
    /// The direction is left unnormalized so hit distances carry over.
    fn transform_ray(&self, ray: &Ray) -> Ray;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;

    /// Matrix for carrying surface normals through this transform (inverse transpose).
    fn normal_matrix(&self) -> DMat4;
}

impl TransformExt for DMat4 {
    fn transform_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.transform_point3(ray.origin),
            self.transform_vector3(ray.direction),
            ray.time,
        )
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        Aabb::from_points(
            aabb.vertices()
                .into_iter()
                .map(|corner| self.transform_point3(corner)),
        )
    }

    fn normal_matrix(&self) -> DMat4 {
        self.inverse().transpose()
    }
}

/// Transform a normal with a precomputed normal matrix and renormalize it.
#[inline]
pub fn transform_normal(normal_matrix: &DMat4, normal: DVec3) -> DVec3 {
    normal_matrix.transform_vector3(normal).normalize()
}
