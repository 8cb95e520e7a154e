//! Hittable trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use glint_math::{Aabb, DVec3, Interval, Point3, Ray};
use rand::RngCore;

use crate::{Bvh, ConstantMedium, Cuboid, Instance, Material, Rect, Sphere};

/// Record of a ray-object intersection.
#[derive(Debug, Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point3,
    /// Unit surface normal, always pointing against the incoming ray
    pub normal: DVec3,
    /// Material at the intersection point
    pub material: &'a Material,
    /// UV texture coordinates
    pub u: f64,
    pub v: f64,
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record from an outward normal, orienting it against `ray`.
    pub fn new(
        ray: &Ray,
        t: f64,
        p: Point3,
        outward_normal: DVec3,
        (u, v): (f64, f64),
        material: &'a Material,
    ) -> Self {
        let mut rec = Self {
            p,
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: DVec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        // Normal always points against the ray
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Find the closest intersection with `t` strictly inside `ray_t`.
    ///
    /// `rng` is only consumed by stochastic primitives (participating media).
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore)
        -> Option<HitRecord<'a>>;

    /// Bounding box covering the object over the shutter interval `[time0, time1]`.
    fn bounding_box(&self, time0: f64, time1: f64) -> Aabb;
}

/// Every kind of object a scene can hold.
///
/// The set is closed, so dispatch is a `match` rather than a vtable call.
#[derive(Debug)]
pub enum Primitive {
    Sphere(Sphere),
    Rect(Rect),
    Cuboid(Cuboid),
    Instance(Instance),
    ConstantMedium(ConstantMedium),
    List(HittableList),
    Bvh(Bvh),
}

impl Hittable for Primitive {
    #[inline]
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t, rng),
            Primitive::Rect(r) => r.hit(ray, ray_t, rng),
            Primitive::Cuboid(c) => c.hit(ray, ray_t, rng),
            Primitive::Instance(i) => i.hit(ray, ray_t, rng),
            Primitive::ConstantMedium(m) => m.hit(ray, ray_t, rng),
            Primitive::List(l) => l.hit(ray, ray_t, rng),
            Primitive::Bvh(b) => b.hit(ray, ray_t, rng),
        }
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(time0, time1),
            Primitive::Rect(r) => r.bounding_box(time0, time1),
            Primitive::Cuboid(c) => c.bounding_box(time0, time1),
            Primitive::Instance(i) => i.bounding_box(time0, time1),
            Primitive::ConstantMedium(m) => m.bounding_box(time0, time1),
            Primitive::List(l) => l.bounding_box(time0, time1),
            Primitive::Bvh(b) => b.bounding_box(time0, time1),
        }
    }
}

macro_rules! impl_into_primitive {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Primitive {
                fn from(value: $ty) -> Self {
                    Primitive::$ty(value)
                }
            }
        )*
    };
}

impl_into_primitive!(Sphere, Rect, Cuboid, Instance, ConstantMedium, Bvh);

impl From<HittableList> for Primitive {
    fn from(value: HittableList) -> Self {
        Primitive::List(value)
    }
}

/// A list of hittable objects, tested one after another.
#[derive(Debug, Default)]
pub struct HittableList {
    objects: Vec<Arc<Primitive>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add a shared object to the list.
    pub fn add(&mut self, object: Arc<Primitive>) {
        self.objects.push(object);
    }

    /// Wrap an object in an `Arc` and add it, returning the shared handle.
    pub fn push(&mut self, object: impl Into<Primitive>) -> Arc<Primitive> {
        let object = Arc::new(object.into());
        self.objects.push(Arc::clone(&object));
        object
    }

    pub fn objects(&self) -> &[Arc<Primitive>] {
        &self.objects
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl From<Vec<Arc<Primitive>>> for HittableList {
    fn from(objects: Vec<Arc<Primitive>>) -> Self {
        Self { objects }
    }
}

impl Hittable for HittableList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let max = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, Interval::new(ray_t.min, max), rng) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Aabb {
        self.objects.iter().fold(Aabb::EMPTY, |acc, object| {
            Aabb::surrounding(&acc, &object.bounding_box(time0, time1))
        })
    }
}
