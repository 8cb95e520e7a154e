use crate::{Interval, Point3, Ray, DVec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Stored as a min and a max corner. A box may be flat along one axis
/// (thin rectangles); the slab test below copes with that through IEEE
/// infinities rather than special cases.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// Create an AABB from two opposite corners given in any order.
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create the tightest AABB enclosing a cloud of points.
    ///
    /// An empty iterator yields `Aabb::EMPTY`.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point3>,
    {
        points.into_iter().fold(Aabb::EMPTY, |acc, p| Aabb {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Grow this box in place so that it also covers `other`.
    pub fn expand(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    /// Slab test returning the parameter range the ray spends inside the box.
    ///
    /// A zero direction component gives `±inf` for that axis, which either
    /// leaves the running interval untouched (origin inside the slab) or
    /// empties it (origin outside).
    pub fn hit_interval(&self, r: &Ray, mut ray_t: Interval) -> Option<Interval> {
        for axis in 0..3 {
            let inv_d = 1.0 / r.direction[axis];
            let mut t0 = (self.min[axis] - r.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - r.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return None;
            }
        }
        Some(ray_t)
    }

    /// Test if a ray intersects this AABB within the given interval.
    #[inline]
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        self.hit_interval(r, ray_t).is_some()
    }

    /// Pad axes thinner than `delta` so the box has volume.
    pub fn pad_to_minimums(&self, delta: f64) -> Aabb {
        let mut padded = *self;
        for axis in 0..3 {
            let interval = self.axis_interval(axis);
            if interval.size() < delta {
                let grown = interval.expand(delta);
                padded.min[axis] = grown.min;
                padded.max[axis] = grown.max;
            }
        }
        padded
    }

    /// The eight corners, indexed by the bit pattern `xyz` (0 = min, 1 = max).
    pub fn vertices(&self) -> [Point3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            DVec3::new(lo.x, lo.y, lo.z),
            DVec3::new(lo.x, lo.y, hi.z),
            DVec3::new(lo.x, hi.y, lo.z),
            DVec3::new(lo.x, hi.y, hi.z),
            DVec3::new(hi.x, lo.y, lo.z),
            DVec3::new(hi.x, lo.y, hi.z),
            DVec3::new(hi.x, hi.y, lo.z),
            DVec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Returns true if `other` lies entirely within this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    /// A box that contains nothing; the identity for `surrounding`.
    pub const EMPTY: Aabb = Aabb {
        min: DVec3::INFINITY,
        max: DVec3::NEG_INFINITY,
    };
}
