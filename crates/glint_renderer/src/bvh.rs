//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over shared primitives, split at the median along a randomly
//! chosen axis. Nodes live in a flat arena and refer to each other and to
//! the primitive list by index.

use std::sync::Arc;

use glint_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};

use crate::hittable::{HitRecord, Hittable, Primitive};
use crate::SceneError;

/// Child handle: another node in the arena or a primitive in the object list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeRef {
    Node(usize),
    Object(usize),
}

#[derive(Debug, Clone)]
struct BvhNode {
    left: NodeRef,
    right: NodeRef,
    bbox: Aabb,
}

/// A built hierarchy over a list of primitives.
#[derive(Debug)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    objects: Vec<Arc<Primitive>>,
    root: usize,
}

impl Bvh {
    /// Build a BVH over `objects`, bounding them over the shutter `[time0, time1]`.
    ///
    /// Fails on an empty list.
    pub fn new(
        objects: Vec<Arc<Primitive>>,
        time0: f64,
        time1: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Self, SceneError> {
        if objects.is_empty() {
            return Err(SceneError::EmptyScene);
        }

        let boxes: Vec<Aabb> = objects
            .iter()
            .map(|object| object.bounding_box(time0, time1))
            .collect();
        let mut indices: Vec<usize> = (0..objects.len()).collect();
        let mut nodes = Vec::with_capacity(objects.len());

        let root = Self::build(&mut nodes, &boxes, &mut indices, rng);

        let bvh = Self {
            nodes,
            objects,
            root,
        };
        log::debug!(
            "Built BVH: {} primitives, {} nodes, depth {}",
            bvh.objects.len(),
            bvh.nodes.len(),
            bvh.depth()
        );
        Ok(bvh)
    }

    /// Recursive construction; children are pushed before their parent.
    fn build(
        nodes: &mut Vec<BvhNode>,
        boxes: &[Aabb],
        indices: &mut [usize],
        rng: &mut dyn RngCore,
    ) -> usize {
        let axis = rng.gen_range(0..3);
        let min_on_axis = |i: usize| boxes[i].min[axis];

        let (left, right) = match indices.len() {
            1 => (NodeRef::Object(indices[0]), NodeRef::Object(indices[0])),
            2 => {
                let (a, b) = (indices[0], indices[1]);
                if min_on_axis(a) < min_on_axis(b) {
                    (NodeRef::Object(a), NodeRef::Object(b))
                } else {
                    (NodeRef::Object(b), NodeRef::Object(a))
                }
            }
            _ => {
                indices.sort_by(|&a, &b| min_on_axis(a).total_cmp(&min_on_axis(b)));
                let mid = indices.len() / 2;
                let (lo, hi) = indices.split_at_mut(mid);
                let left = Self::build(nodes, boxes, lo, rng);
                let right = Self::build(nodes, boxes, hi, rng);
                (NodeRef::Node(left), NodeRef::Node(right))
            }
        };

        let bbox = Aabb::surrounding(
            &Self::ref_box(nodes, boxes, left),
            &Self::ref_box(nodes, boxes, right),
        );
        nodes.push(BvhNode { left, right, bbox });
        nodes.len() - 1
    }

    fn ref_box(nodes: &[BvhNode], boxes: &[Aabb], r: NodeRef) -> Aabb {
        match r {
            NodeRef::Node(i) => nodes[i].bbox,
            NodeRef::Object(i) => boxes[i],
        }
    }

    /// Number of primitives in the hierarchy.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Always false: an empty hierarchy cannot be built.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn objects(&self) -> &[Arc<Primitive>] {
        &self.objects
    }

    /// Longest root-to-leaf path, counting nodes.
    pub fn depth(&self) -> usize {
        self.depth_of(NodeRef::Node(self.root))
    }

    fn depth_of(&self, r: NodeRef) -> usize {
        match r {
            NodeRef::Object(_) => 0,
            NodeRef::Node(i) => {
                let node = &self.nodes[i];
                1 + self.depth_of(node.left).max(self.depth_of(node.right))
            }
        }
    }

    fn hit_ref<'a>(
        &'a self,
        r: NodeRef,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match r {
            NodeRef::Object(i) => self.objects[i].hit(ray, ray_t, rng),
            NodeRef::Node(i) => self.hit_node(i, ray, ray_t, rng),
        }
    }

    fn hit_node<'a>(
        &'a self,
        index: usize,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let node = &self.nodes[index];
        if !node.bbox.hit(ray, ray_t) {
            return None;
        }

        let left = self.hit_ref(node.left, ray, ray_t, rng);
        // Single-primitive leaf: both children alias the same object
        if node.right == node.left {
            return left;
        }

        let max = left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let right = self.hit_ref(node.right, ray, Interval::new(ray_t.min, max), rng);
        right.or(left)
    }
}

impl Hittable for Bvh {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.hit_node(self.root, ray, ray_t, rng)
    }

    /// The box computed at build time, whatever interval is asked for.
    fn bounding_box(&self, _time0: f64, _time1: f64) -> Aabb {
        self.nodes[self.root].bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, HittableList, Lambertian, Sphere};
    use glint_math::DVec3;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere(center: DVec3, radius: f64) -> Arc<Primitive> {
        let material = Arc::new(Lambertian::new(Color::splat(0.5)).into());
        Arc::new(Sphere::new(center, radius, material).into())
    }

    fn forward() -> Interval {
        Interval::new(0.001, f64::INFINITY)
    }

    #[test]
    fn test_bvh_empty() {
        let mut rng = StdRng::seed_from_u64(42);
        let result = Bvh::new(Vec::new(), 0.0, 1.0, &mut rng);
        assert!(matches!(result, Err(SceneError::EmptyScene)));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let bvh = Bvh::new(vec![sphere(DVec3::new(0.0, 0.0, -5.0), 1.0)], 0.0, 1.0, &mut rng)
            .unwrap();

        assert_eq!(bvh.node_count(), 1);
        assert_eq!(bvh.depth(), 1);

        let ray = Ray::new_simple(DVec3::ZERO, -DVec3::Z);
        let rec = bvh.hit(&ray, forward(), &mut rng).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let mut rng = StdRng::seed_from_u64(42);
        let objects: Vec<_> = (0..10)
            .map(|i| sphere(DVec3::new(i as f64 * 3.0, 0.0, -10.0), 1.0))
            .collect();
        let bvh = Bvh::new(objects, 0.0, 1.0, &mut rng).unwrap();

        assert_eq!(bvh.len(), 10);
        assert_eq!(bvh.node_count(), 11);
        assert!(bvh.depth() <= 5, "depth {}", bvh.depth());

        let bbox = bvh.bounding_box(0.0, 1.0);
        assert_eq!(bbox.min, DVec3::new(-1.0, -1.0, -11.0));
        assert_eq!(bbox.max, DVec3::new(28.0, 1.0, -9.0));

        // Hit the 4th sphere from straight above
        let ray = Ray::new_simple(DVec3::new(9.0, 10.0, -10.0), -DVec3::Y);
        let rec = bvh.hit(&ray, forward(), &mut rng).unwrap();
        assert!((rec.t - 9.0).abs() < 1e-9);
        assert!((rec.p - DVec3::new(9.0, 1.0, -10.0)).length() < 1e-9);

        // Miss between spheres
        let ray = Ray::new_simple(DVec3::new(10.5, 10.0, -10.0), -DVec3::Y);
        assert!(bvh.hit(&ray, forward(), &mut rng).is_none());
    }

    #[test]
    fn test_bvh_two_overlapping_returns_nearest() {
        let mut rng = StdRng::seed_from_u64(7);
        let bvh = Bvh::new(
            vec![
                sphere(DVec3::new(0.0, 0.0, -8.0), 1.0),
                sphere(DVec3::new(0.0, 0.0, -4.0), 1.0),
            ],
            0.0,
            1.0,
            &mut rng,
        )
        .unwrap();

        let ray = Ray::new_simple(DVec3::ZERO, -DVec3::Z);
        let rec = bvh.hit(&ray, forward(), &mut rng).unwrap();
        assert!((rec.t - 3.0).abs() < 1e-9);
    }

    fn arb_spheres() -> impl Strategy<Value = Vec<(DVec3, f64)>> {
        prop::collection::vec(
            (prop::array::uniform3(-20.0..20.0f64), 0.1..3.0f64)
                .prop_map(|(c, r)| (DVec3::from_array(c), r)),
            1..40,
        )
    }

    proptest! {
        #[test]
        fn bvh_matches_brute_force(
            spheres in arb_spheres(),
            seed in any::<u64>(),
            origin in prop::array::uniform3(-30.0..30.0f64),
            target in prop::array::uniform3(-20.0..20.0f64),
        ) {
            let origin = DVec3::from_array(origin);
            let direction = DVec3::from_array(target) - origin;
            prop_assume!(direction.length() > 1e-3);

            let objects: Vec<_> = spheres.iter().map(|&(c, r)| sphere(c, r)).collect();
            let list = HittableList::from(objects.clone());
            let mut rng = StdRng::seed_from_u64(seed);
            let bvh = Bvh::new(objects, 0.0, 1.0, &mut rng).unwrap();

            let ray = Ray::new_simple(origin, direction);
            let expected = list.hit(&ray, forward(), &mut rng).map(|rec| rec.t);
            let actual = bvh.hit(&ray, forward(), &mut rng).map(|rec| rec.t);

            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => prop_assert!((e - a).abs() < 1e-9, "list {} bvh {}", e, a),
                other => prop_assert!(false, "list/bvh disagree: {:?}", other),
            }
        }

        #[test]
        fn bvh_box_contains_every_primitive(spheres in arb_spheres(), seed in any::<u64>()) {
            let objects: Vec<_> = spheres.iter().map(|&(c, r)| sphere(c, r)).collect();
            let mut rng = StdRng::seed_from_u64(seed);
            let bvh = Bvh::new(objects, 0.0, 1.0, &mut rng).unwrap();

            let root = bvh.bounding_box(0.0, 1.0);
            for object in bvh.objects() {
                prop_assert!(root.contains(&object.bounding_box(0.0, 1.0)));
            }
        }
    }
}
