//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The hierarchy owns every primitive in a flat arena; tree nodes refer to
//! them by index. Branches own their children exclusively, leaves hold one or
//! two arena indices. A single-primitive leaf stores the same index twice and
//! is tested once.

use crate::sampling::gen_index;
use crate::{HitRecord, Hittable};
use ember_math::{Aabb, Interval, Ray};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// BVH node - either a branch with two children or a leaf over the arena.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf referencing one (`left == right`) or two primitives.
    Leaf { left: usize, right: usize, bbox: Aabb },
}

impl BvhNode {
    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Recursive construction over `indices`.
    ///
    /// Splits on a uniformly random axis, ordering by each box's minimum on
    /// that axis and cutting at the midpoint.
    fn build(boxes: &[Aabb], indices: &mut [usize], rng: &mut dyn RngCore) -> Self {
        match *indices {
            [only] => {
                return BvhNode::Leaf {
                    left: only,
                    right: only,
                    bbox: boxes[only],
                }
            }
            [left, right] => {
                return BvhNode::Leaf {
                    left,
                    right,
                    bbox: Aabb::combine(&boxes[left], &boxes[right]),
                }
            }
            _ => {}
        }

        let axis = gen_index(rng, 3);
        indices.sort_by(|&a, &b| {
            let a_min = boxes[a].axis_interval(axis).min;
            let b_min = boxes[b].axis_interval(axis).min;
            a_min.total_cmp(&b_min)
        });

        let mid = indices.len() / 2;
        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = Self::build(boxes, left_indices, rng);
        let right = Self::build(boxes, right_indices, rng);
        let bbox = Aabb::combine(&left.bbox(), &right.bbox());

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    fn hit<'a>(
        &self,
        primitives: &'a [Box<dyn Hittable>],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<HitRecord<'a>> {
        if !self.bbox().hit(ray, ray_t) {
            return None;
        }

        match *self {
            BvhNode::Leaf { left, right, .. } => {
                let hit_left = primitives[left].hit(ray, ray_t);
                if left == right {
                    return hit_left;
                }
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = primitives[right].hit(ray, Interval::new(ray_t.min, right_max));
                hit_right.or(hit_left)
            }
            BvhNode::Branch {
                ref left,
                ref right,
                ..
            } => {
                let hit_left = left.hit(primitives, ray, ray_t);

                // Only check right up to closest hit
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(primitives, ray, Interval::new(ray_t.min, right_max));

                hit_right.or(hit_left)
            }
        }
    }
}

/// A BVH over an arena of primitives.
pub struct Bvh {
    primitives: Vec<Box<dyn Hittable>>,
    root: BvhNode,
}

impl Bvh {
    /// Build a BVH, drawing split axes from `rng`.
    ///
    /// # Panics
    ///
    /// Panics if `primitives` is empty.
    pub fn new(primitives: Vec<Box<dyn Hittable>>, rng: &mut dyn RngCore) -> Self {
        assert!(!primitives.is_empty(), "cannot build a BVH over zero primitives");

        let boxes: Vec<Aabb> = primitives.iter().map(|p| p.bounding_box()).collect();
        let mut indices: Vec<usize> = (0..primitives.len()).collect();
        let root = BvhNode::build(&boxes, &mut indices, rng);

        let bvh = Self { primitives, root };
        log::info!(
            "Built BVH over {} primitives (depth {})",
            bvh.len(),
            bvh.depth()
        );
        bvh
    }

    /// Build a BVH with split axes drawn from a generator seeded with `seed`.
    ///
    /// # Panics
    ///
    /// Panics if `primitives` is empty.
    pub fn with_seed(primitives: Vec<Box<dyn Hittable>>, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new(primitives, &mut rng)
    }

    /// Number of primitives in the arena.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Always false; an empty BVH cannot be built.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Number of node levels from root to the deepest leaf.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }
}

impl Hittable for Bvh {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.root.hit(&self.primitives, ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.root.bbox()
    }
}
