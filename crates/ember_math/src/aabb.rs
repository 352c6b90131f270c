use crate::{Interval, Ray, Vec3};

/// Minimum extent primitives pad their boxes to, so flat shapes (quads,
/// axis-aligned triangles) still give the slab test a non-empty volume.
pub const MIN_THICKNESS: f32 = 0.01;

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Boxes built through [`Aabb::from_points`] always satisfy `min <= max` per axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));
        Self { x, y, z }
    }

    /// Create the minimal AABB enclosing two other AABBs.
    pub fn combine(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Returns true if `p` lies inside the box (boundary included).
    pub fn contains(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Uses the slab method. A zero direction component gives an infinite
    /// inverse; the resulting infinities (or NaN when the origin sits exactly
    /// on a slab plane) are absorbed by `f32::max`/`f32::min`, so the test
    /// always terminates with a defined answer.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        let ray_orig = r.origin;
        let ray_dir = r.direction;

        for axis in 0..3 {
            let ax = self.axis_interval(axis);
            let adinv = 1.0 / ray_dir[axis];

            let mut t0 = (ax.min - ray_orig[axis]) * adinv;
            let mut t1 = (ax.max - ray_orig[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Pad every axis thinner than `min_size` up to `min_size`, keeping it centered.
    pub fn padded(mut self, min_size: f32) -> Self {
        if self.x.size() < min_size {
            self.x = self.x.expand(min_size - self.x.size());
        }
        if self.y.size() < min_size {
            self.y = self.y.expand(min_size - self.y.size());
        }
        if self.z.size() < min_size {
            self.z = self.z.expand(min_size - self.z.size());
        }
        self
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    /// Fold seed for [`Aabb::combine`]; the only box allowed to have min > max.
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_at(offset: Vec3) -> Aabb {
        Aabb::from_points(offset, offset + Vec3::ONE)
    }

    #[test]
    fn test_aabb_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));

        assert_eq!(aabb.min(), Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(aabb.max(), Vec3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_aabb_combine_corners() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, -3.0, 3.0), Vec3::new(10.0, 1.0, 10.0));
        let combined = Aabb::combine(&box1, &box2);

        assert_eq!(combined.min(), box1.min().min(box2.min()));
        assert_eq!(combined.max(), box1.max().max(box2.max()));
    }

    #[test]
    fn test_aabb_combine_contains_inputs() {
        let offsets = [
            Vec3::new(-4.0, 2.0, 0.5),
            Vec3::new(3.0, -1.0, 7.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(12.5, 3.25, -9.0),
        ];

        for a in offsets {
            for b in offsets {
                let box_a = unit_box_at(a);
                let box_b = unit_box_at(b);
                let combined = Aabb::combine(&box_a, &box_b);

                for corner in [box_a.min(), box_a.max(), box_b.min(), box_b.max()] {
                    assert!(combined.contains(corner));
                }
                assert!(combined.contains(box_a.centroid()));
                assert!(combined.contains(box_b.centroid()));
            }
        }
    }

    #[test]
    fn test_aabb_combine_with_empty() {
        let aabb = unit_box_at(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Aabb::combine(&Aabb::EMPTY, &aabb), aabb);
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_aabb_parallel_ray_misses_disjoint_boxes() {
        let left = Aabb::from_points(Vec3::new(-3.0, -1.0, -1.0), Vec3::new(-2.0, 1.0, 1.0));
        let right = Aabb::from_points(Vec3::new(2.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        let window = Interval::new(0.0, f32::INFINITY);

        // Travels along +Z above both boxes: parallel to X and Y slabs, outside Y.
        let above = Ray::new(Vec3::new(0.0, 5.0, -10.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(!left.hit(&above, window));
        assert!(!right.hit(&above, window));

        // Travels along +Z through the gap between them.
        let between = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(!left.hit(&between, window));
        assert!(!right.hit(&between, window));
    }

    #[test]
    fn test_aabb_ray_through_both_boxes() {
        let left = Aabb::from_points(Vec3::new(-3.0, -1.0, -1.0), Vec3::new(-2.0, 1.0, 1.0));
        let right = Aabb::from_points(Vec3::new(2.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        let window = Interval::new(0.0, f32::INFINITY);

        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0.0);
        assert!(left.hit(&ray, window));
        assert!(right.hit(&ray, window));
    }

    #[test]
    fn test_aabb_zero_direction_component_terminates() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let window = Interval::new(0.0, 100.0);

        // Origin exactly on the x = 0 face plane, no x motion: (0 - 0) * inf = NaN.
        let on_face = Ray::new(Vec3::new(0.0, 0.5, -2.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        let first = aabb.hit(&on_face, window);
        assert_eq!(first, aabb.hit(&on_face, window));

        // Inside the x slab: hits.
        let inside = Ray::new(Vec3::new(0.5, 0.5, -2.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(aabb.hit(&inside, window));

        // Outside the x slab: misses.
        let outside = Ray::new(Vec3::new(1.5, 0.5, -2.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(!aabb.hit(&outside, window));

        // Negative zero inverts to -inf and takes the swap path.
        let neg_zero = Ray::new(Vec3::new(0.5, 0.5, -2.0), Vec3::new(-0.0, 0.0, 1.0), 0.0);
        assert!(aabb.hit(&neg_zero, window));
    }

    #[test]
    fn test_aabb_padded() {
        let flat = Aabb::from_points(Vec3::new(0.0, 2.0, 0.0), Vec3::new(4.0, 2.0, 4.0));
        let padded = flat.padded(MIN_THICKNESS);

        assert!((padded.y.size() - MIN_THICKNESS).abs() < 1e-5);
        assert!((padded.centroid().y - 2.0).abs() < 1e-6);
        assert_eq!(padded.x, flat.x);
        assert_eq!(padded.z, flat.z);
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 5.0, 5.0));
    }
}
