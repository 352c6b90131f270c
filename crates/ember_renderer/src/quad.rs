//! Planar parallelogram primitive.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use ember_math::{Aabb, Interval, Ray, Vec3, MIN_THICKNESS};

/// Parallelogram spanned by `u` and `v` from corner `q`.
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / (n . n)`, projects hit offsets onto plane coordinates
    w: Vec3,
    normal: Vec3,
    /// Plane offset: `normal . x = d`
    d: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let d = normal.dot(q);
        let n_len_sq = n.length_squared();
        let w = if n_len_sq > 0.0 { n / n_len_sq } else { Vec3::ZERO };

        // Bounding box of all four vertices
        let diagonal1 = Aabb::from_points(q, q + u + v);
        let diagonal2 = Aabb::from_points(q + u, q + v);
        let bbox = Aabb::combine(&diagonal1, &diagonal2).padded(MIN_THICKNESS);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d,
            material,
            bbox,
        }
    }
}

impl Hittable for Quad {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let denom = self.normal.dot(ray.direction());

        // No hit if the ray is parallel to the plane
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        // Plane coordinates of the hit point
        let planar = ray.at(t) - self.q;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));

        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }

        Some(HitRecord::new(
            ray,
            t,
            self.normal,
            self.material.as_ref(),
            (alpha, beta),
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
