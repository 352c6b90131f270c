//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::Material;
use ember_core::Mesh;
use ember_math::{Aabb, Interval, Ray, Vec3, MIN_THICKNESS};

/// Determinants below this are treated as a ray parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();

        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);
        // Axis-aligned triangles are flat along one axis
        let bbox = Aabb::from_points(min, max).padded(MIN_THICKNESS);

        Self {
            v0,
            v1,
            v2,
            normal,
            material,
            bbox,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Hittable for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        Some(HitRecord::new(
            ray,
            t,
            self.normal,
            self.material.as_ref(),
            (u, v),
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Turn every triangle of a mesh into a [`Triangle`] sharing `material`.
///
/// Triangles with out-of-range indices are dropped by the mesh (with a warning).
pub fn triangle_group(mesh: &Mesh, material: Arc<dyn Material>) -> HittableList {
    let mut group = HittableList::new();
    for [v0, v1, v2] in mesh.extract_triangle_vertices() {
        group.add(Box::new(Triangle::new(v0, v1, v2, material.clone())));
    }

    log::debug!("Built triangle group with {} triangles", group.len());
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Vec3::splat(0.5)))
    }

    fn xy_triangle() -> Triangle {
        // Triangle in XY plane at z=-1
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            gray(),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = xy_triangle();
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 1.0).abs() < 0.001);
        assert!(rec.front_face);
        assert!((0.0..=1.0).contains(&rec.u));
        assert!((0.0..=1.0).contains(&rec.v));
    }

    #[test]
    fn test_triangle_miss() {
        let tri = xy_triangle();

        // Ray pointing away
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());

        // Ray outside the edges
        let ray = Ray::new_simple(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_triangle_parallel_ray() {
        let tri = xy_triangle();
        let ray = Ray::new_simple(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_flat_triangle_box_is_padded() {
        let tri = xy_triangle();
        let bbox = tri.bounding_box();
        assert!(bbox.z.size() >= MIN_THICKNESS * 0.999);
        assert!(bbox.contains(Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_triangle_group_from_mesh() {
        let mesh = Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, -2.0),
                Vec3::new(1.0, 0.0, -2.0),
                Vec3::new(1.0, 1.0, -2.0),
                Vec3::new(0.0, 1.0, -2.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );
        let group = triangle_group(&mesh, gray());
        assert_eq!(group.len(), 2);

        let ray = Ray::new_simple(Vec3::new(0.25, 0.75, 0.0), -Vec3::Z);
        let rec = group.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-5);
    }
}
