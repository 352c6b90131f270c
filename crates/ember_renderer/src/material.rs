//! Material trait for surface scattering.
//!
//! `Lambertian`, `Metal`, `Dielectric` and `DiffuseLight` give the renderer
//! its default look: metal always scatters and glass always refracts.
//! `ClampedMetal` and `FresnelDielectric` are stricter alternates that absorb
//! below-surface reflections and split reflection/refraction by Fresnel.

use std::sync::Arc;

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, near_zero, random_unit_vector};
use crate::texture::{SolidColor, Texture};
use ember_math::{Ray, Vec3};
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Result of a successful scatter event.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Componentwise multiplier for the light carried back along `scattered`
    pub attenuation: Color,
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult>;

    /// Get emitted light from this material.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    texture: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material sampling `texture` for its albedo.
    pub fn new(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }

    /// Lambertian with a constant albedo.
    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Lambertian {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if near_zero(scatter_direction) {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.texture.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, scatter_direction, ray_in.time()),
        })
    }
}

/// Metal (specular) material.
///
/// Fuzzed reflections are never rejected, even when they point into the
/// surface.
#[derive(Debug, Clone, Copy)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    fn fuzzed_reflection(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Vec3 {
        reflect(ray_in.direction().normalize(), rec.normal) + self.fuzz * random_unit_vector(rng)
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let direction = self.fuzzed_reflection(ray_in, rec, rng);
        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Metal that absorbs fuzzed reflections pointing below the surface.
#[derive(Debug, Clone, Copy)]
pub struct ClampedMetal(Metal);

impl ClampedMetal {
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self(Metal::new(albedo, fuzz))
    }
}

impl Material for ClampedMetal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let direction = self.0.fuzzed_reflection(ray_in, rec, rng);

        // Only scatter if the reflected ray is in the same hemisphere as the normal
        if direction.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.0.albedo,
                scattered: Ray::new(rec.p, direction, ray_in.time()),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material that always refracts.
#[derive(Debug, Clone, Copy)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    fn ratio(&self, front_face: bool) -> f32 {
        if front_face {
            1.0 / self.ior
        } else {
            self.ior
        }
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let unit_direction = ray_in.direction().normalize();
        let refracted = refract(unit_direction, rec.normal, self.ratio(rec.front_face));

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, refracted, ray_in.time()),
        })
    }
}

/// Dielectric with total internal reflection and Schlick reflectance.
#[derive(Debug, Clone, Copy)]
pub struct FresnelDielectric(Dielectric);

impl FresnelDielectric {
    pub fn new(ior: f32) -> Self {
        Self(Dielectric::new(ior))
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for FresnelDielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let refraction_ratio = self.0.ratio(rec.front_face);

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction =
            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
                reflect(unit_direction, rec.normal)
            } else {
                refract(unit_direction, rec.normal, refraction_ratio)
            };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Diffuse light emitter.
#[derive(Clone)]
pub struct DiffuseLight {
    texture: Arc<dyn Texture>,
}

impl DiffuseLight {
    /// Create a new diffuse light emitting the texture's value.
    pub fn new(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }

    /// Diffuse light with a constant emission color.
    pub fn from_color(emit: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(emit)))
    }
}

impl Material for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        self.texture.value(u, v, p)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
///
/// The square root takes `abs()` of its argument, so a grazing ray past the
/// critical angle still yields a finite direction.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
