//! Ember renderer - CPU path tracing
//!
//! A Monte Carlo path tracer for physically-based rendering: spheres,
//! triangles and quads behind a BVH, diffuse, metallic, glass and emissive
//! materials, procedural and image textures, and a deterministic parallel
//! scheduler.

mod bucket;
mod bvh;
mod camera;
mod hittable;
mod material;
mod perlin;
mod quad;
mod renderer;
mod sampling;
mod scheduler;
mod sphere;
mod texture;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhNode};
pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    reflect, refract, ClampedMetal, Color, Dielectric, DiffuseLight, FresnelDielectric, Lambertian, Material,
    Metal, ScatterResult,
};
pub use perlin::{Perlin, DEFAULT_OCTAVES};
pub use quad::Quad;
pub use renderer::{
    color_to_rgb8, gamma_correct, linear_to_gamma, ray_color, render_pixel, Background, FrameBuffer, GammaMode,
    RenderConfig, Schedule, GAMMA, T_MIN,
};
pub use sampling::{gen_f32, gen_index, gen_range, pixel_rng, random_unit_vector};
pub use scheduler::{render, row_ranges, RenderError, RenderResult};
pub use sphere::Sphere;
pub use texture::{CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture, MISSING_TEXTURE_COLOR};
pub use triangle::{triangle_group, Triangle};

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Aabb, Interval, Ray, Vec3};
