//! Ember math - vectors, intervals, rays and bounding boxes.
//!
//! Vector types come straight from glam; everything else here is the small
//! set of geometric value types shared by the renderer and the scene loaders.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::{Aabb, MIN_THICKNESS};
pub use interval::Interval;
pub use ray::Ray;
