//! Ember Core - scene assets and I/O for the Ember path tracer.
//!
//! This crate provides:
//!
//! - **Meshes**: `Mesh` and a tolerant OBJ loader
//! - **Textures**: image decoding into linear RGB plus a decode cache
//! - **Image sink**: ASCII PPM writer/reader and extension-based saving
//! - **Settings**: JSON render settings with defaults
//!
//! # Example
//!
//! ```ignore
//! use ember_core::mesh::load_obj;
//!
//! let mesh = load_obj("bunny.obj")?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//! ```

pub mod config;
pub mod mesh;
pub mod ppm;
pub mod texture;

// Re-export commonly used types
pub use config::{ConfigError, GammaPlacement, RenderSettings, ScheduleKind};
pub use mesh::{load_obj, parse_obj, Mesh, MeshError};
pub use ppm::{load_ppm, read_ppm, save_image, save_ppm, write_ppm, PpmError, PpmImage};
pub use texture::{TextureCache, TextureError, TextureImage};
