//! Triangle mesh geometry and the OBJ text loader.
//!
//! Only the records a path tracer needs are read: `v` (positions) and `f`
//! (faces). Everything else (`vn`, `vt`, groups, materials) is ignored.
//! Records are checked line by line before `tobj` sees them; malformed or
//! out-of-range ones are skipped with a warning, so a partially broken file
//! still yields the triangles that can be recovered.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ember_math::{Aabb, Vec3};
use thiserror::Error;

/// Errors that can occur while loading a mesh file.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A mesh consisting of vertex positions and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box of the positions
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::EMPTY;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for pos in positions {
            min = min.min(*pos);
            max = max.max(*pos);
        }

        Aabb::from_points(min, max)
    }

    /// Get the mesh center (center of bounding box).
    pub fn center(&self) -> Vec3 {
        self.bounds.centroid()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Extract triangle vertices as `[v0, v1, v2]` triplets.
    ///
    /// Triangles referencing vertices outside the position list are dropped
    /// with a warning.
    pub fn extract_triangle_vertices(&self) -> Vec<[Vec3; 3]> {
        let mut triangles = Vec::with_capacity(self.triangle_count());

        for chunk in self.indices.chunks_exact(3) {
            let i0 = chunk[0] as usize;
            let i1 = chunk[1] as usize;
            let i2 = chunk[2] as usize;

            if i0 >= self.positions.len()
                || i1 >= self.positions.len()
                || i2 >= self.positions.len()
            {
                log::warn!(
                    "Invalid triangle indices: [{}, {}, {}], vertex count: {}",
                    i0,
                    i1,
                    i2,
                    self.positions.len()
                );
                continue;
            }

            triangles.push([self.positions[i0], self.positions[i1], self.positions[i2]]);
        }

        triangles
    }
}

/// Load an OBJ file from disk.
///
/// A missing or unreadable file is an error; bad records inside a readable
/// file are not (see [`parse_obj`]).
pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Mesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mesh = parse_obj(BufReader::new(file), &path.display().to_string())?;

    log::info!(
        "Loaded mesh {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    if !mesh.positions.is_empty() {
        let (min, max) = (mesh.bounds.min(), mesh.bounds.max());
        log::info!(
            "Mesh bounds: X [{:.3}, {:.3}] Y [{:.3}, {:.3}] Z [{:.3}, {:.3}]",
            min.x,
            max.x,
            min.y,
            max.y,
            min.z,
            max.z
        );
    }

    Ok(mesh)
}

/// Parse OBJ text from any buffered reader.
///
/// `source` only labels diagnostics. Usable `v` and `f` records are handed
/// to `tobj`, which fan-triangulates faces with more than three corners.
/// Positions come back in first-use order and vertices no face references
/// are dropped.
pub fn parse_obj<R: BufRead>(reader: R, source: &str) -> MeshResult<Mesh> {
    let records = filter_records(reader, source)?;

    let (models, _materials) = tobj::load_obj_buf(
        &mut records.as_bytes(),
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
        // Material records are filtered out above
        |_| Err(tobj::LoadError::OpenFileFailed),
    )?;

    let mut positions = Vec::new();
    let mut indices = Vec::new();
    for model in models {
        let base = positions.len() as u32;
        positions.extend(
            model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        );
        indices.extend(model.mesh.indices.iter().map(|i| base + i));
    }

    Ok(Mesh::new(positions, indices))
}

/// Rewrite the usable `v` and `f` records as plain OBJ text.
///
/// Face corners become absolute position indices, so texture and normal
/// references never reach the parser. Lines that are not valid UTF-8 are
/// decoded lossily and then judged like any other line.
fn filter_records<R: BufRead>(reader: R, source: &str) -> MeshResult<String> {
    let mut records = String::new();
    let mut vertex_count = 0usize;
    let mut skipped = 0usize;

    for (line_no, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line_no = line_no + 1;
        let text = String::from_utf8_lossy(&bytes);
        let line = text.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => match parse_vertex(tokens) {
                Some(p) => {
                    records.push_str(&format!("v {} {} {}\n", p.x, p.y, p.z));
                    vertex_count += 1;
                }
                None => {
                    log::warn!("{}:{}: malformed vertex, skipping: {}", source, line_no, line);
                    skipped += 1;
                }
            },
            Some("f") => match parse_face(tokens, vertex_count) {
                Ok(corners) => {
                    records.push('f');
                    for corner in corners {
                        records.push_str(&format!(" {}", corner + 1));
                    }
                    records.push('\n');
                }
                Err(message) => {
                    log::warn!("{}:{}: {}, skipping: {}", source, line_no, message, line);
                    skipped += 1;
                }
            },
            _ => {}
        }
    }

    if skipped > 0 {
        log::warn!("{}: skipped {} malformed line(s)", source, skipped);
    }

    Ok(records)
}

fn parse_vertex<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<Vec3> {
    let x = tokens.next()?.parse().ok()?;
    let y = tokens.next()?.parse().ok()?;
    let z = tokens.next()?.parse().ok()?;
    Some(Vec3::new(x, y, z)).filter(|p| p.is_finite())
}

/// Resolve the corners of a face record into zero-based vertex indices.
fn parse_face<'a>(
    tokens: impl Iterator<Item = &'a str>,
    vertex_count: usize,
) -> Result<Vec<u32>, String> {
    let mut corners = Vec::with_capacity(4);

    for token in tokens {
        // `v`, `v/vt`, `v//vn` and `v/vt/vn` all start with the position index
        let index_str = token.split('/').next().unwrap_or(token);
        let index: i64 = index_str
            .parse()
            .map_err(|_| format!("bad vertex index '{}'", token))?;

        let resolved = match index {
            i if i > 0 => i - 1,
            i if i < 0 => vertex_count as i64 + i,
            _ => return Err("vertex index 0 is not valid".to_string()),
        };

        if resolved < 0 || resolved >= vertex_count as i64 {
            return Err(format!(
                "vertex index {} out of range ({} vertices)",
                index, vertex_count
            ));
        }
        corners.push(resolved as u32);
    }

    if corners.len() < 3 {
        return Err(format!("face needs at least 3 vertices, got {}", corners.len()));
    }

    Ok(corners)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Mesh {
        parse_obj(text.as_bytes(), "test.obj").unwrap()
    }

    #[test]
    fn test_mesh_creation() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2]);

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2]);

        assert_eq!(mesh.bounds.min(), Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.max(), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(mesh.center(), Vec3::new(1.5, 1.5, 1.5));
    }

    #[test]
    fn test_parse_triangle() {
        let mesh = parse(
            "# a single triangle\n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             f 1 2 3\n",
        );

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_parse_quad_is_fan_triangulated() {
        let mesh = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             f 1/1/1 2/2/1 3/3/1 4/4/1\n",
        );

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_parse_negative_indices() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n");
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let mesh = parse(
            "v 0 0 0\n\
             v 1 0 0\n\
             v nope 0 0\n\
             v 0 1 0\n\
             f 1 2\n\
             f 1 2 9\n\
             f 1 x 3\n\
             f 0 1 2\n\
             vn 0 0 1\n\
             usemtl bronze\n\
             f 1 2 3\n",
        );

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_invalid_utf8_lines_are_not_fatal() {
        let bytes = b"v 0 0 0\nv 1 0 0\nv 0 1 0\n# caf\xe9 comment\nf 1 2 3\n";
        let mesh = parse_obj(&bytes[..], "latin1.obj").unwrap();
        assert_eq!(mesh.triangle_count(), 1);

        // A record with a stray byte is skipped like any other bad record
        let bytes = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nv 2\xff 0 0\nf 1 2 3\nf 1 2 4\n";
        let mesh = parse_obj(&bytes[..], "latin1.obj").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_non_finite_vertex_is_skipped() {
        let mesh = parse("v 0 0 0\nv NaN 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.positions.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_positions_follow_face_order() {
        let mesh = parse(
            "v 9 9 9\n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             f 4 2 3\n",
        );

        // The unreferenced first vertex is dropped
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(
            mesh.extract_triangle_vertices(),
            vec![[Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, Vec3::X]]
        );
    }

    #[test]
    fn test_empty_input_gives_empty_mesh() {
        let mesh = parse("# nothing here\n");
        assert!(mesh.is_empty());
        assert_eq!(mesh.bounds, Aabb::EMPTY);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = load_obj("/definitely/not/here/teapot.obj");
        assert!(matches!(result, Err(MeshError::Io(_))));
    }

    #[test]
    fn test_extract_triangle_vertices() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        // Second triangle references a vertex that does not exist
        let mesh = Mesh::new(positions.clone(), vec![0, 1, 2, 1, 7, 2]);
        let triangles = mesh.extract_triangle_vertices();

        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles[0], [positions[0], positions[1], positions[2]]);
    }
}
