//! Built-in scene presets.
//!
//! Each preset returns its primitives, a camera already sized for the
//! requested width and the background it is meant to be lit by. Image
//! textures and meshes are resolved against an assets directory; anything
//! that fails to load degrades (cyan texture, skipped mesh) instead of
//! aborting the render.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use ember_core::{load_obj, TextureCache};
use ember_renderer::{
    gen_f32, gen_range, triangle_group, Background, Bvh, Camera, CheckerTexture, Color, Dielectric, DiffuseLight,
    Hittable, ImageTexture, Lambertian, Material, Metal, NoiseTexture, Quad, Sphere, Texture, Vec3,
};
use rand::RngCore;

/// Scene preset to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SceneKind {
    /// Textured spheres on a checker floor under three area lights
    #[default]
    Showcase,
    /// Closed room of quads with a brick back wall
    Room,
    /// Field of random colored spheres around a mirror ball
    Spheres,
}

impl SceneKind {
    /// Mesh added to the scene when none is given explicitly.
    pub fn default_mesh(&self) -> Option<&'static str> {
        match self {
            SceneKind::Showcase => Some("obj/teapot.obj"),
            SceneKind::Room => Some("obj/cow.obj"),
            SceneKind::Spheres => None,
        }
    }
}

/// Inputs shared by every preset.
#[derive(Debug, Clone)]
pub struct SceneOptions {
    /// Output image width in pixels
    pub width: u32,
    /// Directory that relative texture and mesh paths resolve against
    pub assets: PathBuf,
    /// Mesh override; `None` uses the preset's default
    pub mesh: Option<PathBuf>,
    /// Leave the mesh out entirely
    pub no_mesh: bool,
}

/// A ready-to-render scene.
pub struct SceneSetup {
    pub objects: Vec<Box<dyn Hittable>>,
    pub camera: Camera,
    pub background: Background,
}

/// Give up on placing one more random sphere after this many overlaps.
const MAX_PLACEMENT_ATTEMPTS: usize = 100;

/// Build the preset `kind`. Random placement draws from `rng`.
pub fn build(kind: SceneKind, options: &SceneOptions, rng: &mut dyn RngCore) -> SceneSetup {
    let mut textures = TextureCache::with_base_dir(&options.assets);

    let mut setup = match kind {
        SceneKind::Showcase => showcase(options, &mut textures),
        SceneKind::Room => room(options, &mut textures),
        SceneKind::Spheres => spheres(options, rng),
    };

    let mesh_path = match (&options.mesh, kind.default_mesh()) {
        _ if options.no_mesh => None,
        (Some(path), _) => Some(path.clone()),
        (None, Some(default)) => Some(PathBuf::from(default)),
        (None, None) => None,
    };
    if let Some(path) = mesh_path {
        if let Some(mesh) = load_mesh(&options.assets.join(path), mesh_material(kind), rng) {
            setup.objects.push(mesh);
        }
    }

    log::info!(
        "Built {:?} scene: {} objects, {} textures",
        kind,
        setup.objects.len(),
        textures.len()
    );
    setup
}

fn camera(options: &SceneOptions, aspect_ratio: f32, look_from: Vec3) -> Camera {
    let mut camera = Camera::new()
        .with_image(options.width, aspect_ratio)
        .with_position(look_from, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_fov(65.0);
    camera.initialize();
    camera
}

fn lambertian(texture: impl Texture + 'static) -> Arc<dyn Material> {
    Arc::new(Lambertian::new(Arc::new(texture)))
}

fn image(textures: &mut TextureCache, path: &str) -> Arc<dyn Material> {
    lambertian(ImageTexture::new(textures.load(path)))
}

fn showcase(options: &SceneOptions, textures: &mut TextureCache) -> SceneSetup {
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::new(1.0, 1.0, 0.9)));
    let metal = |fuzz| -> Arc<dyn Material> { Arc::new(Metal::new(Color::splat(0.7), fuzz)) };
    let floor = lambertian(CheckerTexture::from_colors(
        4.0,
        Color::new(0.8, 0.0, 0.0),
        Color::splat(0.3),
    ));
    let checker = lambertian(CheckerTexture::from_colors(
        4.0,
        Color::new(0.3, 0.3, 0.9),
        Color::new(1.0, 0.5, 0.0),
    ));

    let spheres = [
        (Vec3::new(-2.5, 5.0, -12.0), 5.0, image(textures, "earth.jpg")),
        (Vec3::new(0.0, 0.8, 6.0), 0.8, image(textures, "basketball-ball.jpg")),
        (Vec3::new(6.0, 3.0, -8.0), 3.0, lambertian(NoiseTexture::new(1.0))),
        (Vec3::new(4.5, 1.8, 4.0), 1.8, Arc::new(Dielectric::new(1.5)) as Arc<dyn Material>),
        (Vec3::new(-9.0, 3.5, -4.0), 3.5, metal(0.0)),
        (Vec3::new(-3.5, 1.2, 5.0), 1.2, metal(0.15)),
        (Vec3::new(-8.0, 4.5, 2.0), 1.5, light.clone()),
        (Vec3::new(-8.0, 1.5, 2.0), 1.5, checker),
        (Vec3::new(12.0, 3.5, -4.0), 3.5, image(textures, "wall.jpg")),
        (Vec3::new(0.0, -1000.0, 0.0), 1000.0, floor),
        (Vec3::new(10.0, 6.0, 20.0), 1.5, light.clone()),
    ];

    let mut objects: Vec<Box<dyn Hittable>> = spheres
        .into_iter()
        .map(|(center, radius, material)| Box::new(Sphere::new(center, radius, material)) as Box<dyn Hittable>)
        .collect();

    // Ceiling panels
    for z in [8.0, -12.0, -32.0] {
        objects.push(Box::new(Quad::new(
            Vec3::new(-8.0, 12.0, z),
            Vec3::new(16.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 16.0),
            light.clone(),
        )));
    }

    SceneSetup {
        objects,
        camera: camera(options, 16.0 / 9.0, Vec3::new(0.0, 4.0, 12.0)),
        background: Background::default(),
    }
}

fn room(options: &SceneOptions, textures: &mut TextureCache) -> SceneSetup {
    let solid = |color: Color| -> Arc<dyn Material> { Arc::new(Lambertian::from_color(color)) };
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::new(1.0, 1.0, 0.9)));
    let floor = lambertian(CheckerTexture::from_colors(
        4.0,
        Color::new(0.2, 0.1, 0.3),
        Color::splat(0.2),
    ));

    let corner = Vec3::new(-15.0, -3.7, -15.0);
    let wall_height = Vec3::new(0.0, 25.0, 0.0);
    let width = Vec3::new(30.0, 0.0, 0.0);
    let depth = Vec3::new(0.0, 0.0, 35.0);

    let objects: Vec<Box<dyn Hittable>> = vec![
        // Left and right walls
        Box::new(Quad::new(corner, wall_height, depth, solid(Color::new(0.05, 0.75, 0.05)))),
        Box::new(Quad::new(
            Vec3::new(15.0, -3.7, -15.0),
            wall_height,
            depth,
            solid(Color::new(0.75, 0.05, 0.05)),
        )),
        // Ceiling
        Box::new(Quad::new(Vec3::new(-15.0, 21.3, -15.0), width, depth, solid(Color::splat(0.2)))),
        Box::new(Quad::new(corner, width, wall_height, image(textures, "bricks.jpg"))),
        Box::new(Quad::new(corner, width, depth, floor)),
        Box::new(Sphere::new(Vec3::new(0.0, 23.3, -3.0), 2.5, light)),
        Box::new(Sphere::new(Vec3::new(3.0, 0.0, 8.0), 2.3, Arc::new(Dielectric::new(1.5)))),
        Box::new(Sphere::new(
            Vec3::new(3.0, -3.0, 8.0),
            0.7,
            Arc::new(Metal::new(Color::splat(0.7), 0.3)),
        )),
        Box::new(Sphere::new(
            Vec3::new(-8.0, 0.8, -8.0),
            4.5,
            Arc::new(Metal::new(Color::splat(0.7), 0.0)),
        )),
    ];

    SceneSetup {
        objects,
        camera: camera(options, 3.0 / 2.0, Vec3::new(0.0, 8.0, 25.0)),
        background: Background::Dark,
    }
}

fn spheres(options: &SceneOptions, rng: &mut dyn RngCore) -> SceneSetup {
    let target = gen_range(rng, 70.0, 151.0) as usize;
    let mut placed: Vec<(Vec3, f32)> = Vec::with_capacity(target);
    let mut attempts = 0;

    while placed.len() < target {
        if attempts == MAX_PLACEMENT_ATTEMPTS {
            log::warn!(
                "Stopped placing spheres after {} overlapping attempts ({} of {} placed)",
                MAX_PLACEMENT_ATTEMPTS,
                placed.len(),
                target
            );
            break;
        }

        let radius = gen_range(rng, 0.5, 2.8);
        let x = gen_range(rng, -70.0, 70.0);
        let z = gen_range(rng, -70.0, 40.0);

        // Keep the area under the mirror ball clear
        if x.abs() < 3.0 && z.abs() < 3.0 {
            continue;
        }

        let center = Vec3::new(x, radius, z);
        if placed.iter().any(|&(c, r)| center.distance(c) < radius + r) {
            attempts += 1;
            continue;
        }
        attempts = 0;
        placed.push((center, radius));
    }

    let mut objects: Vec<Box<dyn Hittable>> = placed
        .into_iter()
        .map(|(center, radius)| {
            let hue = gen_f32(rng);
            let saturation = gen_range(rng, 0.8, 1.0);
            let value = gen_range(rng, 0.8, 1.0);
            let material: Arc<dyn Material> = Arc::new(Lambertian::from_color(hsv_to_rgb(hue, saturation, value)));
            Box::new(Sphere::new(center, radius, material)) as Box<dyn Hittable>
        })
        .collect();

    objects.push(Box::new(Sphere::new(
        Vec3::new(0.0, 10.0, 0.0),
        10.0,
        Arc::new(Metal::new(Color::splat(0.7), 0.0)),
    )));
    objects.push(Box::new(Sphere::new(
        Vec3::new(0.0, -2000.0, 0.0),
        2000.0,
        lambertian(CheckerTexture::from_colors(4.0, Color::splat(0.3), Color::splat(0.1))),
    )));

    SceneSetup {
        objects,
        camera: camera(options, 3.0 / 2.0, Vec3::new(0.0, 12.0, 35.0)),
        background: Background::Sky,
    }
}

fn mesh_material(kind: SceneKind) -> Arc<dyn Material> {
    let bronze = match kind {
        SceneKind::Room => Color::new(0.9, 0.7, 0.2),
        _ => Color::new(1.0, 0.6, 0.3),
    };
    Arc::new(Metal::new(bronze, 0.05))
}

/// Load an OBJ file as one object with its own BVH. Failures are logged and
/// the mesh is skipped.
fn load_mesh(path: &Path, material: Arc<dyn Material>, rng: &mut dyn RngCore) -> Option<Box<dyn Hittable>> {
    let mesh = match load_obj(path) {
        Ok(mesh) => mesh,
        Err(e) => {
            log::warn!("Skipping mesh {}: {}", path.display(), e);
            return None;
        }
    };
    if mesh.is_empty() {
        log::warn!("Skipping mesh {}: no triangles", path.display());
        return None;
    }

    let group = triangle_group(&mesh, material);
    let bvh = Bvh::new(group.into_objects(), rng);
    let bounds = bvh.bounding_box();
    log::info!(
        "Loaded mesh {} ({} triangles), bounds x [{:.2}, {:.2}] y [{:.2}, {:.2}] z [{:.2}, {:.2}]",
        path.display(),
        mesh.triangle_count(),
        bounds.x.min,
        bounds.x.max,
        bounds.y.min,
        bounds.y.max,
        bounds.z.min,
        bounds.z.max
    );
    Some(Box::new(bvh))
}

/// Convert HSV (all components in `[0, 1]`) to RGB.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Color {
    let sector = (h * 6.0) as i32;
    let f = h * 6.0 - sector as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    match sector.rem_euclid(6) {
        0 => Color::new(v, t, p),
        1 => Color::new(q, v, p),
        2 => Color::new(p, v, t),
        3 => Color::new(p, q, v),
        4 => Color::new(t, p, v),
        _ => Color::new(v, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    fn options() -> SceneOptions {
        SceneOptions {
            width: 120,
            assets: PathBuf::from("/definitely/not/here"),
            mesh: None,
            no_mesh: false,
        }
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Color::new(1.0, 0.0, 0.0));
        assert!((hsv_to_rgb(1.0 / 3.0, 1.0, 1.0) - Color::new(0.0, 1.0, 0.0)).length() < 1e-5);
        assert!((hsv_to_rgb(2.0 / 3.0, 1.0, 1.0) - Color::new(0.0, 0.0, 1.0)).length() < 1e-5);
        assert_eq!(hsv_to_rgb(0.5, 0.0, 0.4), Color::splat(0.4));
    }

    #[test]
    fn test_showcase_without_assets() {
        // Missing textures and mesh degrade instead of failing
        let mut rng = StdRng::seed_from_u64(1);
        let setup = build(SceneKind::Showcase, &options(), &mut rng);

        assert_eq!(setup.objects.len(), 14);
        assert_eq!(setup.background, Background::default());
        assert_eq!(setup.camera.image_width, 120);
        assert_eq!(setup.camera.image_height, 67);
    }

    #[test]
    fn test_room_layout() {
        let mut rng = StdRng::seed_from_u64(1);
        let setup = build(SceneKind::Room, &options(), &mut rng);

        assert_eq!(setup.objects.len(), 9);
        assert_eq!(setup.background, Background::Dark);
        assert_eq!(setup.camera.image_height, 80);
    }

    #[test]
    fn test_spheres_do_not_overlap() {
        let mut rng = StdRng::seed_from_u64(7);
        let setup = build(SceneKind::Spheres, &options(), &mut rng);

        // Random field plus the mirror ball and floor
        let count = setup.objects.len() - 2;
        assert!((70..=150).contains(&count), "{count} spheres");
        assert_eq!(setup.background, Background::Sky);

        let boxes: Vec<_> = setup.objects[..count].iter().map(|o| o.bounding_box()).collect();
        for (i, a) in boxes.iter().enumerate() {
            let (ca, ra) = (a.centroid(), a.x.size() / 2.0);
            assert!((ca.y - ra).abs() < 1e-4, "sphere {i} does not rest on the floor");
            for b in &boxes[i + 1..] {
                let (cb, rb) = (b.centroid(), b.x.size() / 2.0);
                assert!(ca.distance(cb) >= ra + rb - 1e-3);
            }
        }
    }

    #[test]
    fn test_explicit_mesh_is_added() {
        let dir = std::env::temp_dir().join(format!("ember_scene_mesh_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut file = std::fs::File::create(dir.join("tri.obj")).unwrap();
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").unwrap();

        let options = SceneOptions {
            assets: dir.clone(),
            mesh: Some(PathBuf::from("tri.obj")),
            ..options()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let setup = build(SceneKind::Spheres, &options, &mut rng);
        let without = build(
            SceneKind::Spheres,
            &SceneOptions {
                no_mesh: true,
                ..options.clone()
            },
            &mut StdRng::seed_from_u64(3),
        );
        assert_eq!(setup.objects.len(), without.objects.len() + 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
