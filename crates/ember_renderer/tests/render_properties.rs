//! Cross-module properties of the renderer: BVH traversal against a brute
//! force list, and a full render written out and read back as PPM.

use std::sync::Arc;

use ember_renderer::{
    gen_range, render, Background, Bvh, Camera, Color, DiffuseLight, FrameBuffer, Hittable, HittableList,
    Interval, Lambertian, Material, Quad, Ray, RenderConfig, Sphere, Vec3, T_MIN,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

enum Shape {
    Sphere(Vec3, f32),
    Quad(Vec3, Vec3, Vec3),
}

fn random_shapes(n: usize, rng: &mut StdRng) -> Vec<Shape> {
    (0..n)
        .map(|i| {
            let corner = Vec3::new(
                gen_range(rng, -10.0, 10.0),
                gen_range(rng, -10.0, 10.0),
                gen_range(rng, -10.0, 10.0),
            );
            if i % 4 == 3 {
                let u = Vec3::new(gen_range(rng, 0.5, 3.0), 0.0, gen_range(rng, -1.0, 1.0));
                let v = Vec3::new(0.0, gen_range(rng, 0.5, 3.0), gen_range(rng, -1.0, 1.0));
                Shape::Quad(corner, u, v)
            } else {
                Shape::Sphere(corner, gen_range(rng, 0.2, 2.0))
            }
        })
        .collect()
}

fn build(shapes: &[Shape], material: &Arc<dyn Material>) -> Vec<Box<dyn Hittable>> {
    shapes
        .iter()
        .map(|shape| -> Box<dyn Hittable> {
            match *shape {
                Shape::Sphere(center, radius) => Box::new(Sphere::new(center, radius, material.clone())),
                Shape::Quad(q, u, v) => Box::new(Quad::new(q, u, v, material.clone())),
            }
        })
        .collect()
}

fn random_ray(rng: &mut StdRng) -> Ray {
    let origin = Vec3::new(
        gen_range(rng, -15.0, 15.0),
        gen_range(rng, -15.0, 15.0),
        gen_range(rng, -15.0, 15.0),
    );
    // Aim somewhere inside the populated region
    let target = Vec3::new(
        gen_range(rng, -8.0, 8.0),
        gen_range(rng, -8.0, 8.0),
        gen_range(rng, -8.0, 8.0),
    );
    Ray::new_simple(origin, target - origin)
}

#[test]
fn bvh_matches_brute_force() {
    let material: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::splat(0.5)));
    let ray_t = Interval::new(T_MIN, f32::INFINITY);

    for seed in 0..6u64 {
        for n in 1..=24 {
            let mut rng = StdRng::seed_from_u64(seed * 1000 + n as u64);
            let shapes = random_shapes(n, &mut rng);

            let list = HittableList::from(build(&shapes, &material));
            let bvh = Bvh::new(build(&shapes, &material), &mut rng);
            assert_eq!(bvh.len(), n);

            for _ in 0..200 {
                let ray = random_ray(&mut rng);
                let expected = list.hit(&ray, ray_t);
                let actual = bvh.hit(&ray, ray_t);

                match (expected, actual) {
                    (None, None) => {}
                    (Some(e), Some(a)) => {
                        assert!((e.t - a.t).abs() < 1e-4, "seed {seed}, n {n}: {} vs {}", e.t, a.t);
                        assert!((e.p - a.p).length() < 1e-3);
                    }
                    (e, a) => panic!(
                        "seed {seed}, n {n}: list hit {:?}, bvh hit {:?}",
                        e.map(|r| r.t),
                        a.map(|r| r.t)
                    ),
                }
            }
        }
    }
}

#[test]
fn single_primitive_bvh_is_transparent() {
    let material: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::ONE));
    let sphere = || Sphere::new(Vec3::new(1.0, 2.0, -4.0), 1.5, material.clone());
    let bvh = Bvh::with_seed(vec![Box::new(sphere())], 17);
    let bare = sphere();

    let mut rng = StdRng::seed_from_u64(5);
    let ray_t = Interval::new(T_MIN, f32::INFINITY);
    for _ in 0..500 {
        let ray = random_ray(&mut rng);
        assert_eq!(bare.hit(&ray, ray_t).map(|r| r.t), bvh.hit(&ray, ray_t).map(|r| r.t));
    }
    assert_eq!(bare.bounding_box(), bvh.bounding_box());
}

#[test]
fn emissive_frame_round_trips_through_ppm() {
    // Camera sits inside a red light sphere: every path terminates on emission
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::new(1.0, 0.0, 0.0)));
    let world = Bvh::with_seed(vec![Box::new(Sphere::new(Vec3::ZERO, 50.0, light))], 1);

    let mut camera = Camera::new()
        .with_image(6, 3.0 / 2.0)
        .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_fov(60.0);
    camera.initialize();

    let config = RenderConfig {
        samples_per_pixel: 3,
        background: Background::Dark,
        threads: 2,
        ..RenderConfig::default()
    };
    let frame: FrameBuffer = render(&camera, &world, &config).unwrap();
    let bytes = frame.to_rgb8();
    assert!(bytes.iter().all(|&px| px == [255, 0, 0]));

    let mut encoded = Vec::new();
    ember_core::write_ppm(&mut encoded, frame.width, frame.height, &bytes).unwrap();
    let text = String::from_utf8(encoded.clone()).unwrap();
    assert!(text.starts_with("P3\n6 4\n255\n"));
    assert_eq!(text.lines().filter(|l| *l == "255 0 0").count(), 24);

    let decoded = ember_core::read_ppm(encoded.as_slice()).unwrap();
    assert_eq!((decoded.width, decoded.height), (6, 4));
    assert_eq!(decoded.pixels, bytes);
}
