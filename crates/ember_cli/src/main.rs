//! Ember - command line path tracer
//!
//! Builds one of the preset scenes, renders it across all cores and writes
//! the image to disk.

mod scenes;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ember_core::{save_image, GammaPlacement, RenderSettings, ScheduleKind};
use ember_renderer::{render, Bvh, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

use scenes::{SceneKind, SceneOptions};

/// Command line options. Flags override values from `--config`.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Scene preset to render.
    #[clap(long, value_enum, default_value_t = SceneKind::Showcase)]
    scene: SceneKind,

    /// OBJ mesh to add instead of the preset's default.
    #[clap(long, value_name = "FILE")]
    mesh: Option<PathBuf>,

    /// Leave the preset's mesh out.
    #[clap(long, conflicts_with = "mesh")]
    no_mesh: bool,

    /// Directory holding textures and meshes.
    #[clap(long, value_name = "DIR", default_value = ".")]
    assets: PathBuf,

    /// JSON render settings file.
    #[clap(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Image width in pixels.
    #[clap(long, short = 'w', value_name = "NUM")]
    width: Option<u32>,

    /// Samples per pixel.
    #[clap(long, short = 's', value_name = "NUM")]
    samples: Option<u32>,

    /// Maximum bounce depth.
    #[clap(long, short = 'd', value_name = "NUM")]
    depth: Option<u32>,

    /// Worker threads, 0 for all cores.
    #[clap(long, short = 't', value_name = "NUM")]
    threads: Option<usize>,

    /// Seed for scene placement, BVH construction and sampling.
    #[clap(long, value_name = "NUM")]
    seed: Option<u64>,

    /// Output image; `.ppm` writes ASCII PPM, other extensions go through `image`.
    #[clap(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Render center-out buckets instead of row blocks.
    #[clap(long)]
    buckets: bool,

    /// Bucket edge length in pixels.
    #[clap(long, value_name = "NUM")]
    bucket_size: Option<u32>,

    /// Gamma-correct every bounce instead of once per pixel.
    #[clap(long)]
    legacy_gamma: bool,
}

impl Args {
    /// Settings file (or defaults) with the command line layered on top.
    fn settings(&self) -> Result<RenderSettings> {
        let mut settings = match &self.config {
            Some(path) => RenderSettings::from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => RenderSettings::default(),
        };

        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(samples) = self.samples {
            settings.samples_per_pixel = samples;
        }
        if let Some(depth) = self.depth {
            settings.max_depth = depth;
        }
        if let Some(threads) = self.threads {
            settings.threads = threads;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if self.buckets {
            settings.schedule = ScheduleKind::Buckets;
        }
        if let Some(size) = self.bucket_size {
            settings.bucket_size = size;
        }
        if self.legacy_gamma {
            settings.gamma = GammaPlacement::PerSample;
        }

        settings.validate().context("Invalid render settings")?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let settings = args.settings()?;
    log::debug!("Settings: {:?}", settings);

    let options = SceneOptions {
        width: settings.width,
        assets: args.assets.clone(),
        mesh: args.mesh.clone(),
        no_mesh: args.no_mesh,
    };

    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let scene = scenes::build(args.scene, &options, &mut rng);
    let world = Bvh::new(scene.objects, &mut rng);
    log::info!("Scene ready in {:.2?}", start.elapsed());

    let config = RenderConfig {
        background: scene.background,
        ..RenderConfig::from(&settings)
    };
    let frame = render(&scene.camera, &world, &config).context("Render failed")?;

    save_image(&settings.output, frame.width, frame.height, &frame.to_rgb8())
        .with_context(|| format!("Failed to write {}", settings.output.display()))?;
    log::info!("Wrote {}", settings.output.display());

    Ok(())
}
