//! Parallel render scheduling.
//!
//! A rayon pool is built for each render and dropped at its end. In row mode
//! every worker owns a contiguous block of rows and writes straight into its
//! own slice of the frame buffer. In bucket mode the pool work-steals
//! center-out buckets and the results are copied in after the join.
//!
//! Progress is a relaxed atomic counter of finished rows or buckets, logged
//! by a monitor thread until the workers are done.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::renderer::{render_pixel, FrameBuffer, RenderConfig, Schedule};
use crate::sampling::pixel_rng;
use crate::{Camera, Color, Hittable};

/// Errors that can occur while scheduling a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Split `0..height` into one contiguous range per worker.
///
/// Every range gets `height / workers` rows and the last one absorbs the
/// remainder. Never yields more ranges than rows.
pub fn row_ranges(height: u32, workers: usize) -> Vec<Range<u32>> {
    if height == 0 {
        return Vec::new();
    }

    let workers = workers.clamp(1, height as usize) as u32;
    let rows_per_worker = height / workers;

    (0..workers)
        .map(|i| {
            let start = i * rows_per_worker;
            let end = if i + 1 == workers {
                height
            } else {
                start + rows_per_worker
            };
            start..end
        })
        .collect()
}

/// Render the camera's full image.
///
/// The output depends only on the scene, camera and `config.seed`: any thread
/// count and either schedule produce the same pixels.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> RenderResult<FrameBuffer> {
    let (width, height) = (camera.image_width, camera.image_height);
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }

    let threads = if config.threads == 0 {
        rayon::current_num_threads()
    } else {
        config.threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("ember-worker-{i}"))
        .build()?;

    log::info!(
        "Rendering {}x{} at {} spp, depth {}, {} threads, {:?}",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        threads,
        config.schedule
    );

    let start = Instant::now();
    let mut frame = FrameBuffer::new(width, height);
    let progress = AtomicUsize::new(0);
    let done = AtomicBool::new(false);

    let (total, unit) = match config.schedule {
        Schedule::Rows => (height as usize, "rows"),
        Schedule::Buckets { size } => (generate_buckets(width, height, size).len(), "buckets"),
    };

    thread::scope(|scope| {
        let monitor = scope.spawn(|| {
            monitor_progress(&progress, &done, total, unit, config.progress_interval);
        });

        match config.schedule {
            Schedule::Rows => {
                let ranges = row_ranges(height, threads);
                let pixels: &mut [Color] = &mut frame.pixels;
                pool.scope(|s| {
                    let mut rest = pixels;
                    for rows in ranges {
                        let len = (rows.end - rows.start) as usize * width as usize;
                        let (block, tail) = std::mem::take(&mut rest).split_at_mut(len);
                        rest = tail;
                        let progress = &progress;
                        s.spawn(move |_| render_rows(camera, world, config, rows, block, progress));
                    }
                });
            }
            Schedule::Buckets { size } => {
                let buckets = generate_buckets(width, height, size);
                let results: Vec<BucketResult> = pool.install(|| {
                    buckets
                        .par_iter()
                        .map(|bucket| {
                            let result = render_bucket(bucket, camera, world, config);
                            progress.fetch_add(1, Ordering::Relaxed);
                            result
                        })
                        .collect()
                });
                for result in &results {
                    result.blit(&mut frame.pixels, width);
                }
            }
        }

        done.store(true, Ordering::Release);
        monitor.thread().unpark();
    });

    log::info!("Rendered {}x{} in {:.2?}", width, height, start.elapsed());
    Ok(frame)
}

/// Render `rows` into `block`, which holds exactly those rows.
fn render_rows(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    rows: Range<u32>,
    block: &mut [Color],
    progress: &AtomicUsize,
) {
    let width = camera.image_width as usize;
    for (y, row) in rows.zip(block.chunks_exact_mut(width)) {
        for (x, pixel) in row.iter_mut().enumerate() {
            let mut rng = pixel_rng(config.seed, y as usize * width + x);
            *pixel = render_pixel(camera, world, x as u32, y, config, &mut rng);
        }
        progress.fetch_add(1, Ordering::Relaxed);
    }
}

fn monitor_progress(progress: &AtomicUsize, done: &AtomicBool, total: usize, unit: &str, interval: Duration) {
    let start = Instant::now();
    loop {
        thread::park_timeout(interval);
        if done.load(Ordering::Acquire) {
            break;
        }
        let finished = progress.load(Ordering::Relaxed);
        let percent = 100.0 * finished as f64 / total.max(1) as f64;
        log::info!(
            "Progress: {}/{} {} ({:.1}%), {:.1}s elapsed",
            finished,
            total,
            unit,
            percent,
            start.elapsed().as_secs_f32()
        );
    }
}
