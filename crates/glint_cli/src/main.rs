//! Glint batch renderer: render a scene preset to a PNG.

mod args;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glint_renderer::{render_scanlines, RenderControl, RenderOutcome, ScanlineBuffer};
use rand::rngs::StdRng;
use rand::SeedableRng;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let Some(options) = args::parse(std::env::args().skip(1))? else {
        println!("{}", args::USAGE);
        return Ok(());
    };

    log::info!(
        "Starting Glint: preset {}, {}x{}",
        options.preset,
        options.width,
        options.height
    );

    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(options.config.seed);
    let scene = options
        .preset
        .build(options.width, options.height, &mut rng)
        .with_context(|| format!("Failed to build preset {}", options.preset))?;
    log::info!(
        "Scene built in {:.2?} ({} top-level objects)",
        start.elapsed(),
        scene.objects().len()
    );

    let buffer = ScanlineBuffer::for_camera(scene.camera());
    let control = RenderControl::new();
    let finished = AtomicBool::new(false);

    let outcome = std::thread::scope(|s| {
        s.spawn(|| report_progress(&control, &finished, buffer.height()));
        let outcome = render_scanlines(&scene, &options.config, &buffer, &control);
        finished.store(true, Ordering::Relaxed);
        outcome
    })?;

    if outcome == RenderOutcome::Cancelled {
        log::warn!("Render was cancelled; writing partial image");
    }

    if let Some(parent) = options.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let image = image::RgbImage::from_raw(buffer.width(), buffer.height(), buffer.to_rgb8())
        .context("Render buffer does not match image size")?;
    image
        .save(&options.output)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    log::info!(
        "Wrote {} in {:.2?}",
        options.output.display(),
        start.elapsed()
    );
    Ok(())
}

/// Log the finished row count until the render stops.
fn report_progress(control: &RenderControl, finished: &AtomicBool, height: u32) {
    let mut last = Instant::now();
    while !finished.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(50));
        if last.elapsed() >= PROGRESS_INTERVAL {
            let done = control.rows_done();
            log::info!(
                "{}/{} rows ({:.0}%)",
                done,
                height,
                100.0 * done as f64 / height.max(1) as f64
            );
            last = Instant::now();
        }
    }
}
