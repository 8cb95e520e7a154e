//! Multithreaded scanline rendering.
//!
//! A fixed number of workers run on the rayon pool. Each owns a seeded
//! `StdRng` and a private row buffer, and copies finished rows into a
//! shared `ScanlineBuffer` whose rows are locked individually.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::renderer::{color_to_rgb8, render_pixel, RenderConfig};
use crate::{Camera, Color, Scene, SceneError};

/// Output image shared between workers, one lock per row.
#[derive(Debug)]
pub struct ScanlineBuffer {
    width: u32,
    height: u32,
    rows: Vec<Mutex<Vec<Color>>>,
}

impl ScanlineBuffer {
    /// Create a new buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        let rows = (0..height)
            .map(|_| Mutex::new(vec![Color::ZERO; width as usize]))
            .collect();
        Self {
            width,
            height,
            rows,
        }
    }

    /// Buffer matching the camera's image size.
    pub fn for_camera(camera: &Camera) -> Self {
        Self::new(camera.width(), camera.height())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn lock_row(&self, y: u32) -> MutexGuard<'_, Vec<Color>> {
        // A panicked writer leaves at worst a stale row
        self.rows[y as usize]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy a finished row into the buffer.
    pub fn write_row(&self, y: u32, pixels: &[Color]) {
        let mut row = self.lock_row(y);
        let n = row.len().min(pixels.len());
        row[..n].copy_from_slice(&pixels[..n]);
    }

    /// Snapshot of one row.
    pub fn row(&self, y: u32) -> Vec<Color> {
        self.lock_row(y).clone()
    }

    /// Get the pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.lock_row(y)[x as usize]
    }

    /// Gamma-encoded RGB bytes, top row first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for y in 0..self.height {
            for color in self.lock_row(y).iter() {
                bytes.extend_from_slice(&color_to_rgb8(*color));
            }
        }
        bytes
    }
}

/// Cancellation flag and progress counter shared with the workers.
#[derive(Debug, Default)]
pub struct RenderControl {
    cancelled: AtomicBool,
    rows_done: AtomicUsize,
}

impl RenderControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every worker to stop at the next pixel.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Rows written to the buffer so far.
    pub fn rows_done(&self) -> usize {
        self.rows_done.load(Ordering::Relaxed)
    }

    /// Clear the flag and counter before starting another pass.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
        self.rows_done.store(0, Ordering::Relaxed);
    }
}

/// How a render pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Completed,
    Cancelled,
}

/// Rows owned by `worker`, in the order it renders them.
///
/// Worker `w` owns every row `y` with `y % workers == w`. With interlacing,
/// odd workers walk their rows bottom-up so the image fills in from both
/// edges at once.
pub fn worker_rows(worker: usize, workers: usize, height: u32, interlace: bool) -> Vec<u32> {
    let workers = workers.max(1);
    let mut rows: Vec<u32> = (worker as u32..height).step_by(workers).collect();
    if interlace && worker % 2 == 1 {
        rows.reverse();
    }
    rows
}

/// Render `scene` into `buffer` with `config.workers` workers.
///
/// Blocks until every worker finishes or notices cancellation. A cancelled
/// worker drops the row it was working on.
pub fn render_scanlines(
    scene: &Scene,
    config: &RenderConfig,
    buffer: &ScanlineBuffer,
    control: &RenderControl,
) -> Result<RenderOutcome, SceneError> {
    let camera = scene.camera();
    if buffer.width() != camera.width() || buffer.height() != camera.height() {
        return Err(SceneError::BufferSize {
            width: camera.width(),
            height: camera.height(),
            actual_width: buffer.width(),
            actual_height: buffer.height(),
        });
    }

    let workers = config.workers.max(1);
    let start = Instant::now();
    log::info!(
        "Rendering {}x{} at {} spp, depth {}, {} workers",
        camera.width(),
        camera.height(),
        config.samples_per_pixel,
        config.max_depth,
        workers
    );

    (0..workers).into_par_iter().for_each(|worker| {
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(worker as u64));
        let mut scanline = vec![Color::ZERO; camera.width() as usize];

        for y in worker_rows(worker, workers, camera.height(), config.interlace) {
            for (x, pixel) in scanline.iter_mut().enumerate() {
                if control.is_cancelled() {
                    return;
                }
                *pixel = render_pixel(
                    scene,
                    camera,
                    x as u32,
                    y,
                    config.samples_per_pixel,
                    config.max_depth,
                    &mut rng,
                );
            }
            buffer.write_row(y, &scanline);
            control.rows_done.fetch_add(1, Ordering::Relaxed);
        }
    });

    if control.is_cancelled() {
        log::info!(
            "Render cancelled after {} of {} rows",
            control.rows_done(),
            camera.height()
        );
        return Ok(RenderOutcome::Cancelled);
    }

    log::info!("Render complete in {:.2?}", start.elapsed());
    Ok(RenderOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraSettings, DiffuseLight, Sphere};
    use glint_math::DVec3;
    use std::sync::Arc;

    /// Camera inside a glowing sphere: every sample sees the same emission.
    fn glowing_room(width: u32, height: u32) -> Scene {
        let mut scene = Scene::new(Camera::new(CameraSettings::default(), width, height));
        scene.add(Sphere::new(
            DVec3::ZERO,
            10.0,
            Arc::new(DiffuseLight::new(Color::new(0.25, 0.5, 1.0)).into()),
        ));
        scene
    }

    fn config(workers: usize, interlace: bool) -> RenderConfig {
        RenderConfig {
            samples_per_pixel: 2,
            max_depth: 4,
            workers,
            interlace,
            seed: 7,
        }
    }

    #[test]
    fn test_worker_rows_partition_image() {
        for workers in 1..6 {
            for height in [0u32, 1, 7, 20] {
                for interlace in [false, true] {
                    let mut seen = vec![0; height as usize];
                    for worker in 0..workers {
                        for y in worker_rows(worker, workers, height, interlace) {
                            seen[y as usize] += 1;
                        }
                    }
                    assert!(seen.iter().all(|&n| n == 1), "workers {} height {}", workers, height);
                }
            }
        }
    }

    #[test]
    fn test_interlaced_odd_workers_start_at_bottom() {
        assert_eq!(worker_rows(0, 2, 6, true), vec![0, 2, 4]);
        assert_eq!(worker_rows(1, 2, 6, true), vec![5, 3, 1]);
        assert_eq!(worker_rows(1, 2, 6, false), vec![1, 3, 5]);
    }

    #[test]
    fn test_render_fills_every_row() {
        let scene = glowing_room(8, 5);
        let buffer = ScanlineBuffer::for_camera(scene.camera());
        let control = RenderControl::new();

        let outcome = render_scanlines(&scene, &config(3, true), &buffer, &control).unwrap();

        assert_eq!(outcome, RenderOutcome::Completed);
        assert_eq!(control.rows_done(), 5);
        for y in 0..5 {
            assert!(buffer.row(y).iter().all(|&c| c == Color::new(0.25, 0.5, 1.0)));
        }
    }

    #[test]
    fn test_interlacing_does_not_change_output() {
        let scene = glowing_room(6, 7);

        let a = ScanlineBuffer::for_camera(scene.camera());
        render_scanlines(&scene, &config(4, true), &a, &RenderControl::new()).unwrap();
        let b = ScanlineBuffer::for_camera(scene.camera());
        render_scanlines(&scene, &config(1, false), &b, &RenderControl::new()).unwrap();

        assert_eq!(a.to_rgb8(), b.to_rgb8());
    }

    #[test]
    fn test_cancelled_render_writes_nothing() {
        let scene = glowing_room(4, 4);
        let buffer = ScanlineBuffer::for_camera(scene.camera());
        let control = RenderControl::new();
        control.cancel();

        let outcome = render_scanlines(&scene, &config(2, true), &buffer, &control).unwrap();

        assert_eq!(outcome, RenderOutcome::Cancelled);
        assert_eq!(control.rows_done(), 0);
        assert!(buffer.to_rgb8().iter().all(|&b| b == 0));

        control.reset();
        assert!(!control.is_cancelled());
    }

    #[test]
    fn test_buffer_size_mismatch_is_error() {
        let scene = glowing_room(4, 4);
        let buffer = ScanlineBuffer::new(5, 4);
        let result = render_scanlines(&scene, &config(1, false), &buffer, &RenderControl::new());

        assert!(matches!(result, Err(SceneError::BufferSize { actual_width: 5, .. })));
    }

    #[test]
    fn test_scanline_buffer_rows() {
        let buffer = ScanlineBuffer::new(3, 2);
        buffer.write_row(1, &[Color::ONE, Color::splat(0.25), Color::ZERO]);

        assert_eq!(buffer.pixel(1, 1), Color::splat(0.25));
        assert_eq!(buffer.row(0), vec![Color::ZERO; 3]);
        assert_eq!(
            buffer.to_rgb8(),
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 255, 255, 255, 128, 128, 128, 0, 0, 0]
        );
    }
}
