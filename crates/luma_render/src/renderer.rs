//! The parallel sample loop shared by all integrators.
//!
//! A fixed pool of workers pulls tiles from a mutex-protected queue ordered
//! center-out. Each worker owns a cloned sampler, renders its tile into a
//! local buffer, then publishes the pixels to the shared film and the
//! preview in one short critical section per tile. Pixel values depend only
//! on the (pixel, sample index) seeding, so images are deterministic no
//! matter how tiles are interleaved across threads.

use crate::film::Film;
use crate::integrator::Integrator;
use crate::preview::Preview;
use crate::tile::{generate_tiles, Tile, DEFAULT_TILE_SIZE};
use indicatif::{ProgressBar, ProgressStyle};
use luma_core::{Sampler, Scene};
use luma_math::Color;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub tile_size: u32,
    /// Worker count; defaults to the hardware parallelism.
    pub threads: Option<usize>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            threads: None,
        }
    }
}

/// The tile queue. One mutex around a cursor into the precomputed spiral
/// ordering; workers hold it just long enough to grab the next index.
struct TileQueue {
    tiles: Vec<Tile>,
    next: Mutex<usize>,
}

impl TileQueue {
    fn pop(&self) -> Option<Tile> {
        let mut next = self.next.lock().unwrap();
        let tile = self.tiles.get(*next).copied();
        *next += 1;
        tile
    }
}

/// Renders the scene and returns the finished film.
pub fn render(
    scene: &Scene,
    integrator: &dyn Integrator,
    sampler: &dyn Sampler,
    settings: RenderSettings,
    preview: Option<&Arc<Preview>>,
) -> Film {
    let resolution = scene.camera().resolution();
    let film = Arc::new(Mutex::new(Film::new(resolution)));

    let queue = TileQueue {
        tiles: generate_tiles(resolution, settings.tile_size),
        next: Mutex::new(0),
    };

    let worker_count = settings.threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    // per-worker samplers are cloned up front; each clone owns its state
    let samplers: Vec<Box<dyn Sampler>> = (0..worker_count)
        .map(|_| sampler.clone_sampler())
        .collect();

    let progress = ProgressBar::new(queue.tiles.len() as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} tiles ({elapsed})")
            .expect("static template is valid"),
    );

    let updater = preview
        .map(|p| p.start_regular_updates(film.clone(), Duration::from_millis(500)));

    log::info!(
        "rendering {}x{} with {} workers, {} samples/pixel",
        resolution.x,
        resolution.y,
        worker_count,
        sampler.samples_per_pixel()
    );

    std::thread::scope(|scope| {
        for mut worker_sampler in samplers {
            let queue = &queue;
            let film = &film;
            let progress = &progress;
            scope.spawn(move || {
                let mut buffer = Vec::new();
                while let Some(tile) = queue.pop() {
                    render_tile(scene, integrator, worker_sampler.as_mut(), &tile, &mut buffer);

                    {
                        let mut film = film.lock().unwrap();
                        for (pixel, color) in tile.pixels().zip(&buffer) {
                            film.set(pixel, *color);
                        }
                    }
                    if let Some(preview) = preview {
                        preview.update_block(&tile, &buffer);
                    }
                    progress.inc(1);
                }
            });
        }
    });

    progress.finish_and_clear();
    drop(updater);

    Arc::try_unwrap(film)
        .unwrap_or_else(|_| unreachable!("all film users have exited"))
        .into_inner()
        .unwrap()
}

/// Renders one tile into a local buffer.
fn render_tile(
    scene: &Scene,
    integrator: &dyn Integrator,
    sampler: &mut dyn Sampler,
    tile: &Tile,
    buffer: &mut Vec<Color>,
) {
    let camera = scene.camera();
    let spp = sampler.samples_per_pixel().max(1);
    let norm = 1.0 / spp as f32;

    buffer.clear();
    buffer.reserve(tile.pixel_count() as usize);
    for pixel in tile.pixels() {
        let mut sum = Color::ZERO;
        for sample_index in 0..spp {
            sampler.seed_pixel(pixel, sample_index as u64);
            let camera_sample = camera.sample(pixel, sampler);
            sum += camera_sample.weight * integrator.li(scene, &camera_sample.ray, sampler);
        }
        buffer.push(sum * norm);
    }
}

/// Renders with default settings and no preview; the common library entry.
pub fn render_simple(scene: &Scene, integrator: &dyn Integrator, sampler: &dyn Sampler) -> Film {
    render(scene, integrator, sampler, RenderSettings::default(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::NormalsIntegrator;
    use luma_core::camera::{FovAxis, Perspective};
    use luma_core::sampler::Independent;
    use luma_core::shapes::Sphere;
    use luma_core::Instance;
    use luma_math::{Transform, UVec2, Vec3};

    fn sphere_scene(resolution: UVec2) -> Scene {
        let mut transform = Transform::identity();
        transform
            .lookat(Vec3::new(0.0, 0.0, -3.0), Vec3::ZERO, Vec3::Y)
            .unwrap();
        Scene::new(
            Arc::new(Perspective::new(resolution, transform, 45.0, FovAxis::X)),
            vec![Arc::new(Instance::new(
                Arc::new(Sphere),
                None,
                None,
                None,
                None,
            ))],
            None,
            vec![],
        )
    }

    #[test]
    fn test_two_runs_are_bit_identical() {
        let scene = sphere_scene(UVec2::new(32, 32));
        let integrator = NormalsIntegrator::default();
        let sampler = Independent::new(4, 1337);

        let first = render_simple(&scene, &integrator, &sampler);
        let second = render_simple(&scene, &integrator, &sampler);

        for y in 0..32 {
            for x in 0..32 {
                let pixel = UVec2::new(x, y);
                assert_eq!(
                    first.get(pixel),
                    second.get(pixel),
                    "pixel {pixel} differs between identical runs"
                );
            }
        }
    }

    #[test]
    fn test_single_thread_matches_parallel() {
        let scene = sphere_scene(UVec2::new(48, 48));
        let integrator = NormalsIntegrator::default();
        let sampler = Independent::new(2, 7);

        let serial = render(
            &scene,
            &integrator,
            &sampler,
            RenderSettings {
                tile_size: 16,
                threads: Some(1),
            },
            None,
        );
        let parallel = render(
            &scene,
            &integrator,
            &sampler,
            RenderSettings {
                tile_size: 16,
                threads: Some(8),
            },
            None,
        );

        for y in 0..48 {
            for x in 0..48 {
                let pixel = UVec2::new(x, y);
                assert_eq!(serial.get(pixel), parallel.get(pixel));
            }
        }
    }
}
