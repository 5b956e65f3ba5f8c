//! Command-line entry point: `luma <scene.json>`.

mod scene_file;

use luma_render::{render, Preview, RenderSettings};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(scene_path) = std::env::args().nth(1) else {
        log::error!("usage: luma <scene file>");
        return ExitCode::FAILURE;
    };

    match run(Path::new(&scene_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // print the full cause chain, one level per line
            log::error!("{error}");
            for (level, cause) in error.chain().skip(1).enumerate() {
                log::error!("{:indent$}{cause}", "", indent = 2 * (level + 1));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(scene_path: &Path) -> anyhow::Result<()> {
    let job = scene_file::load(scene_path)?;

    let preview = Arc::new(Preview::connect(
        &job.name,
        job.scene.camera().resolution(),
    ));

    let film = render(
        &job.scene,
        job.integrator.as_ref(),
        job.sampler.as_ref(),
        RenderSettings::default(),
        Some(&preview),
    );

    if let Some(parent) = job.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    film.save_exr(&job.output)?;
    log::info!("wrote {}", job.output.display());
    Ok(())
}
