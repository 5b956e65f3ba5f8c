use super::Integrator;
use luma_core::{Sampler, Scene};
use luma_math::{Color, Ray};

/// Reports the surface albedo at the first hit, e.g. as a denoiser feature
/// channel.
#[derive(Default)]
pub struct AlbedoIntegrator;

impl Integrator for AlbedoIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray, rng: &mut dyn Sampler) -> Color {
        let its = scene.intersect(ray, rng);
        if its.is_hit() {
            its.albedo()
        } else {
            Color::ZERO
        }
    }
}
