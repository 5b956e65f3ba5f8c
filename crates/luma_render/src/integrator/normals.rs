use super::Integrator;
use luma_core::{Sampler, Scene};
use luma_math::{Color, Ray, Vec3};

/// Visualizes shading normals; the fastest way to check scene setup.
pub struct NormalsIntegrator {
    /// Remap normals from [-1,1]^3 to [0,1]^3 so no channel is negative.
    remap: bool,
}

impl NormalsIntegrator {
    pub fn new(remap: bool) -> Self {
        Self { remap }
    }
}

impl Default for NormalsIntegrator {
    fn default() -> Self {
        Self { remap: true }
    }
}

impl Integrator for NormalsIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray, rng: &mut dyn Sampler) -> Color {
        let its = scene.intersect(ray, rng);
        if !its.is_hit() {
            return scene.evaluate_background(ray.direction);
        }
        let normal = its.surface.frame.normal;
        if self.remap {
            (normal + Vec3::ONE) / 2.0
        } else {
            normal
        }
    }
}
