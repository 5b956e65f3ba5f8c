use super::Integrator;
use luma_core::{Sampler, Scene};
use luma_math::{Color, Ray};

/// Visualizes acceleration-structure cost: red is BVH nodes visited, green
/// is primitives tested, both divided by `unit`.
pub struct BvhPerformance {
    unit: f32,
}

impl BvhPerformance {
    pub fn new(unit: f32) -> Self {
        Self { unit }
    }
}

impl Default for BvhPerformance {
    fn default() -> Self {
        Self { unit: 1.0 }
    }
}

impl Integrator for BvhPerformance {
    fn li(&self, scene: &Scene, ray: &Ray, rng: &mut dyn Sampler) -> Color {
        let its = scene.intersect(ray, rng);
        Color::new(
            its.stats.bvh_nodes as f32 / self.unit,
            its.stats.prim_tests as f32 / self.unit,
            0.0,
        )
    }
}
