use super::{sample_next_event, Integrator};
use luma_core::{Sampler, Scene};
use luma_math::{Color, Ray};

/// Bounded-depth path tracer with next-event estimation at every vertex.
pub struct PathTracer {
    /// Maximum number of path segments (2 = one bounce of indirect light).
    depth: u32,
}

impl PathTracer {
    pub fn new(depth: u32) -> Self {
        Self { depth }
    }
}

impl Default for PathTracer {
    fn default() -> Self {
        Self { depth: 2 }
    }
}

impl Integrator for PathTracer {
    fn li(&self, scene: &Scene, primary: &Ray, rng: &mut dyn Sampler) -> Color {
        let mut throughput = Color::ONE;
        let mut color = Color::ZERO;
        let mut ray = *primary;

        for bounce in 0.. {
            let its = scene.intersect(&ray, rng);
            if !its.is_hit() {
                return color + throughput * scene.evaluate_background(ray.direction);
            }

            color += throughput * its.evaluate_emission();

            let Some(instance) = its.instance else {
                return color;
            };
            if instance.bsdf().is_none() {
                return color;
            }
            if bounce + 1 >= self.depth {
                return color;
            }

            if scene.has_lights() {
                color += throughput * sample_next_event(scene, &its, ray.depth + 1, rng);
            }

            let bsdf_sample = its.sample_bsdf(rng);
            if bsdf_sample.is_invalid() {
                return color;
            }
            throughput *= bsdf_sample.weight;

            ray = Ray::with_depth(
                its.surface.position,
                bsdf_sample.wi.normalize(),
                ray.depth + 1,
            );
        }
        unreachable!()
    }
}
