use super::{sample_next_event, Integrator};
use luma_core::{Sampler, Scene};
use luma_math::{Color, Ray};

/// Single-bounce integrator: emission at the first hit, one next-event
/// estimate, and one BSDF bounce that picks up emission or background.
#[derive(Default)]
pub struct DirectIntegrator;

impl Integrator for DirectIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray, rng: &mut dyn Sampler) -> Color {
        let its = scene.intersect(ray, rng);
        if !its.is_hit() {
            return scene.evaluate_background(ray.direction);
        }

        let mut color = its.evaluate_emission();

        let Some(instance) = its.instance else {
            return color;
        };
        if instance.bsdf().is_none() {
            return color;
        }

        if scene.has_lights() {
            color += sample_next_event(scene, &its, 1, rng);
        }

        let bsdf_sample = its.sample_bsdf(rng);
        if bsdf_sample.is_invalid() {
            return color;
        }

        let secondary = Ray::with_depth(its.surface.position, bsdf_sample.wi.normalize(), 1);
        let second_hit = scene.intersect(&secondary, rng);
        if second_hit.is_hit() {
            // emission of intersectable lights is collected here, which is
            // why next-event estimation skips them
            color + bsdf_sample.weight * second_hit.evaluate_emission()
        } else {
            color + bsdf_sample.weight * scene.evaluate_background(secondary.direction)
        }
    }
}
