//! The integrator family: all share the parallel sample loop and differ only
//! in how much light they attribute to a single camera ray.

mod albedo;
mod bvh_perf;
mod direct;
mod normals;
mod path;

pub use albedo::AlbedoIntegrator;
pub use bvh_perf::BvhPerformance;
pub use direct::DirectIntegrator;
pub use normals::NormalsIntegrator;
pub use path::PathTracer;

use luma_core::{Intersection, Sampler, Scene};
use luma_math::{Color, Ray};

/// Estimates the radiance arriving along a camera ray.
pub trait Integrator: Send + Sync {
    fn li(&self, scene: &Scene, ray: &Ray, rng: &mut dyn Sampler) -> Color;
}

/// One next-event estimate at a surface point.
///
/// Picks one light, casts a shadow ray, and weights the BSDF throughput by
/// the inverse selection probability. Lights that rays can find on their own
/// (area lights on visible geometry, the background) are skipped here, since
/// adding them twice would double-count their emission.
pub(crate) fn sample_next_event(
    scene: &Scene,
    its: &Intersection<'_>,
    depth: u32,
    rng: &mut dyn Sampler,
) -> Color {
    let Some(light_sample) = scene.sample_light(rng) else {
        return Color::ZERO;
    };
    if light_sample.light.can_be_intersected() {
        return Color::ZERO;
    }

    let direct = light_sample.light.sample_direct(its.surface.position, rng);
    if direct.is_invalid() {
        return Color::ZERO;
    }

    let shadow_ray = Ray::with_depth(its.surface.position, direct.wi, depth);
    if scene.intersect_any(&shadow_ray, direct.distance, rng) {
        return Color::ZERO;
    }

    direct.weight * its.evaluate_bsdf(direct.wi).value / light_sample.probability
}
