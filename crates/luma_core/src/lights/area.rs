use super::{DirectLightSample, Light};
use crate::instance::Instance;
use crate::sampler::Sampler;
use crate::shape::Shape;
use luma_math::Vec3;
use std::sync::Arc;

/// An emissive instance used as a light source.
///
/// The light owns the instance; the instance holds a non-owning back-edge
/// (set during scene construction) so the integrators can tell that its
/// emission is already accounted for by ray hits when the instance is
/// visible.
pub struct AreaLight {
    instance: Arc<Instance>,
}

impl AreaLight {
    pub fn new(instance: Arc<Instance>) -> Self {
        Self { instance }
    }
}

impl Light for AreaLight {
    fn sample_direct(&self, origin: Vec3, rng: &mut dyn Sampler) -> DirectLightSample {
        let Some(emission) = self.instance.emission() else {
            return DirectLightSample::invalid();
        };

        let sample = self.instance.sample_area(rng);
        if sample.pdf == 0.0 {
            return DirectLightSample::invalid();
        }

        let towards = sample.position - origin;
        let distance_squared = towards.length_squared();
        if distance_squared == 0.0 {
            return DirectLightSample::invalid();
        }
        let distance = distance_squared.sqrt();
        let wi = towards / distance;

        // emission towards the receiver, in the light's local frame
        let wo_local = sample.frame.to_local(-wi);
        let emitted = emission.evaluate(sample.uv, wo_local).value;

        // convert the area density to solid angle: p_sa = pdf * d^2 / cos
        let cos_light = wo_local.z.abs();
        if cos_light == 0.0 {
            return DirectLightSample::invalid();
        }

        DirectLightSample {
            wi,
            weight: emitted * cos_light / (sample.pdf * distance_squared),
            distance,
        }
    }

    fn can_be_intersected(&self) -> bool {
        self.instance.visible()
    }
}
