use super::{DirectLightSample, Light};
use crate::sampler::Sampler;
use luma_math::{Color, Vec3};
use std::f32::consts::PI;

/// An isotropic point emitter.
pub struct PointLight {
    position: Vec3,
    /// Radiant intensity, `power / (4 pi)`.
    intensity: Color,
}

impl PointLight {
    pub fn new(position: Vec3, power: Color) -> Self {
        Self {
            position,
            intensity: power / (4.0 * PI),
        }
    }
}

impl Light for PointLight {
    fn sample_direct(&self, origin: Vec3, _rng: &mut dyn Sampler) -> DirectLightSample {
        let towards = self.position - origin;
        let distance = towards.length();
        DirectLightSample {
            wi: towards / distance,
            // the sampling density is a delta, leaving the inverse-square
            // falloff
            weight: self.intensity / (distance * distance),
            distance,
        }
    }
}
