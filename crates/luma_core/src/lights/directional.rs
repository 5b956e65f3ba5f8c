use super::{DirectLightSample, Light};
use crate::sampler::Sampler;
use luma_math::{Color, Vec3};

/// A light infinitely far away, illuminating from a fixed direction.
pub struct DirectionalLight {
    /// Direction towards the light.
    direction: Vec3,
    intensity: Color,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, intensity: Color) -> Self {
        Self {
            direction: direction.normalize(),
            intensity,
        }
    }
}

impl Light for DirectionalLight {
    fn sample_direct(&self, _origin: Vec3, _rng: &mut dyn Sampler) -> DirectLightSample {
        DirectLightSample {
            wi: self.direction,
            weight: self.intensity,
            distance: f32::INFINITY,
        }
    }
}
