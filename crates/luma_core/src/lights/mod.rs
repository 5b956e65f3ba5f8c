//! Light sources that can be sampled for direct illumination.

mod area;
mod directional;
mod envmap;
mod point;

pub use area::AreaLight;
pub use directional::DirectionalLight;
pub use envmap::EnvironmentMap;
pub use point::PointLight;

use crate::sampler::Sampler;
use luma_math::{Color, Vec3};

/// The result of sampling a light from a query point.
#[derive(Debug, Copy, Clone)]
pub struct DirectLightSample {
    /// Direction from the query point towards the light.
    pub wi: Vec3,
    /// The weight of the sample: `Le(-wi) / p(wi)`.
    pub weight: Color,
    /// How far the shadow ray must reach (infinite for directional and
    /// environment lights).
    pub distance: f32,
}

impl DirectLightSample {
    /// Denotes that sampling has failed.
    pub fn invalid() -> Self {
        Self {
            wi: Vec3::ZERO,
            weight: Color::ZERO,
            distance: 0.0,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.weight == Color::ZERO
    }
}

/// A light source that can be connected to by sampling.
///
/// Lights that can also be found by intersecting scene geometry (area lights
/// on visible instances, the background) report `can_be_intersected`; those
/// are skipped by next-event estimation since ray hits already account for
/// their radiance.
pub trait Light: Send + Sync {
    /// Samples a direction towards the light with its weighted emission.
    fn sample_direct(&self, origin: Vec3, rng: &mut dyn Sampler) -> DirectLightSample;

    /// Whether rays can hit this light through scene intersection.
    fn can_be_intersected(&self) -> bool {
        false
    }
}

/// A light providing emission when rays leave the scene.
///
/// Conceptually an emissive sphere of infinite radius; the query direction
/// alone determines the radiance.
pub trait BackgroundLight: Light {
    fn evaluate(&self, direction: Vec3) -> Color;
}
