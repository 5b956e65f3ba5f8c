//! Light emission from surfaces.

use crate::texture::Texture;
use luma_math::{cos_theta, Color, Vec2, Vec3};
use std::sync::Arc;

/// The result of evaluating an emission distribution.
#[derive(Debug, Copy, Clone)]
pub struct EmissionEval {
    /// Emitted radiance, not including any cosine term.
    pub value: Color,
}

impl EmissionEval {
    pub fn invalid() -> Self {
        Self { value: Color::ZERO }
    }
}

/// The directional distribution of light leaving an emissive surface.
///
/// Evaluated in the local shading frame (normal is `(0, 0, 1)`); `wo` is the
/// direction the light leaves in, pointing away from the surface.
pub trait Emission: Send + Sync {
    fn evaluate(&self, uv: Vec2, wo: Vec3) -> EmissionEval;
}

/// Uniform (lambertian) emission over the upper hemisphere.
pub struct Lambertian {
    emission: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(emission: Arc<dyn Texture>) -> Self {
        Self { emission }
    }
}

impl Emission for Lambertian {
    fn evaluate(&self, uv: Vec2, wo: Vec3) -> EmissionEval {
        // the back side does not emit
        if cos_theta(wo) <= 0.0 {
            return EmissionEval::invalid();
        }
        EmissionEval {
            value: self.emission.evaluate(uv),
        }
    }
}
