use super::{BackgroundLight, DirectLightSample, Light};
use crate::sampler::Sampler;
use crate::texture::Texture;
use luma_math::{warp, Color, Transform, Vec2, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// An environment map: emission from an infinitely distant sphere, looked up
/// from a texture through an equirectangular parameterization.
pub struct EnvironmentMap {
    texture: Arc<dyn Texture>,
    /// Optional orientation of the map in the world.
    transform: Option<Transform>,
}

impl EnvironmentMap {
    pub fn new(texture: Arc<dyn Texture>, transform: Option<Transform>) -> Self {
        Self { texture, transform }
    }
}

impl Light for EnvironmentMap {
    fn sample_direct(&self, _origin: Vec3, rng: &mut dyn Sampler) -> DirectLightSample {
        // uniform sphere sampling; importance sampling the texture luminance
        // would reduce variance for maps with small bright regions
        let direction = warp::square_to_uniform_sphere(rng.next_2d());
        DirectLightSample {
            wi: direction,
            weight: self.evaluate(direction) / warp::uniform_sphere_pdf(),
            distance: f32::INFINITY,
        }
    }

    fn can_be_intersected(&self) -> bool {
        true
    }
}

impl BackgroundLight for EnvironmentMap {
    fn evaluate(&self, direction: Vec3) -> Color {
        let local = match &self.transform {
            Some(t) => t.inverse_vector(direction).normalize(),
            None => direction,
        };
        let local = Vec3::new(local.x, local.y, -local.z);

        let u = (local.z.atan2(local.x) + PI) / (2.0 * PI);
        let v = local.y.clamp(-1.0, 1.0).acos() / PI;
        self.texture.evaluate(Vec2::new(u, v))
    }
}
