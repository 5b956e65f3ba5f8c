use super::{Bsdf, BsdfEval, BsdfSample};
use crate::sampler::Sampler;
use crate::texture::Texture;
use luma_math::{abs_cos_theta, warp, Color, Vec2, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// Lambertian diffuse reflection, `f = albedo / pi`.
pub struct Diffuse {
    albedo: Arc<dyn Texture>,
}

impl Diffuse {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Bsdf for Diffuse {
    fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval {
        if wo.z * wi.z <= 0.0 {
            return BsdfEval::invalid();
        }
        BsdfEval {
            value: self.albedo.evaluate(uv) * abs_cos_theta(wi) / PI,
        }
    }

    fn sample(&self, uv: Vec2, wo: Vec3, rng: &mut dyn Sampler) -> BsdfSample {
        let mut wi = warp::square_to_cosine_hemisphere(rng.next_2d());
        // scatter into the hemisphere the outgoing direction lives in
        if wi.z * wo.z < 0.0 {
            wi.z = -wi.z;
        }
        BsdfSample {
            wi,
            // cos(theta) / pdf cancels against the cosine-weighted warp, so
            // only the albedo remains
            weight: self.albedo.evaluate(uv),
        }
    }

    fn albedo(&self, uv: Vec2) -> Color {
        self.albedo.evaluate(uv)
    }
}
