use super::fresnel::fresnel_dielectric;
use super::{Bsdf, BsdfEval, BsdfSample};
use crate::sampler::Sampler;
use crate::texture::Texture;
use luma_math::{cos_theta, reflect, refract, Color, Vec2, Vec3};
use std::sync::Arc;

/// A perfectly smooth Fresnel interface between two dielectrics.
///
/// Sampling-only: the probability of a light sample picking exactly the
/// reflected or refracted direction is zero, so `evaluate` always reports
/// black.
pub struct Dielectric {
    ior: Arc<dyn Texture>,
    reflectance: Arc<dyn Texture>,
    transmittance: Arc<dyn Texture>,
}

impl Dielectric {
    pub fn new(
        ior: Arc<dyn Texture>,
        reflectance: Arc<dyn Texture>,
        transmittance: Arc<dyn Texture>,
    ) -> Self {
        Self {
            ior,
            reflectance,
            transmittance,
        }
    }
}

impl Bsdf for Dielectric {
    fn evaluate(&self, _uv: Vec2, _wo: Vec3, _wi: Vec3) -> BsdfEval {
        BsdfEval::invalid()
    }

    fn sample(&self, uv: Vec2, wo: Vec3, rng: &mut dyn Sampler) -> BsdfSample {
        let mut normal = Vec3::Z;
        let mut eta = self.ior.scalar(uv);
        let cos_theta_i = cos_theta(wo);

        // leaving the medium: flip the interface
        if cos_theta_i <= 0.0 {
            eta = 1.0 / eta;
            normal = -normal;
        }

        let f = fresnel_dielectric(cos_theta_i.abs(), eta);
        if rng.next() <= f {
            BsdfSample {
                wi: reflect(wo, normal).normalize(),
                weight: self.reflectance.evaluate(uv),
            }
        } else {
            let wi = refract(wo, normal, eta);
            if wi == Vec3::ZERO {
                // total internal reflection is fully covered by the Fresnel
                // branch; reaching this means numerical trouble
                return BsdfSample::invalid();
            }
            BsdfSample {
                wi: wi.normalize(),
                // radiance is compressed by the squared relative IOR when
                // crossing the interface
                weight: self.transmittance.evaluate(uv) / (eta * eta),
            }
        }
    }

    fn albedo(&self, uv: Vec2) -> Color {
        self.reflectance.evaluate(uv)
    }
}
