use super::microfacet;
use super::{roughness_to_alpha, Bsdf, BsdfEval, BsdfSample};
use crate::sampler::Sampler;
use crate::texture::Texture;
use luma_math::{abs_cos_theta, reflect, Color, Vec2, Vec3};
use std::sync::Arc;

/// Rough metallic reflection: GGX distribution with Smith masking, sampled
/// through the distribution of visible normals.
pub struct RoughConductor {
    reflectance: Arc<dyn Texture>,
    roughness: Arc<dyn Texture>,
}

impl RoughConductor {
    pub fn new(reflectance: Arc<dyn Texture>, roughness: Arc<dyn Texture>) -> Self {
        Self {
            reflectance,
            roughness,
        }
    }
}

impl Bsdf for RoughConductor {
    fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval {
        let alpha = roughness_to_alpha(self.roughness.scalar(uv));
        let wh = (wi.normalize() + wo.normalize()).normalize();

        // 0.25 * R * D(wh) * G1(wi) * G1(wo) / |cos(theta_o)|; the cosine of
        // wi is already folded into the microfacet change of density
        let value = 0.25
            * self.reflectance.evaluate(uv)
            * microfacet::evaluate_ggx(alpha, wh)
            * microfacet::smith_g1(alpha, wh, wi)
            * microfacet::smith_g1(alpha, wh, wo)
            / abs_cos_theta(wo);

        BsdfEval { value }
    }

    fn sample(&self, uv: Vec2, wo: Vec3, rng: &mut dyn Sampler) -> BsdfSample {
        let alpha = roughness_to_alpha(self.roughness.scalar(uv));
        let wh = microfacet::sample_ggx_vndf(alpha, wo, rng.next_2d());
        let wi = reflect(wo, wh);

        // VNDF sampling cancels D, G1(wo) and the cosine; the masking of the
        // incident direction remains
        BsdfSample {
            wi,
            weight: self.reflectance.evaluate(uv) * microfacet::smith_g1(alpha, wh, wi),
        }
    }

    fn albedo(&self, uv: Vec2) -> Color {
        self.reflectance.evaluate(uv)
    }
}
