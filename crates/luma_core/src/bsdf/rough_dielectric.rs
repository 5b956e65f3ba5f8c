use super::fresnel::fresnel_dielectric;
use super::microfacet;
use super::{roughness_to_alpha, Bsdf, BsdfEval, BsdfSample};
use crate::sampler::Sampler;
use crate::texture::Texture;
use luma_math::{cos_theta, reflect, refract, same_hemisphere, Color, Vec2, Vec3};
use std::sync::Arc;

/// A rough Fresnel interface: GGX half-vector sampling followed by a
/// Fresnel-weighted choice between reflection and refraction.
///
/// Like the smooth dielectric this is sampling-only.
pub struct RoughDielectric {
    ior: Arc<dyn Texture>,
    reflectance: Arc<dyn Texture>,
    transmittance: Arc<dyn Texture>,
    roughness: Arc<dyn Texture>,
}

impl RoughDielectric {
    pub fn new(
        ior: Arc<dyn Texture>,
        reflectance: Arc<dyn Texture>,
        transmittance: Arc<dyn Texture>,
        roughness: Arc<dyn Texture>,
    ) -> Self {
        Self {
            ior,
            reflectance,
            transmittance,
            roughness,
        }
    }
}

impl Bsdf for RoughDielectric {
    fn evaluate(&self, _uv: Vec2, _wo: Vec3, _wi: Vec3) -> BsdfEval {
        BsdfEval::invalid()
    }

    fn sample(&self, uv: Vec2, wo: Vec3, rng: &mut dyn Sampler) -> BsdfSample {
        let mut eta = self.ior.scalar(uv);
        let cos_theta_i = cos_theta(wo);
        let entering = cos_theta_i > 0.0;
        if !entering {
            eta = 1.0 / eta;
        }

        let alpha = roughness_to_alpha(self.roughness.scalar(uv));
        let f = fresnel_dielectric(cos_theta_i.abs(), eta);
        let choice = rng.next();
        let mut wh = microfacet::sample_ggx_vndf(alpha, wo, rng.next_2d());

        if choice <= f {
            let wi = reflect(wo, wh);
            if !same_hemisphere(wo, wi) {
                return BsdfSample::invalid();
            }
            BsdfSample {
                wi,
                weight: self.reflectance.evaluate(uv) * microfacet::smith_g1(alpha, wh, wi),
            }
        } else {
            if !entering {
                wh = -wh;
            }
            let wi = refract(wo, wh, eta);
            if wi == Vec3::ZERO || same_hemisphere(wo, wi) {
                return BsdfSample::invalid();
            }
            BsdfSample {
                wi,
                weight: self.transmittance.evaluate(uv)
                    * microfacet::smith_g1(alpha, wh, wi)
                    / (eta * eta),
            }
        }
    }

    fn albedo(&self, uv: Vec2) -> Color {
        self.reflectance.evaluate(uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{test_sampler, Sampler as _};
    use crate::texture::Constant;

    fn frosted() -> RoughDielectric {
        RoughDielectric::new(
            Arc::new(Constant::new(Color::splat(1.5))),
            Arc::new(Constant::new(Color::ONE)),
            Arc::new(Constant::new(Color::ONE)),
            Arc::new(Constant::new(Color::splat(0.3))),
        )
    }

    #[test]
    fn test_valid_samples_have_finite_nonnegative_weight() {
        let bsdf = frosted();
        let mut rng = test_sampler();
        rng.seed_sample(21);
        let wo = Vec3::new(0.3, 0.2, 0.93).normalize();
        let mut valid = 0;
        for _ in 0..512 {
            let sample = bsdf.sample(Vec2::ZERO, wo, &mut rng);
            if sample.is_invalid() {
                continue;
            }
            valid += 1;
            assert!(sample.weight.is_finite());
            assert!(sample.weight.cmpge(Color::ZERO).all());
        }
        assert!(valid > 400, "too many failed samples: {valid}/512");
    }

    #[test]
    fn test_produces_both_lobes() {
        let bsdf = frosted();
        let mut rng = test_sampler();
        rng.seed_sample(22);
        let wo = Vec3::new(0.6, 0.0, 0.8).normalize();
        let mut above = 0;
        let mut below = 0;
        for _ in 0..512 {
            let sample = bsdf.sample(Vec2::ZERO, wo, &mut rng);
            if sample.is_invalid() {
                continue;
            }
            if sample.wi.z > 0.0 {
                above += 1;
            } else {
                below += 1;
            }
        }
        assert!(above > 0, "no reflected samples");
        assert!(below > 0, "no refracted samples");
    }
}
