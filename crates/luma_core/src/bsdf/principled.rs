use super::fresnel::schlick;
use super::microfacet;
use super::{roughness_to_alpha, Bsdf, BsdfEval, BsdfSample};
use crate::sampler::Sampler;
use crate::texture::Texture;
use luma_math::{abs_cos_theta, cos_theta, reflect, warp, Color, Vec2, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// Artist-friendly material: a diffuse and a metallic (rough conductor) lobe
/// blended by base color, metallic and specular parameters through a Schlick
/// Fresnel term.
pub struct Principled {
    base_color: Arc<dyn Texture>,
    roughness: Arc<dyn Texture>,
    metallic: Arc<dyn Texture>,
    specular: Arc<dyn Texture>,
}

struct DiffuseLobe {
    color: Color,
}

impl DiffuseLobe {
    fn evaluate(&self, wo: Vec3, wi: Vec3) -> Color {
        if wo.z * wi.z <= 0.0 {
            return Color::ZERO;
        }
        self.color * abs_cos_theta(wi) / PI
    }

    fn sample(&self, wo: Vec3, rng: &mut dyn Sampler) -> BsdfSample {
        let mut wi = warp::square_to_cosine_hemisphere(rng.next_2d());
        if wi.z * wo.z < 0.0 {
            wi.z = -wi.z;
        }
        BsdfSample {
            wi,
            weight: self.color,
        }
    }
}

struct MetallicLobe {
    alpha: f32,
    color: Color,
}

impl MetallicLobe {
    fn evaluate(&self, wo: Vec3, wi: Vec3) -> Color {
        let wh = (wi.normalize() + wo.normalize()).normalize();
        0.25 * self.color
            * microfacet::evaluate_ggx(self.alpha, wh)
            * microfacet::smith_g1(self.alpha, wh, wi)
            * microfacet::smith_g1(self.alpha, wh, wo)
            / abs_cos_theta(wo)
    }

    fn sample(&self, wo: Vec3, rng: &mut dyn Sampler) -> BsdfSample {
        let wh = microfacet::sample_ggx_vndf(self.alpha, wo, rng.next_2d());
        let wi = reflect(wo, wh);
        BsdfSample {
            wi,
            weight: self.color * microfacet::smith_g1(self.alpha, wh, wi),
        }
    }
}

/// The two lobes for a given shading point, plus the one-sample selection
/// probability between them.
struct Combination {
    diffuse_selection_prob: f32,
    diffuse: DiffuseLobe,
    metallic: MetallicLobe,
}

impl Principled {
    pub fn new(
        base_color: Arc<dyn Texture>,
        roughness: Arc<dyn Texture>,
        metallic: Arc<dyn Texture>,
        specular: Arc<dyn Texture>,
    ) -> Self {
        Self {
            base_color,
            roughness,
            metallic,
            specular,
        }
    }

    fn combine(&self, uv: Vec2, wo: Vec3) -> Combination {
        let base_color = self.base_color.evaluate(uv);
        let alpha = roughness_to_alpha(self.roughness.scalar(uv));
        let specular = self.specular.scalar(uv);
        let metallic = self.metallic.scalar(uv);
        let f = specular * schlick((1.0 - metallic) * 0.08, cos_theta(wo));

        let diffuse = DiffuseLobe {
            color: (1.0 - f) * (1.0 - metallic) * base_color,
        };
        let metallic = MetallicLobe {
            alpha,
            color: f * Color::ONE + (1.0 - f) * metallic * base_color,
        };

        // select lobes proportionally to their mean albedo
        let mean = |c: Color| (c.x + c.y + c.z) / 3.0;
        let diffuse_albedo = mean(diffuse.color);
        let total_albedo = diffuse_albedo + mean(metallic.color);
        Combination {
            diffuse_selection_prob: if total_albedo > 0.0 {
                diffuse_albedo / total_albedo
            } else {
                1.0
            },
            diffuse,
            metallic,
        }
    }
}

impl Bsdf for Principled {
    fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval {
        let combination = self.combine(uv, wo);
        BsdfEval {
            value: combination.diffuse.evaluate(wo, wi) + combination.metallic.evaluate(wo, wi),
        }
    }

    fn sample(&self, uv: Vec2, wo: Vec3, rng: &mut dyn Sampler) -> BsdfSample {
        let combination = self.combine(uv, wo);
        let diffuse_prob = combination.diffuse_selection_prob;

        // one-sample estimator: pick a lobe, divide by its probability
        if rng.next() < diffuse_prob {
            let mut sample = combination.diffuse.sample(wo, rng);
            sample.weight /= diffuse_prob;
            sample
        } else {
            let mut sample = combination.metallic.sample(wo, rng);
            sample.weight /= 1.0 - diffuse_prob;
            sample
        }
    }

    fn albedo(&self, uv: Vec2) -> Color {
        self.base_color.evaluate(uv)
    }
}
