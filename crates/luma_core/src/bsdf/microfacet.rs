//! GGX microfacet distribution helpers.

use luma_math::{abs_cos_theta, cos_theta, safe_sqrt, tan_theta2, Vec2, Vec3};
use std::f32::consts::PI;

/// Smith shadowing/masking term for the GGX distribution.
///
/// `wh` is the sampled half-vector, `w` either `wo` or `wi`.
pub fn smith_g1(alpha: f32, wh: Vec3, w: Vec3) -> f32 {
    // reject configurations where w and wh disagree about the hemisphere
    if w.dot(wh) * cos_theta(w) * cos_theta(wh) <= 0.0 {
        return 0.0;
    }

    if abs_cos_theta(w) >= 1.0 {
        return 1.0;
    }

    let a2_tan_theta2 = alpha * alpha * tan_theta2(w);
    2.0 / (1.0 + (1.0 + a2_tan_theta2).sqrt())
}

/// The GGX normal distribution function.
///
/// See "Microfacet Models for Refraction through Rough Surfaces"
/// [Walter et al. 2007].
pub fn evaluate_ggx(alpha: f32, wh: Vec3) -> f32 {
    let n_dot_h = cos_theta(wh);
    let a = wh.x / alpha;
    let b = wh.y / alpha;
    let c = a * a + b * b + n_dot_h * n_dot_h;
    1.0 / (PI * (alpha * c) * (alpha * c))
}

/// Samples the distribution of visible normals (VNDF) of the GGX
/// distribution with Smith shadowing [Heitz 2018].
///
/// Sampling visible normals avoids wasting samples on microfacets that are
/// back-facing for the given outgoing direction.
pub fn sample_ggx_vndf(alpha: f32, wo: Vec3, rnd: Vec2) -> Vec3 {
    // flip the configuration for directions below the surface (transmission)
    let sgn = 1.0_f32.copysign(cos_theta(wo));

    // transform the view direction to the hemisphere configuration
    let vh = (sgn * Vec3::new(alpha * wo.x, alpha * wo.y, wo.z)).normalize();

    // orthonormal basis around vh, with a fallback when it is vertical
    let len_sq = vh.x * vh.x + vh.y * vh.y;
    let t1 = if len_sq > 0.0 {
        Vec3::new(-vh.y, vh.x, 0.0) / len_sq.sqrt()
    } else {
        Vec3::X
    };
    let t2 = vh.cross(t1);

    // parameterize the projected area
    let r = rnd.x.sqrt();
    let phi = 2.0 * PI * rnd.y;
    let p1 = r * phi.cos();
    let mut p2 = r * phi.sin();
    let s = 0.5 * (1.0 + vh.z);
    p2 = (1.0 - s) * safe_sqrt(1.0 - p1 * p1) + s * p2;

    // reproject onto the hemisphere
    let nh = p1 * t1 + p2 * t2 + safe_sqrt(1.0 - p1 * p1 - p2 * p2) * vh;

    // transform back to the ellipsoid configuration
    sgn * Vec3::new(alpha * nh.x, alpha * nh.y, nh.z.max(0.0)).normalize()
}
