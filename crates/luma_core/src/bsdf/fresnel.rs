//! Fresnel reflectance helpers.

/// The weight term of the Schlick approximation, `(1 - cos)^5`.
#[inline]
pub fn schlick_weight(cos_theta: f32) -> f32 {
    let m = (1.0 - cos_theta).clamp(0.0, 1.0);
    (m * m) * (m * m) * m
}

/// The Schlick approximation of the Fresnel term.
///
/// See "An Inexpensive BRDF Model for Physically-based Rendering"
/// [Schlick 1994].
#[inline]
pub fn schlick(f0: f32, cos_theta: f32) -> f32 {
    f0 + (1.0 - f0) * schlick_weight(cos_theta)
}

/// Unpolarized Fresnel term for dielectric interfaces.
///
/// `eta` is the relative IOR (n2 / n1). Returns 1 on total internal
/// reflection.
pub fn fresnel_dielectric(cos_theta_i: f32, eta: f32) -> f32 {
    let inv_eta = 1.0 / eta;
    let cos_theta_t_sqr = 1.0 - inv_eta * inv_eta * (1.0 - cos_theta_i * cos_theta_i);
    if cos_theta_t_sqr <= 0.0 {
        return 1.0;
    }

    let cos_theta_i = cos_theta_i.abs();
    let cos_theta_t = cos_theta_t_sqr.sqrt();

    let rs = (eta * cos_theta_i - cos_theta_t) / (eta * cos_theta_i + cos_theta_t);
    let rp = (cos_theta_i - eta * cos_theta_t) / (cos_theta_i + eta * cos_theta_t);

    // average the power of both polarizations
    0.5 * (rs * rs + rp * rp)
}
