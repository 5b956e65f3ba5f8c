// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod frame;
mod ray;
mod transform;
pub mod warp;

pub use aabb::Aabb;
pub use frame::{
    abs_cos_theta, cos_theta, cos_theta2, same_hemisphere, sin_theta, tan_theta2, Frame,
};
pub use ray::Ray;
pub use transform::{Transform, TransformError};

/// Color type alias (linear RGB, values typically 0-1 but unbounded for HDR)
pub type Color = Vec3;

/// Tolerance threshold for floating point inaccuracies.
///
/// Intersections closer than this distance are treated as self-intersections
/// and discarded.
pub const EPSILON: f32 = 1e-5;

/// Square root that clamps negative inputs to zero.
///
/// Use where floating point error can push an argument slightly below zero,
/// e.g. `sin = safe_sqrt(1.0 - cos * cos)`.
#[inline]
pub fn safe_sqrt(v: f32) -> f32 {
    if v <= 0.0 {
        0.0
    } else {
        v.sqrt()
    }
}

/// Reflects `w` at a surface with normal `n`.
///
/// Both vectors point away from the surface.
#[inline]
pub fn reflect(w: Vec3, n: Vec3) -> Vec3 {
    2.0 * n.dot(w) * n - w
}

/// Refracts `w` at a surface with normal `n` and relative index of
/// refraction `eta` (n2 / n1). Both vectors point away from the surface.
///
/// Returns the zero vector on total internal reflection.
#[inline]
pub fn refract(w: Vec3, n: Vec3, eta: f32) -> Vec3 {
    let inv_eta = 1.0 / eta;
    let k = 1.0 - inv_eta * inv_eta * (1.0 - n.dot(w) * n.dot(w));
    if k < 0.0 {
        return Vec3::ZERO;
    }
    (inv_eta * n.dot(w) - k.sqrt()) * n - inv_eta * w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_mirrors_across_normal() {
        let w = Vec3::new(1.0, 0.0, 1.0).normalize();
        let r = reflect(w, Vec3::Z);
        assert!((r - Vec3::new(-w.x, 0.0, w.z)).length() < 1e-6);
    }

    #[test]
    fn test_refract_straight_through() {
        // Normal incidence is unchanged apart from the sign flip
        let w = Vec3::Z;
        let r = refract(w, Vec3::Z, 1.0);
        assert!((r - (-Vec3::Z)).length() < 1e-6);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // Grazing exit from a dense medium has no transmitted direction
        let w = Vec3::new(0.99, 0.0, 0.14).normalize();
        let r = refract(w, Vec3::Z, 1.0 / 1.5);
        assert_eq!(r, Vec3::ZERO);
    }

    #[test]
    fn test_safe_sqrt() {
        assert_eq!(safe_sqrt(-1e-8), 0.0);
        assert_eq!(safe_sqrt(4.0), 2.0);
    }
}
