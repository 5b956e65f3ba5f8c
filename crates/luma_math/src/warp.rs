//! Warping functions that map the unit square onto sampling domains.

use crate::{safe_sqrt, Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Warp the unit square to the unit disk with uniform density `1 / pi`.
///
/// Concentric mapping: preserves stratification better than the polar
/// mapping. See <http://psgraphics.blogspot.ch/2011/01/improved-code-for-concentric-map.html>
pub fn square_to_uniform_disk_concentric(sample: Vec2) -> Vec2 {
    let r1 = 2.0 * sample.x - 1.0;
    let r2 = 2.0 * sample.y - 1.0;

    let (r, phi) = if r1 == 0.0 && r2 == 0.0 {
        (0.0, 0.0)
    } else if r1 * r1 > r2 * r2 {
        (r1, FRAC_PI_4 * (r2 / r1))
    } else {
        (r2, FRAC_PI_2 - FRAC_PI_4 * (r1 / r2))
    };

    Vec2::new(r * phi.cos(), r * phi.sin())
}

/// Warp the unit square to the unit sphere with uniform density `1 / (4 pi)`.
pub fn square_to_uniform_sphere(sample: Vec2) -> Vec3 {
    let z = 1.0 - 2.0 * sample.y;
    let r = safe_sqrt(1.0 - z * z);
    let phi = 2.0 * PI * sample.x;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Density of `square_to_uniform_sphere`.
pub fn uniform_sphere_pdf() -> f32 {
    1.0 / (4.0 * PI)
}

/// Warp the unit square to the +z unit hemisphere, uniform in solid angle.
pub fn square_to_uniform_hemisphere(sample: Vec2) -> Vec3 {
    let p = square_to_uniform_disk_concentric(sample);
    let z = 1.0 - p.x * p.x - p.y * p.y;
    let s = (z + 1.0).sqrt();
    Vec3::new(s * p.x, s * p.y, z)
}

/// Density of `square_to_uniform_hemisphere`.
pub fn uniform_hemisphere_pdf() -> f32 {
    1.0 / (2.0 * PI)
}

/// Warp the unit square to the +z unit hemisphere with density
/// `cos(theta) / pi`.
pub fn square_to_cosine_hemisphere(sample: Vec2) -> Vec3 {
    let p = square_to_uniform_disk_concentric(sample);
    let z = safe_sqrt(1.0 - p.x * p.x - p.y * p.y);
    Vec3::new(p.x, p.y, z)
}

/// Density of `square_to_cosine_hemisphere`.
pub fn cosine_hemisphere_pdf(v: Vec3) -> f32 {
    v.z.max(0.0) / PI
}
