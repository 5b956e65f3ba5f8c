//! Camera models mapping pixels to world-space rays.

mod perspective;
mod thin_lens;

pub use perspective::Perspective;
pub use thin_lens::ThinLens;

use crate::sampler::Sampler;
use luma_math::{Color, Ray, UVec2, Vec2};

/// Which image axis the field-of-view angle refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FovAxis {
    X,
    Y,
}

/// The result of sampling a camera.
#[derive(Debug, Copy, Clone)]
pub struct CameraSample {
    /// The generated ray, in world space with unit direction.
    pub ray: Ray,
    /// The weight of the sample.
    pub weight: Color,
}

/// The relationship between pixel coordinates and rays.
///
/// Local camera space looks along +z; normalized image coordinates range
/// from (-1, -1) to (+1, +1).
pub trait Camera: Send + Sync {
    /// The resolution of the image being rendered.
    fn resolution(&self) -> UVec2;

    /// Samples a ray for normalized image coordinates in [-1, 1]^2.
    fn sample_normalized(&self, normalized: Vec2, rng: &mut dyn Sampler) -> CameraSample;

    /// Samples a ray for a pixel, jittering the position within the pixel.
    fn sample(&self, pixel: UVec2, rng: &mut dyn Sampler) -> CameraSample {
        let jittered = pixel.as_vec2() + rng.next_2d();
        let normalized = 2.0 * jittered / self.resolution().as_vec2() - Vec2::ONE;
        let sample = self.sample_normalized(normalized, rng);
        assert!(
            (sample.ray.direction.length_squared() - 1.0).abs() < 1e-3,
            "camera produced a non-normalized ray direction"
        );
        sample
    }
}

/// Spanning vectors of the image plane at unit distance, honoring the
/// field-of-view axis and the aspect ratio.
pub(crate) fn image_plane_span(resolution: UVec2, fov_degrees: f32, axis: FovAxis) -> Vec2 {
    let tan_half = (fov_degrees.to_radians() / 2.0).tan();
    let aspect = resolution.x as f32 / resolution.y as f32;
    match axis {
        FovAxis::X => Vec2::new(tan_half, tan_half / aspect),
        FovAxis::Y => Vec2::new(tan_half * aspect, tan_half),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_square_image() {
        let span = image_plane_span(UVec2::new(64, 64), 90.0, FovAxis::X);
        assert!((span.x - 1.0).abs() < 1e-5);
        assert!((span.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_span_wide_image_y_axis() {
        let span = image_plane_span(UVec2::new(200, 100), 90.0, FovAxis::Y);
        assert!((span.y - 1.0).abs() < 1e-5);
        assert!((span.x - 2.0).abs() < 1e-4);
    }
}
