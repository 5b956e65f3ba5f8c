use super::{image_plane_span, Camera, CameraSample, FovAxis};
use crate::sampler::Sampler;
use luma_math::{Color, Ray, Transform, UVec2, Vec2, Vec3};

/// A pinhole perspective camera.
///
/// In local coordinates the camera sits at the origin looking along +z;
/// `transform` places it in the world.
pub struct Perspective {
    resolution: UVec2,
    transform: Transform,
    span: Vec2,
}

impl Perspective {
    pub fn new(resolution: UVec2, transform: Transform, fov_degrees: f32, axis: FovAxis) -> Self {
        Self {
            resolution,
            transform,
            // precompute the image-plane spanning vectors; trigonometry per
            // sample would dominate the ray setup
            span: image_plane_span(resolution, fov_degrees, axis),
        }
    }
}

impl Camera for Perspective {
    fn resolution(&self) -> UVec2 {
        self.resolution
    }

    fn sample_normalized(&self, normalized: Vec2, _rng: &mut dyn Sampler) -> CameraSample {
        let direction = Vec3::new(
            self.span.x * normalized.x,
            self.span.y * normalized.y,
            1.0,
        );
        let local = Ray::new(Vec3::ZERO, direction.normalize());
        CameraSample {
            ray: self.transform.apply_ray(&local).normalized(),
            weight: Color::ONE,
        }
    }
}
