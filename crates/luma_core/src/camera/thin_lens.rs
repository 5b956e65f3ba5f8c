use super::{image_plane_span, Camera, CameraSample, FovAxis};
use crate::sampler::Sampler;
use luma_math::{warp, Color, Ray, Transform, UVec2, Vec2, Vec3};

/// A thin-lens camera with a finite aperture and a focus plane.
///
/// Rays start on a disk of `aperture_radius` around the camera origin and
/// converge on the focus plane, producing depth of field.
pub struct ThinLens {
    resolution: UVec2,
    transform: Transform,
    span: Vec2,
    aperture_radius: f32,
    focus_distance: f32,
}

impl ThinLens {
    pub fn new(
        resolution: UVec2,
        transform: Transform,
        fov_degrees: f32,
        axis: FovAxis,
        aperture_radius: f32,
        focus_distance: f32,
    ) -> Self {
        Self {
            resolution,
            transform,
            span: image_plane_span(resolution, fov_degrees, axis),
            aperture_radius,
            focus_distance,
        }
    }
}

impl Camera for ThinLens {
    fn resolution(&self) -> UVec2 {
        self.resolution
    }

    fn sample_normalized(&self, normalized: Vec2, rng: &mut dyn Sampler) -> CameraSample {
        // where the pinhole ray would intersect the focus plane
        let pinhole_direction = Vec3::new(
            self.span.x * normalized.x,
            self.span.y * normalized.y,
            1.0,
        );
        let focus_point = pinhole_direction * self.focus_distance;

        // jitter the ray origin across the lens disk
        let lens = warp::square_to_uniform_disk_concentric(rng.next_2d()) * self.aperture_radius;
        let origin = Vec3::new(lens.x, lens.y, 0.0);

        let local = Ray::new(origin, (focus_point - origin).normalize());
        CameraSample {
            ray: self.transform.apply_ray(&local).normalized(),
            weight: Color::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{test_sampler, Sampler as _};

    fn lens_camera(aperture: f32) -> ThinLens {
        ThinLens::new(
            UVec2::new(64, 64),
            Transform::identity(),
            60.0,
            FovAxis::Y,
            aperture,
            5.0,
        )
    }

    #[test]
    fn test_zero_aperture_reduces_to_pinhole() {
        let camera = lens_camera(0.0);
        let mut rng = test_sampler();
        rng.seed_sample(1);
        let sample = camera.sample_normalized(Vec2::new(0.3, -0.2), &mut rng);
        assert!(sample.ray.origin.length() < 1e-6);
    }

    #[test]
    fn test_all_rays_converge_on_focus_plane() {
        let camera = lens_camera(0.5);
        let mut rng = test_sampler();
        rng.seed_sample(2);
        let normalized = Vec2::new(0.1, 0.4);

        // the focus point is shared by every lens sample for this pixel
        let pinhole = Vec3::new(
            camera.span.x * normalized.x,
            camera.span.y * normalized.y,
            1.0,
        ) * camera.focus_distance;

        for _ in 0..16 {
            let sample = camera.sample_normalized(normalized, &mut rng);
            // advance the ray to the focus plane depth
            let t = (pinhole.z - sample.ray.origin.z) / sample.ray.direction.z;
            let hit = sample.ray.at(t);
            assert!(
                (hit - pinhole).length() < 1e-4,
                "lens ray missed the focus point: {hit} vs {pinhole}"
            );
        }
    }

    #[test]
    fn test_lens_origins_cover_the_aperture() {
        let camera = lens_camera(0.5);
        let mut rng = test_sampler();
        rng.seed_sample(3);
        let mut max_radius = 0.0_f32;
        for _ in 0..128 {
            let sample = camera.sample_normalized(Vec2::ZERO, &mut rng);
            let radius = sample.ray.origin.truncate().length();
            assert!(radius <= 0.5 + 1e-5);
            max_radius = max_radius.max(radius);
        }
        assert!(max_radius > 0.25, "lens sampling looks degenerate");
    }
}
