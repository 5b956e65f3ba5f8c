//! The scene: camera, geometry, background and sampleable lights.

use crate::camera::Camera;
use crate::lights::{BackgroundLight, Light};
use crate::sampler::Sampler;
use crate::shape::{Intersection, Shape};
use crate::shapes::Group;
use luma_math::{Aabb, Color, Ray, Vec3, EPSILON};
use std::sync::Arc;

/// The result of picking a random light for next-event estimation.
pub struct LightSample<'a> {
    pub light: &'a dyn Light,
    /// The probability of this light having been picked.
    pub probability: f32,
}

/// Everything a rendering algorithm consumes. Immutable during rendering.
pub struct Scene {
    camera: Arc<dyn Camera>,
    /// The root of the scene geometry; multiple top-level shapes are wrapped
    /// in a group at construction.
    shape: Arc<dyn Shape>,
    background: Option<Arc<dyn BackgroundLight>>,
    /// Lights that next-event estimation may sample. Emissive instances only
    /// appear here if an area light was explicitly created for them.
    lights: Vec<Arc<dyn Light>>,
}

impl Scene {
    pub fn new(
        camera: Arc<dyn Camera>,
        mut shapes: Vec<Arc<dyn Shape>>,
        background: Option<Arc<dyn BackgroundLight>>,
        lights: Vec<Arc<dyn Light>>,
    ) -> Self {
        let shape: Arc<dyn Shape> = if shapes.len() == 1 {
            shapes.pop().unwrap()
        } else {
            Arc::new(Group::new(shapes))
        };
        shape.mark_visible();
        Self {
            camera,
            shape,
            background,
            lights,
        }
    }

    pub fn camera(&self) -> &dyn Camera {
        self.camera.as_ref()
    }

    /// Finds the closest intersection along a ray.
    pub fn intersect(&self, ray: &Ray, rng: &mut dyn Sampler) -> Intersection<'_> {
        let mut its = Intersection::new(ray.direction);
        self.shape.intersect(ray, &mut its, rng);
        its
    }

    /// Reports whether any geometry blocks the ray before `t_max`.
    ///
    /// The maximum distance shrinks by epsilon so a shadow ray aimed exactly
    /// at a light's surface does not count the light itself as a blocker.
    pub fn intersect_any(&self, ray: &Ray, t_max: f32, rng: &mut dyn Sampler) -> bool {
        let mut its = Intersection::with_max_distance(ray.direction, t_max * (1.0 - EPSILON));
        self.shape.intersect(ray, &mut its, rng)
    }

    /// The background illumination for a direction pointing out of the scene.
    pub fn evaluate_background(&self, direction: Vec3) -> Color {
        match &self.background {
            Some(background) => background.evaluate(direction),
            None => Color::ZERO,
        }
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    pub fn has_lights(&self) -> bool {
        !self.lights.is_empty()
    }

    /// Picks a light uniformly at random.
    pub fn sample_light(&self, rng: &mut dyn Sampler) -> Option<LightSample<'_>> {
        if self.lights.is_empty() {
            return None;
        }
        let index = ((rng.next() * self.lights.len() as f32) as usize).min(self.lights.len() - 1);
        Some(LightSample {
            light: self.lights[index].as_ref(),
            probability: 1.0 / self.lights.len() as f32,
        })
    }

    /// Bounding box of the scene geometry.
    pub fn bounds(&self) -> Aabb {
        self.shape.bounds()
    }
}
