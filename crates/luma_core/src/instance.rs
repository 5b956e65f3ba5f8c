//! Instances bind shapes into the scene, attaching materials and transforms.

use crate::bsdf::Bsdf;
use crate::emission::Emission;
use crate::sampler::Sampler;
use crate::shape::{AreaSample, Intersection, Shape, SurfaceEvent};
use crate::texture::Texture;
use luma_math::{Aabb, Frame, Ray, Transform, Vec3};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

#[derive(Debug, thiserror::Error)]
#[error("instances can only be wrapped by a single area light")]
pub struct DuplicateLightError;

/// An instantiation of a shape in the scene.
///
/// Wrapping shapes keeps geometry reusable: a complex mesh can be loaded once
/// and instanced many times under different transforms without duplicating
/// triangles. The instance augments the wrapped shape's intersections with
/// its material, emission and transform.
pub struct Instance {
    shape: Arc<dyn Shape>,
    bsdf: Option<Arc<dyn Bsdf>>,
    emission: Option<Arc<dyn Emission>>,
    transform: Option<Transform>,
    normal_map: Option<Arc<dyn Texture>>,
    /// Corrects the change of handedness when the transform mirrors the
    /// object (negative determinant).
    flip_normal: bool,
    /// Whether the instance is part of the visible scene geometry.
    visible: AtomicBool,
    /// Back-edge to the area light wrapping this instance, set at most once
    /// during scene construction. Stores the index into the scene's light
    /// list; never walked during intersection.
    light: OnceLock<usize>,
}

impl Instance {
    pub fn new(
        shape: Arc<dyn Shape>,
        bsdf: Option<Arc<dyn Bsdf>>,
        emission: Option<Arc<dyn Emission>>,
        transform: Option<Transform>,
        normal_map: Option<Arc<dyn Texture>>,
    ) -> Self {
        let flip_normal = transform
            .as_ref()
            .is_some_and(|t| t.determinant() < 0.0);
        Self {
            shape,
            bsdf,
            emission,
            transform,
            normal_map,
            flip_normal,
            visible: AtomicBool::new(false),
            light: OnceLock::new(),
        }
    }

    pub fn bsdf(&self) -> Option<&dyn Bsdf> {
        self.bsdf.as_deref()
    }

    pub fn emission(&self) -> Option<&dyn Emission> {
        self.emission.as_deref()
    }

    /// Whether rays traced through the scene can hit this instance.
    pub fn visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    /// Index of the area light wrapping this instance, if any.
    pub fn light(&self) -> Option<usize> {
        self.light.get().copied()
    }

    /// Registers the area light wrapping this instance. Registering a second
    /// light is a scene-construction error.
    pub fn set_light(&self, light_index: usize) -> Result<(), DuplicateLightError> {
        self.light.set(light_index).map_err(|_| DuplicateLightError)
    }

    /// Transforms a surface event from object to world coordinates.
    fn transform_frame(&self, surf: &mut SurfaceEvent) {
        if let Some(map) = &self.normal_map {
            // decode RGB in [0,1]^3 to a direction in [-1,1]^3, expressed in
            // the surface frame
            let rgb = map.evaluate(surf.uv);
            let m = 2.0 * rgb - Vec3::ONE;
            let mapped = (m.x * surf.frame.tangent
                + m.y * surf.frame.bitangent
                + m.z * surf.frame.normal)
                .normalize();
            let world_normal = match &self.transform {
                Some(t) => t.apply_normal(mapped).normalize(),
                None => mapped,
            };
            surf.frame = Frame::from_normal(world_normal);
        } else if let Some(t) = &self.transform {
            let tangent = t.apply_vector(surf.frame.tangent).normalize();
            let bitangent = t.apply_vector(surf.frame.bitangent).normalize();
            surf.frame = Frame {
                tangent,
                bitangent,
                normal: tangent.cross(bitangent).normalize(),
            };
        }

        if let Some(t) = &self.transform {
            surf.position = t.apply_point(surf.position);
        }

        if self.flip_normal {
            surf.frame.bitangent = -surf.frame.bitangent;
            surf.frame.normal = -surf.frame.normal;
        }
    }
}

impl Shape for Instance {
    fn intersect<'a>(
        &'a self,
        world_ray: &Ray,
        its: &mut Intersection<'a>,
        rng: &mut dyn Sampler,
    ) -> bool {
        let Some(transform) = &self.transform else {
            // fast path: object space is world space
            if self.shape.intersect(world_ray, its, rng) {
                its.instance = Some(self);
                self.transform_frame(&mut its.surface);
                return true;
            }
            return false;
        };

        let previous_t = its.t;

        // the local direction is deliberately left un-normalized: its length
        // is the scale factor between world and object space, so rescaling
        // `t` on the way in and out keeps `origin + t * direction` consistent
        // across both spaces
        let mut local_ray = transform.inverse_ray(world_ray);
        let scale = local_ray.direction.length();
        local_ray.direction /= scale;
        its.t *= scale;

        if self.shape.intersect(&local_ray, its, rng) {
            its.instance = Some(self);
            its.t /= scale;
            self.transform_frame(&mut its.surface);
            true
        } else {
            its.t = previous_t;
            false
        }
    }

    fn bounds(&self) -> Aabb {
        match &self.transform {
            None => self.shape.bounds(),
            Some(t) => t.apply_aabb(&self.shape.bounds()),
        }
    }

    fn centroid(&self) -> Vec3 {
        match &self.transform {
            None => self.shape.centroid(),
            Some(t) => t.apply_point(self.shape.centroid()),
        }
    }

    fn sample_area(&self, rng: &mut dyn Sampler) -> AreaSample {
        let mut sample = self.shape.sample_area(rng);
        self.transform_frame(&mut sample);
        sample
    }

    fn mark_visible(&self) {
        self.visible.store(true, Ordering::Relaxed);
        self.shape.mark_visible();
    }
}
