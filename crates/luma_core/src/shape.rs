//! The `Shape` trait and the surface records produced by intersections.

use crate::bsdf::{BsdfEval, BsdfSample};
use crate::instance::Instance;
use crate::sampler::Sampler;
use luma_math::{Aabb, Color, Frame, Ray, Vec2, Vec3};

/// A point on a surface together with the orientation of the surface there.
///
/// Populated both by ray intersection and by area sampling, so that the two
/// paths agree on texture coordinates, shading frame and area pdf.
#[derive(Debug, Copy, Clone)]
pub struct SurfaceEvent {
    /// The position of the surface point.
    pub position: Vec3,
    /// Texture coordinates in [0,1]^2.
    pub uv: Vec2,
    /// The shading frame at the surface point.
    pub frame: Frame,
    /// Probability of sampling this point via area sampling, in area units.
    pub pdf: f32,
}

impl SurfaceEvent {
    pub fn invalid() -> Self {
        Self {
            position: Vec3::ZERO,
            uv: Vec2::ZERO,
            frame: Frame::from_normal(Vec3::Z),
            pdf: 0.0,
        }
    }
}

/// The result of sampling a random point on a shape's surface.
pub type AreaSample = SurfaceEvent;

/// Counters recorded while traversing acceleration structures.
#[derive(Debug, Copy, Clone, Default)]
pub struct TraversalStats {
    /// Number of BVH nodes tested for intersection.
    pub bvh_nodes: u32,
    /// Number of primitives tested for intersection.
    pub prim_tests: u32,
}

/// An intersection of a ray with the scene.
///
/// `t` doubles as the maximum query distance: shapes must dismiss candidate
/// hits farther than the current value and leave the record untouched when
/// they miss.
#[derive(Copy, Clone)]
pub struct Intersection<'a> {
    pub surface: SurfaceEvent,
    /// The instance that was hit, if any. `None` means "no hit" for
    /// scene-level queries.
    pub instance: Option<&'a Instance>,
    /// Direction towards the ray origin (pointing away from the surface),
    /// in world space.
    pub wo: Vec3,
    /// The intersection distance.
    pub t: f32,
    pub stats: TraversalStats,
}

impl<'a> Intersection<'a> {
    /// A fresh record for a ray with direction `direction`, unbounded.
    pub fn new(direction: Vec3) -> Self {
        Self::with_max_distance(direction, f32::INFINITY)
    }

    /// A fresh record that dismisses hits beyond `t_max` (shadow rays).
    pub fn with_max_distance(direction: Vec3, t_max: f32) -> Self {
        Self {
            surface: SurfaceEvent::invalid(),
            instance: None,
            wo: -direction,
            t: t_max,
            stats: TraversalStats::default(),
        }
    }

    /// Whether an object has been hit.
    pub fn is_hit(&self) -> bool {
        self.instance.is_some()
    }

    /// Evaluates the emission of the hit instance towards the ray origin.
    pub fn evaluate_emission(&self) -> Color {
        let Some(instance) = self.instance else {
            return Color::ZERO;
        };
        let Some(emission) = instance.emission() else {
            return Color::ZERO;
        };
        let wo_local = self.surface.frame.to_local(self.wo);
        emission.evaluate(self.surface.uv, wo_local).value
    }

    /// Samples the BSDF of the hit surface; the returned direction is in
    /// world space.
    pub fn sample_bsdf(&self, rng: &mut dyn Sampler) -> BsdfSample {
        let Some(bsdf) = self.instance.and_then(Instance::bsdf) else {
            return BsdfSample::invalid();
        };
        let wo_local = self.surface.frame.to_local(self.wo);
        let mut sample = bsdf.sample(self.surface.uv, wo_local, rng);
        if !sample.is_invalid() {
            sample.wi = self.surface.frame.to_world(sample.wi);
        }
        sample
    }

    /// Evaluates the BSDF of the hit surface for a world-space direction.
    pub fn evaluate_bsdf(&self, wi: Vec3) -> BsdfEval {
        let Some(bsdf) = self.instance.and_then(Instance::bsdf) else {
            return BsdfEval::invalid();
        };
        let wo_local = self.surface.frame.to_local(self.wo);
        let wi_local = self.surface.frame.to_local(wi);
        bsdf.evaluate(self.surface.uv, wo_local, wi_local)
    }

    /// The albedo of the hit surface, for the albedo integrator.
    pub fn albedo(&self) -> Color {
        match self.instance.and_then(Instance::bsdf) {
            Some(bsdf) => bsdf.albedo(self.surface.uv),
            None => Color::ZERO,
        }
    }
}

/// A geometrical object that can be intersected by rays.
pub trait Shape: Send + Sync {
    /// Tests the shape for intersection, updating `its` on success.
    ///
    /// Hits farther than the previous `its.t` (or closer than epsilon) are
    /// dismissed, and a miss must leave `its` unchanged apart from the
    /// traversal statistics.
    fn intersect<'a>(
        &'a self,
        ray: &Ray,
        its: &mut Intersection<'a>,
        rng: &mut dyn Sampler,
    ) -> bool;

    /// A bounding box that tightly encapsulates the shape.
    fn bounds(&self) -> Aabb;

    /// A representative point inside the bounding box, used for BVH
    /// partitioning.
    fn centroid(&self) -> Vec3;

    /// Samples a random point on the surface of this shape.
    fn sample_area(&self, rng: &mut dyn Sampler) -> AreaSample {
        let _ = rng;
        panic!("this shape does not support area sampling");
    }

    /// Marks the shape as part of the visible scene geometry, i.e. reachable
    /// by ray tracing (as opposed to only being referenced by an area light).
    fn mark_visible(&self) {}
}
