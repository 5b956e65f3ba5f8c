use crate::sampler::Sampler;
use crate::shape::{AreaSample, Intersection, Shape, SurfaceEvent};
use luma_math::{Aabb, Frame, Ray, Vec2, Vec3, EPSILON};

/// A rectangle in the xy-plane, spanning from (-1,-1,0) to (+1,+1,0).
pub struct Rectangle;

impl Rectangle {
    /// Shared by intersection and area sampling so both report the same
    /// texture coordinates, frame and area pdf.
    fn populate(position: Vec3) -> SurfaceEvent {
        SurfaceEvent {
            position,
            // map [-1,1]^2 to [0,1]^2, discarding z
            uv: Vec2::new((position.x + 1.0) / 2.0, (position.y + 1.0) / 2.0),
            frame: Frame {
                tangent: Vec3::X,
                bitangent: Vec3::Y,
                normal: Vec3::Z,
            },
            // area sampling is uniform, so the pdf is 1 / surfaceArea
            pdf: 1.0 / 4.0,
        }
    }
}

impl Shape for Rectangle {
    fn intersect<'a>(
        &'a self,
        ray: &Ray,
        its: &mut Intersection<'a>,
        _rng: &mut dyn Sampler,
    ) -> bool {
        // rays travelling within the xy-plane produce no usable intersection
        if ray.direction.z == 0.0 {
            return false;
        }

        // solve origin.z + t * direction.z = 0
        let t = -ray.origin.z / ray.direction.z;
        if t < EPSILON || t > its.t {
            return false;
        }

        let position = ray.at(t);
        if position.x.abs() > 1.0 || position.y.abs() > 1.0 {
            return false;
        }

        its.t = t;
        its.surface = Self::populate(position);
        true
    }

    fn bounds(&self) -> Aabb {
        Aabb::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0))
    }

    fn centroid(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn sample_area(&self, rng: &mut dyn Sampler) -> AreaSample {
        let rnd = rng.next_2d();
        let position = Vec3::new(2.0 * rnd.x - 1.0, 2.0 * rnd.y - 1.0, 0.0);
        Self::populate(position)
    }
}
