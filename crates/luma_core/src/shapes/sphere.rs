use crate::sampler::Sampler;
use crate::shape::{AreaSample, Intersection, Shape, SurfaceEvent};
use luma_math::{warp, Aabb, Frame, Ray, Vec2, Vec3, EPSILON};
use std::f32::consts::PI;

/// The unit sphere centered at the origin.
pub struct Sphere;

impl Sphere {
    fn populate(position: Vec3) -> SurfaceEvent {
        let normal = position.normalize();
        SurfaceEvent {
            position,
            uv: spherical_uv(normal),
            frame: Frame::from_normal(normal),
            pdf: 1.0 / (4.0 * PI),
        }
    }
}

/// Spherical coordinates of a unit direction, mapped to [0,1]^2.
fn spherical_uv(n: Vec3) -> Vec2 {
    let u = (n.y.atan2(n.x) + PI) / (2.0 * PI);
    let v = n.z.clamp(-1.0, 1.0).acos() / PI;
    Vec2::new(u, v)
}

/// Numerically stable quadratic solver.
///
/// Picks the root expression that avoids catastrophic cancellation; returns
/// the two solutions in ascending order.
fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    let discriminant = b as f64 * b as f64 - 4.0 * a as f64 * c as f64;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let q = if (b as f64) < 0.0 {
        -0.5 * (b as f64 - root)
    } else {
        -0.5 * (b as f64 + root)
    };
    let t0 = (q / a as f64) as f32;
    let t1 = (c as f64 / q) as f32;
    Some(if t0 <= t1 { (t0, t1) } else { (t1, t0) })
}

impl Shape for Sphere {
    fn intersect<'a>(
        &'a self,
        ray: &Ray,
        its: &mut Intersection<'a>,
        _rng: &mut dyn Sampler,
    ) -> bool {
        // |o + t d|^2 = 1, written out so non-unit directions work too
        let a = ray.direction.length_squared();
        let b = 2.0 * ray.origin.dot(ray.direction);
        let c = ray.origin.length_squared() - 1.0;

        let Some((t0, t1)) = solve_quadratic(a, b, c) else {
            return false;
        };

        // the smallest root in front of the ray wins
        let t = if t0 >= EPSILON { t0 } else { t1 };
        if t < EPSILON || t > its.t {
            return false;
        }

        its.t = t;
        its.surface = Self::populate(ray.at(t));
        true
    }

    fn bounds(&self) -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    fn centroid(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn sample_area(&self, rng: &mut dyn Sampler) -> AreaSample {
        let position = warp::square_to_uniform_sphere(rng.next_2d());
        Self::populate(position)
    }
}
