use crate::Vec3;

/// A ray in 3D space.
///
/// Represents the half-line `origin + t * direction` for `t >= 0`. The
/// `depth` field counts how many bounces the ray has taken, for use by the
/// integrators.
///
/// User-facing rays carry a normalized direction; rays that have been pushed
/// through an instance transform may not (their length encodes the scale
/// factor between the two spaces).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub depth: u32,
}

impl Ray {
    /// Create a new primary ray (depth 0).
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            depth: 0,
        }
    }

    /// Create a ray with an explicit bounce depth.
    pub fn with_depth(origin: Vec3, direction: Vec3, depth: u32) -> Self {
        Self {
            origin,
            direction,
            depth,
        }
    }

    /// Get the point along the ray at parameter t.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Returns a copy with normalized direction (useful after transforms).
    pub fn normalized(&self) -> Self {
        Self {
            origin: self.origin,
            direction: self.direction.normalize(),
            depth: self.depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_normalized_keeps_depth() {
        let ray = Ray::with_depth(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), 3);
        let n = ray.normalized();
        assert_eq!(n.direction, Vec3::Z);
        assert_eq!(n.depth, 3);
    }
}
