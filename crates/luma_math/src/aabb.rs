use crate::{Ray, Vec3, EPSILON};

/// Axis-aligned bounding box, stored as min/max corners.
///
/// The canonical empty box has `min = +inf` and `max = -inf`, so that
/// extending it by any point yields that point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The empty bounding box (contains nothing).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// The bounding box spanning all of space.
    pub const FULL: Aabb = Aabb {
        min: Vec3::NEG_INFINITY,
        max: Vec3::INFINITY,
    };

    /// Create a bounding box from two corner points.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a bounding box from an arbitrary pair of points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Extend this bounding box to contain a given point.
    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Extend this bounding box to cover another bounding box.
    pub fn extend_aabb(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Clamp a point to lie within this bounding box.
    pub fn clip(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Clamp another bounding box to lie within this one.
    pub fn clip_aabb(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.clip(other.min),
            max: self.clip(other.max),
        }
    }

    /// The extent of the box, `max - min`.
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// The center point of the box.
    pub fn center(&self) -> Vec3 {
        self.min + self.diagonal() * 0.5
    }

    /// Whether the box contains no volume (any axis inverted).
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y || self.min.z >= self.max.z
    }

    /// Whether any axis of the box covers an infinite range.
    ///
    /// The canonical empty box is not unbounded: its corners are infinite but
    /// it covers nothing.
    pub fn is_unbounded(&self) -> bool {
        self.min.cmple(Vec3::NEG_INFINITY).any() || self.max.cmpge(Vec3::INFINITY).any()
    }

    /// Whether the given point lies inside the box.
    pub fn includes(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Index of the axis with the largest extent (0 = x, 1 = y, 2 = z).
    pub fn largest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// One of the 8 corners of the box, indexed by the bits of `i`.
    pub fn corner(&self, i: usize) -> Vec3 {
        Vec3::new(
            if i & 1 != 0 { self.max.x } else { self.min.x },
            if i & 2 != 0 { self.max.y } else { self.min.y },
            if i & 4 != 0 { self.max.z } else { self.min.z },
        )
    }

    /// Slab test against a ray.
    ///
    /// Returns the near intersection distance, which may be negative when the
    /// ray starts inside the box, or `f32::INFINITY` when the ray misses the
    /// box or the box lies behind the origin. Divisions by zero direction
    /// components fall out of IEEE-754 arithmetic.
    #[inline]
    pub fn intersect(&self, ray: &Ray) -> f32 {
        let t1 = (self.min - ray.origin) / ray.direction;
        let t2 = (self.max - ray.origin) / ray.direction;

        // near slab per axis, then the latest entry; far slab per axis, then
        // the earliest exit
        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();

        if t_far < t_near || t_far < EPSILON {
            return f32::INFINITY;
        }
        t_near
    }
}
