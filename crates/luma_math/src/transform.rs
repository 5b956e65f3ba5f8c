use crate::{Aabb, Mat3, Mat4, Ray, Vec3, Vec4};

/// Errors raised while composing a transform from a scene description.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("transform matrix is not invertible")]
    NotInvertible,
    #[error("scaling by zero is not invertible")]
    ZeroScale,
    #[error("lookat direction and up vector must not be colinear")]
    ColinearLookAt,
}

/// An affine transform between object and world space.
///
/// The forward and inverse matrices are kept in lockstep as operations are
/// appended, so applying the inverse never has to invert at render time.
#[derive(Debug, Copy, Clone)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
        }
    }

    /// Append an arbitrary matrix in homogeneous coordinates.
    pub fn matrix(&mut self, value: Mat4) -> Result<(), TransformError> {
        let det = value.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(TransformError::NotInvertible);
        }
        self.matrix = value * self.matrix;
        self.inverse = self.inverse * value.inverse();
        Ok(())
    }

    /// Append a translation.
    pub fn translate(&mut self, offset: Vec3) {
        self.matrix = Mat4::from_translation(offset) * self.matrix;
        self.inverse = self.inverse * Mat4::from_translation(-offset);
    }

    /// Append a (potentially non-uniform) scale.
    pub fn scale(&mut self, factors: Vec3) -> Result<(), TransformError> {
        if factors.x * factors.y * factors.z == 0.0 {
            return Err(TransformError::ZeroScale);
        }
        self.matrix = Mat4::from_scale(factors) * self.matrix;
        self.inverse = self.inverse * Mat4::from_scale(factors.recip());
        Ok(())
    }

    /// Append a rotation of `angle` radians around `axis`.
    pub fn rotate(&mut self, axis: Vec3, angle: f32) {
        let rotation = Mat4::from_axis_angle(axis.normalize(), angle);
        self.matrix = rotation * self.matrix;
        self.inverse = self.inverse * rotation.transpose();
    }

    /// Append a "lookat" operation: re-orients +z towards `target - origin`
    /// with +y in the plane of the `up` vector. Used to aim cameras.
    pub fn lookat(&mut self, origin: Vec3, target: Vec3, up: Vec3) -> Result<(), TransformError> {
        let direction = (target - origin).normalize();
        let left = up.cross(direction);
        if left.length_squared() < 1e-12 {
            return Err(TransformError::ColinearLookAt);
        }
        let left = left.normalize();
        let orthogonal_up = direction.cross(left).normalize();

        let matrix = Mat4::from_cols(
            Vec4::from((left, 0.0)),
            Vec4::from((orthogonal_up, 0.0)),
            Vec4::from((direction, 0.0)),
            Vec4::from((origin, 1.0)),
        );
        self.matrix = matrix * self.matrix;

        // rigid transform: the inverse is the transposed rotation with the
        // origin rotated back
        let rotation = Mat4::from_cols(
            Vec4::from((left, 0.0)),
            Vec4::from((orthogonal_up, 0.0)),
            Vec4::from((direction, 0.0)),
            Vec4::W,
        )
        .transpose();
        let inverse = rotation * Mat4::from_translation(-origin);
        self.inverse = self.inverse * inverse;
        Ok(())
    }

    /// Transform a point into world space (with perspective divide).
    #[inline]
    pub fn apply_point(&self, point: Vec3) -> Vec3 {
        self.matrix.project_point3(point)
    }

    /// Transform a direction into world space (no translation).
    #[inline]
    pub fn apply_vector(&self, vector: Vec3) -> Vec3 {
        self.matrix.transform_vector3(vector)
    }

    /// Transform a normal into world space via the cofactor matrix
    /// (inverse transpose). The result is not normalized.
    #[inline]
    pub fn apply_normal(&self, normal: Vec3) -> Vec3 {
        self.inverse.transpose().transform_vector3(normal)
    }

    /// Transform a ray into world space.
    ///
    /// The direction is not re-normalized; its length carries the scale
    /// factor between the two spaces.
    #[inline]
    pub fn apply_ray(&self, ray: &Ray) -> Ray {
        Ray::with_depth(
            self.apply_point(ray.origin),
            self.apply_vector(ray.direction),
            ray.depth,
        )
    }

    /// Transform a point into object space.
    #[inline]
    pub fn inverse_point(&self, point: Vec3) -> Vec3 {
        self.inverse.project_point3(point)
    }

    /// Transform a direction into object space.
    #[inline]
    pub fn inverse_vector(&self, vector: Vec3) -> Vec3 {
        self.inverse.transform_vector3(vector)
    }

    /// Transform a ray into object space, without re-normalizing.
    #[inline]
    pub fn inverse_ray(&self, ray: &Ray) -> Ray {
        Ray::with_depth(
            self.inverse_point(ray.origin),
            self.inverse_vector(ray.direction),
            ray.depth,
        )
    }

    /// Transform a bounding box by taking the AABB of its 8 transformed
    /// corners. Unbounded boxes stay unbounded.
    pub fn apply_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_unbounded() {
            return Aabb::FULL;
        }
        let mut result = Aabb::EMPTY;
        for i in 0..8 {
            result.extend(self.apply_point(aabb.corner(i)));
        }
        result
    }

    /// Determinant of the linear (upper-left 3x3) part. Negative values
    /// indicate a handedness flip.
    pub fn determinant(&self) -> f32 {
        Mat3::from_mat4(self.matrix).determinant()
    }
}
