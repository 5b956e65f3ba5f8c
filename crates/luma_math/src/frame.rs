use crate::{safe_sqrt, Vec3};

/// Orthonormal right-handed shading basis.
///
/// Material evaluation happens in the local frame where the surface normal is
/// `(0, 0, 1)`; the frame converts between that space and world space. The
/// invariant `tangent x bitangent = normal` must hold.
#[derive(Debug, Copy, Clone)]
pub struct Frame {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl Frame {
    /// Construct a frame with arbitrary (but deterministic) tangent and
    /// bitangent around a given unit normal.
    ///
    /// Branchless basis construction, stable for normals aligned with the z
    /// axis [Duff et al. 2017].
    pub fn from_normal(normal: Vec3) -> Self {
        let sign = 1.0_f32.copysign(normal.z);
        let a = -1.0 / (sign + normal.z);
        let b = normal.x * normal.y * a;
        Self {
            tangent: Vec3::new(1.0 + sign * normal.x * normal.x * a, sign * b, -sign * normal.x),
            bitangent: Vec3::new(b, sign + normal.y * normal.y * a, -normal.y),
            normal,
        }
    }

    /// Convert a world-space vector into the local shading frame.
    #[inline]
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        Vec3::new(
            world.dot(self.tangent),
            world.dot(self.bitangent),
            world.dot(self.normal),
        )
    }

    /// Convert a local shading-frame vector into world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        local.x * self.tangent + local.y * self.bitangent + local.z * self.normal
    }
}

/// cos(theta) of a local-frame direction.
#[inline]
pub fn cos_theta(w: Vec3) -> f32 {
    w.z
}

/// |cos(theta)| of a local-frame direction.
#[inline]
pub fn abs_cos_theta(w: Vec3) -> f32 {
    w.z.abs()
}

/// cos^2(theta) of a local-frame direction.
#[inline]
pub fn cos_theta2(w: Vec3) -> f32 {
    w.z * w.z
}

/// tan^2(theta) of a local-frame direction.
#[inline]
pub fn tan_theta2(w: Vec3) -> f32 {
    let cos2 = cos_theta2(w);
    (1.0 - cos2) / cos2
}

/// sin(theta) of a local-frame direction.
#[inline]
pub fn sin_theta(w: Vec3) -> f32 {
    safe_sqrt(1.0 - cos_theta2(w))
}

/// Whether two local-frame directions lie in the same hemisphere.
#[inline]
pub fn same_hemisphere(wi: Vec3, wo: Vec3) -> bool {
    wi.z * wo.z > 0.0
}
