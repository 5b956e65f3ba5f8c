use crate::accel::{Bvh, BvhPrimitives};
use crate::ply;
use crate::sampler::Sampler;
use crate::shape::{Intersection, Shape, SurfaceEvent};
use luma_math::{Aabb, Frame, Ray, Vec2, Vec3, EPSILON};
use std::path::Path;

/// A vertex of a triangle mesh.
#[derive(Debug, Copy, Clone)]
pub struct Vertex {
    pub position: Vec3,
    pub texcoords: Vec2,
    pub normal: Vec3,
}

/// Raw mesh buffers as produced by a loader, before attribute synthesis.
pub struct MeshData {
    pub triangles: Vec<[u32; 3]>,
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, if the source provided them.
    pub normals: Option<Vec<Vec3>>,
    /// Per-vertex texture coordinates, if the source provided them.
    pub texcoords: Option<Vec<Vec2>>,
}

/// A shape of potentially millions of triangles sharing one vertex buffer.
///
/// Individual triangles are never exposed as shapes; the mesh intersects its
/// triangles through the embedded BVH.
pub struct TriangleMesh {
    triangles: Vec<[u32; 3]>,
    vertices: Vec<Vertex>,
    /// Interpolate vertex normals barycentrically; otherwise the geometric
    /// face normal is reported.
    smooth_normals: bool,
    bvh: Bvh,
}

impl TriangleMesh {
    pub fn new(data: MeshData, smooth_normals: bool) -> Self {
        let MeshData {
            triangles,
            positions,
            normals,
            texcoords,
        } = data;

        let normals = normals.unwrap_or_else(|| averaged_normals(&positions, &triangles));
        let texcoords = texcoords.unwrap_or_else(|| bounding_box_uvs(&positions));

        let vertices = positions
            .into_iter()
            .zip(normals)
            .zip(texcoords)
            .map(|((position, normal), texcoords)| Vertex {
                position,
                texcoords,
                normal,
            })
            .collect();

        let mut mesh = Self {
            triangles,
            vertices,
            smooth_normals,
            bvh: Bvh::empty(),
        };
        mesh.bvh = Bvh::build(&mesh);
        mesh
    }

    /// Loads a mesh from a PLY file.
    pub fn load_ply(path: &Path, smooth_normals: bool) -> Result<Self, ply::PlyError> {
        let data = ply::load(path)?;
        log::info!(
            "loaded {} with {} triangles, {} vertices",
            path.display(),
            data.triangles.len(),
            data.positions.len()
        );
        Ok(Self::new(data, smooth_normals))
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn triangle(&self, index: usize) -> (&Vertex, &Vertex, &Vertex) {
        let [i0, i1, i2] = self.triangles[index];
        (
            &self.vertices[i0 as usize],
            &self.vertices[i1 as usize],
            &self.vertices[i2 as usize],
        )
    }
}

/// Area-weighted vertex normals for meshes that come without them.
fn averaged_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for [i0, i1, i2] in triangles {
        let p0 = positions[*i0 as usize];
        let face = (positions[*i1 as usize] - p0).cross(positions[*i2 as usize] - p0);
        normals[*i0 as usize] += face;
        normals[*i1 as usize] += face;
        normals[*i2 as usize] += face;
    }
    normals
        .into_iter()
        .map(|n| {
            if n.length_squared() > 0.0 {
                n.normalize()
            } else {
                Vec3::Z
            }
        })
        .collect()
}

/// Fallback parameterization by the bounding box of the mesh.
fn bounding_box_uvs(positions: &[Vec3]) -> Vec<Vec2> {
    let mut bounds = Aabb::EMPTY;
    for &p in positions {
        bounds.extend(p);
    }
    let diagonal = bounds.diagonal().max(Vec3::splat(1e-8));
    positions
        .iter()
        .map(|p| {
            let relative = (*p - bounds.min) / diagonal;
            Vec2::new(relative.x, relative.y)
        })
        .collect()
}

impl BvhPrimitives for TriangleMesh {
    fn len(&self) -> usize {
        self.triangles.len()
    }

    fn bounds_of(&self, index: usize) -> Aabb {
        let (v0, v1, v2) = self.triangle(index);
        let mut aabb = Aabb::from_points(v0.position, v1.position);
        aabb.extend(v2.position);
        aabb
    }

    fn centroid_of(&self, index: usize) -> Vec3 {
        let (v0, v1, v2) = self.triangle(index);
        (v0.position + v1.position + v2.position) / 3.0
    }

    /// Moeller-Trumbore ray/triangle intersection.
    fn intersect_one<'a>(
        &'a self,
        index: usize,
        ray: &Ray,
        its: &mut Intersection<'a>,
        _rng: &mut dyn Sampler,
    ) -> bool {
        let (v0, v1, v2) = self.triangle(index);

        let edge1 = v1.position - v0.position;
        let edge2 = v2.position - v0.position;
        let p = ray.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < EPSILON {
            // ray parallel to the triangle plane
            return false;
        }
        let inv_det = 1.0 / det;

        let s = ray.origin - v0.position;
        let u = inv_det * s.dot(p);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(edge1);
        let v = inv_det * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = inv_det * edge2.dot(q);
        if t < EPSILON || t > its.t {
            return false;
        }

        let bary = Vec2::new(u, v);
        let normal = if self.smooth_normals {
            interpolate(bary, v0.normal, v1.normal, v2.normal).normalize()
        } else {
            edge1.cross(edge2).normalize()
        };

        its.t = t;
        its.surface = SurfaceEvent {
            position: ray.at(t),
            uv: interpolate(bary, v0.texcoords, v1.texcoords, v2.texcoords),
            frame: Frame::from_normal(normal),
            pdf: 0.0,
        };
        true
    }
}

/// Barycentric interpolation; (0,0) returns `a`, (1,0) `b`, (0,1) `c`.
fn interpolate<T>(bary: Vec2, a: T, b: T, c: T) -> T
where
    T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
{
    a * (1.0 - bary.x - bary.y) + b * bary.x + c * bary.y
}

impl Shape for TriangleMesh {
    fn intersect<'a>(
        &'a self,
        ray: &Ray,
        its: &mut Intersection<'a>,
        rng: &mut dyn Sampler,
    ) -> bool {
        self.bvh.intersect(self, ray, its, rng)
    }

    fn bounds(&self) -> Aabb {
        self.bvh.bounds()
    }

    fn centroid(&self) -> Vec3 {
        self.bvh.bounds().center()
    }
}
