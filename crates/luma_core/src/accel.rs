//! Binary bounding-volume hierarchy over an indexed set of primitives.
//!
//! Shapes that combine many children (triangle meshes, groups) embed a [`Bvh`]
//! and expose their children through [`BvhPrimitives`]. The tree is stored as
//! a flat node array; leaves reference a contiguous range of a primitive index
//! permutation, so the primitives themselves never move.

use crate::sampler::Sampler;
use crate::shape::Intersection;
use luma_math::{Aabb, Ray, Vec3};

/// An indexed collection of primitives that a [`Bvh`] can be built over.
pub trait BvhPrimitives {
    /// Number of primitives in the collection.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounding box of a single primitive.
    fn bounds_of(&self, index: usize) -> Aabb;

    /// Centroid of a single primitive, used for partitioning.
    fn centroid_of(&self, index: usize) -> Vec3;

    /// Intersect a single primitive with the given ray.
    fn intersect_one<'a>(
        &'a self,
        index: usize,
        ray: &Ray,
        its: &mut Intersection<'a>,
        rng: &mut dyn Sampler,
    ) -> bool;
}

/// A node of the binary BVH tree.
///
/// `primitive_count == 0` marks an internal node whose children occupy
/// positions `left_first` and `left_first + 1` in the node array. Otherwise
/// the node is a leaf owning the primitive-index range
/// `[left_first, left_first + primitive_count)`.
#[derive(Debug, Copy, Clone)]
struct Node {
    aabb: Aabb,
    left_first: u32,
    primitive_count: u32,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.primitive_count != 0
    }
}

/// Flat-array binary BVH with an index permutation into the primitive set.
pub struct Bvh {
    nodes: Vec<Node>,
    primitive_indices: Vec<u32>,
}

impl Bvh {
    /// A hierarchy over nothing; placeholder for two-phase construction.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            primitive_indices: Vec::new(),
        }
    }

    /// Builds the hierarchy by recursive median split.
    pub fn build<P: BvhPrimitives>(primitives: &P) -> Self {
        let n = primitives.len();
        let mut bvh = Bvh {
            nodes: Vec::new(),
            primitive_indices: (0..n as u32).collect(),
        };
        if n == 0 {
            return bvh;
        }

        bvh.nodes.push(Node {
            aabb: Aabb::EMPTY,
            left_first: 0,
            primitive_count: n as u32,
        });
        bvh.compute_aabb(0, primitives);
        bvh.subdivide(0, primitives);

        log::debug!("built BVH with {} nodes for {} primitives", bvh.nodes.len(), n);
        bvh
    }

    /// Bounding box of the whole hierarchy.
    pub fn bounds(&self) -> Aabb {
        match self.nodes.first() {
            Some(root) => root.aabb,
            None => Aabb::EMPTY,
        }
    }

    /// Number of nodes in the tree (for diagnostics).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Traverses the hierarchy, folding the closest primitive hit into `its`.
    pub fn intersect<'a, P: BvhPrimitives>(
        &self,
        primitives: &'a P,
        ray: &Ray,
        its: &mut Intersection<'a>,
        rng: &mut dyn Sampler,
    ) -> bool {
        if self.primitive_indices.is_empty() {
            return false;
        }
        if self.nodes[0].aabb.intersect(ray) < its.t {
            return self.intersect_node(0, primitives, ray, its, rng);
        }
        false
    }

    fn compute_aabb<P: BvhPrimitives>(&mut self, node_index: usize, primitives: &P) {
        let node = self.nodes[node_index];
        let mut aabb = Aabb::EMPTY;
        for i in 0..node.primitive_count {
            let primitive = self.primitive_indices[(node.left_first + i) as usize];
            aabb.extend_aabb(&primitives.bounds_of(primitive as usize));
        }
        self.nodes[node_index].aabb = aabb;
    }

    fn subdivide<P: BvhPrimitives>(&mut self, parent_index: usize, primitives: &P) {
        let parent = self.nodes[parent_index];
        if parent.primitive_count <= 2 {
            return;
        }

        // split at the center of the parent box, along its longest axis
        let split_axis = parent.aabb.largest_axis();
        let split_pos = parent.aabb.center()[split_axis];

        // two-pointer partition over the index permutation; centroids below
        // the split go left, ties go right
        let first_primitive = parent.left_first as usize;
        let mut first_right = first_primitive;
        let mut last_left = first_primitive + parent.primitive_count as usize - 1;
        while first_right <= last_left {
            let centroid = primitives.centroid_of(self.primitive_indices[first_right] as usize);
            if centroid[split_axis] < split_pos {
                first_right += 1;
            } else {
                self.primitive_indices.swap(first_right, last_left);
                if last_left == 0 {
                    break;
                }
                last_left -= 1;
            }
        }

        let left_count = (first_right - first_primitive) as u32;
        let right_count = parent.primitive_count - left_count;
        if left_count == 0 || right_count == 0 {
            // degenerate split (e.g. all centroids coincide); keep the leaf
            return;
        }

        let left_index = self.nodes.len();
        let right_index = left_index + 1;
        self.nodes[parent_index].primitive_count = 0;
        self.nodes[parent_index].left_first = left_index as u32;

        self.nodes.push(Node {
            aabb: Aabb::EMPTY,
            left_first: first_primitive as u32,
            primitive_count: left_count,
        });
        self.nodes.push(Node {
            aabb: Aabb::EMPTY,
            left_first: first_right as u32,
            primitive_count: right_count,
        });

        self.compute_aabb(left_index, primitives);
        self.subdivide(left_index, primitives);
        self.compute_aabb(right_index, primitives);
        self.subdivide(right_index, primitives);
    }

    fn intersect_node<'a, P: BvhPrimitives>(
        &self,
        node_index: usize,
        primitives: &'a P,
        ray: &Ray,
        its: &mut Intersection<'a>,
        rng: &mut dyn Sampler,
    ) -> bool {
        let node = &self.nodes[node_index];
        its.stats.bvh_nodes += 1;

        let mut was_intersected = false;
        if node.is_leaf() {
            for i in 0..node.primitive_count {
                its.stats.prim_tests += 1;
                let primitive = self.primitive_indices[(node.left_first + i) as usize];
                was_intersected |= primitives.intersect_one(primitive as usize, ray, its, rng);
            }
        } else {
            // traverse the nearer child first and skip children whose entry
            // distance already exceeds the closest hit
            let left = node.left_first as usize;
            let right = left + 1;
            let left_t = self.nodes[left].aabb.intersect(ray);
            let right_t = self.nodes[right].aabb.intersect(ray);

            let (near, near_t, far, far_t) = if left_t < right_t {
                (left, left_t, right, right_t)
            } else {
                (right, right_t, left, left_t)
            };
            if near_t < its.t {
                was_intersected |= self.intersect_node(near, primitives, ray, its, rng);
            }
            if far_t < its.t {
                was_intersected |= self.intersect_node(far, primitives, ray, its, rng);
            }
        }
        was_intersected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::test_sampler;
    use crate::shape::SurfaceEvent;
    use luma_math::{Frame, Vec2, EPSILON};

    /// A set of axis-aligned unit cubes for exercising the tree.
    struct Boxes {
        boxes: Vec<Aabb>,
    }

    impl Boxes {
        fn grid(n: usize) -> Self {
            let boxes = (0..n)
                .map(|i| {
                    let base = Vec3::new(2.0 * i as f32, 0.0, 0.0);
                    Aabb::new(base, base + Vec3::ONE)
                })
                .collect();
            Self { boxes }
        }
    }

    impl BvhPrimitives for Boxes {
        fn len(&self) -> usize {
            self.boxes.len()
        }

        fn bounds_of(&self, index: usize) -> Aabb {
            self.boxes[index]
        }

        fn centroid_of(&self, index: usize) -> Vec3 {
            self.boxes[index].center()
        }

        fn intersect_one<'a>(
            &'a self,
            index: usize,
            ray: &Ray,
            its: &mut Intersection<'a>,
            _rng: &mut dyn Sampler,
        ) -> bool {
            let t = self.boxes[index].intersect(ray);
            if t < EPSILON || t > its.t {
                return false;
            }
            its.t = t;
            its.surface = SurfaceEvent {
                position: ray.at(t),
                uv: Vec2::ZERO,
                frame: Frame::from_normal(Vec3::Z),
                pdf: 0.0,
            };
            true
        }
    }

    #[test]
    fn test_empty_set() {
        let boxes = Boxes { boxes: vec![] };
        let bvh = Bvh::build(&boxes);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut its = Intersection::new(ray.direction);
        assert!(!bvh.intersect(&boxes, &ray, &mut its, &mut test_sampler()));
        assert!(bvh.bounds().is_empty());
    }

    #[test]
    fn test_single_primitive_is_leaf() {
        let boxes = Boxes::grid(1);
        let bvh = Bvh::build(&boxes);
        assert_eq!(bvh.node_count(), 1);
    }

    #[test]
    fn test_finds_closest_hit_along_row() {
        let boxes = Boxes::grid(32);
        let bvh = Bvh::build(&boxes);

        // fire down the row from just left of the origin: box 0 must win
        let ray = Ray::new(Vec3::new(-5.0, 0.5, 0.5), Vec3::X);
        let mut its = Intersection::new(ray.direction);
        assert!(bvh.intersect(&boxes, &ray, &mut its, &mut test_sampler()));
        assert!((its.t - 5.0).abs() < 1e-4, "expected t=5, got {}", its.t);
    }

    #[test]
    fn test_closest_matches_linear_scan() {
        let boxes = Boxes::grid(17);
        let bvh = Bvh::build(&boxes);

        for start in [
            Vec3::new(7.3, 0.2, -4.0),
            Vec3::new(-1.0, 0.5, 0.5),
            Vec3::new(33.5, 0.9, 0.1),
        ] {
            for dir in [Vec3::X, -Vec3::X, Vec3::Z, Vec3::new(1.0, 0.0, 1.0).normalize()] {
                let ray = Ray::new(start, dir);

                let mut via_bvh = Intersection::new(ray.direction);
                let hit_bvh = bvh.intersect(&boxes, &ray, &mut via_bvh, &mut test_sampler());

                let mut via_scan = Intersection::new(ray.direction);
                let mut hit_scan = false;
                for i in 0..boxes.len() {
                    hit_scan |=
                        boxes.intersect_one(i, &ray, &mut via_scan, &mut test_sampler());
                }

                assert_eq!(hit_bvh, hit_scan, "hit disagreement for {ray:?}");
                if hit_bvh {
                    assert!(
                        (via_bvh.t - via_scan.t).abs() < 1e-5,
                        "distance disagreement for {ray:?}: {} vs {}",
                        via_bvh.t,
                        via_scan.t
                    );
                }
            }
        }
    }

    #[test]
    fn test_miss_leaves_record_unchanged() {
        let boxes = Boxes::grid(8);
        let bvh = Bvh::build(&boxes);
        let ray = Ray::new(Vec3::new(0.5, 10.0, 0.5), Vec3::Y);
        let mut its = Intersection::new(ray.direction);
        assert!(!bvh.intersect(&boxes, &ray, &mut its, &mut test_sampler()));
        assert_eq!(its.t, f32::INFINITY);
    }

    #[test]
    fn test_ordered_traversal_prunes() {
        let boxes = Boxes::grid(64);
        let bvh = Bvh::build(&boxes);

        // a ray that hits the first box immediately should not need to test
        // anywhere near all 64 primitives
        let ray = Ray::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::X);
        let mut its = Intersection::new(ray.direction);
        assert!(bvh.intersect(&boxes, &ray, &mut its, &mut test_sampler()));
        assert!(
            its.stats.prim_tests < 16,
            "ordered traversal should prune most primitives, tested {}",
            its.stats.prim_tests
        );
    }

    #[test]
    fn test_permutation_is_a_permutation() {
        let boxes = Boxes::grid(23);
        let bvh = Bvh::build(&boxes);
        let mut seen = vec![false; 23];
        for &i in &bvh.primitive_indices {
            assert!(!seen[i as usize], "index {i} appears twice");
            seen[i as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "permutation must cover all primitives");
    }

    #[test]
    fn test_nodes_are_leaf_or_have_two_children() {
        let boxes = Boxes::grid(57);
        let bvh = Bvh::build(&boxes);
        for node in &bvh.nodes {
            if node.is_leaf() {
                let end = node.left_first + node.primitive_count;
                assert!(end as usize <= bvh.primitive_indices.len());
            } else {
                assert!(((node.left_first + 1) as usize) < bvh.nodes.len());
            }
        }
    }
}
