use crate::accel::{Bvh, BvhPrimitives};
use crate::sampler::Sampler;
use crate::shape::{AreaSample, Intersection, Shape};
use luma_math::{Aabb, Ray, Vec3};
use std::sync::Arc;

/// The union of an arbitrary number of child shapes.
///
/// Children are traversed through a BVH, so a group is also the scene-level
/// acceleration structure over instances (which may themselves contain other
/// groups).
pub struct Group {
    children: Vec<Arc<dyn Shape>>,
    bvh: Bvh,
}

impl Group {
    pub fn new(children: Vec<Arc<dyn Shape>>) -> Self {
        let mut group = Self {
            children,
            bvh: Bvh::empty(),
        };
        group.bvh = Bvh::build(&group);
        group
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl BvhPrimitives for Group {
    fn len(&self) -> usize {
        self.children.len()
    }

    fn bounds_of(&self, index: usize) -> Aabb {
        self.children[index].bounds()
    }

    fn centroid_of(&self, index: usize) -> Vec3 {
        self.children[index].centroid()
    }

    fn intersect_one<'a>(
        &'a self,
        index: usize,
        ray: &Ray,
        its: &mut Intersection<'a>,
        rng: &mut dyn Sampler,
    ) -> bool {
        self.children[index].intersect(ray, its, rng)
    }
}

impl Shape for Group {
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

    fn sample_area(&self, rng: &mut dyn Sampler) -> AreaSample {
        let index =
            ((rng.next() * self.children.len() as f32) as usize).min(self.children.len() - 1);
        let mut sample = self.children[index].sample_area(rng);
        sample.pdf /= self.children.len() as f32;
        sample
    }

    fn mark_visible(&self) {
        for child in &self.children {
            child.mark_visible();
        }
    }
}
