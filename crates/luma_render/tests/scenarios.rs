//! End-to-end scenes exercising the whole pipeline: camera, BVH, materials,
//! lights, sampler and the parallel sample loop.

use luma_core::bsdf::{Dielectric, Diffuse};
use luma_core::camera::{Camera, FovAxis, Perspective};
use luma_core::sampler::{Halton, Independent, Sampler};
use luma_core::shapes::{MeshData, Rectangle, Sphere, TriangleMesh};
use luma_core::texture::{Checkerboard, Constant};
use luma_core::{Instance, Light, Scene};
use luma_render::{
    render, render_simple, DirectIntegrator, NormalsIntegrator, PathTracer, RenderSettings,
};
use luma_math::{Color, Ray, Transform, UVec2, Vec2, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

fn camera_at(origin: Vec3, target: Vec3, resolution: UVec2, fov: f32) -> Arc<Perspective> {
    let mut transform = Transform::identity();
    transform.lookat(origin, target, Vec3::Y).unwrap();
    Arc::new(Perspective::new(resolution, transform, fov, FovAxis::X))
}

fn plain_instance(shape: Arc<dyn luma_core::Shape>) -> Arc<Instance> {
    Arc::new(Instance::new(shape, None, None, None, None))
}

#[test]
fn normals_sphere_center_pixel() {
    // unit sphere seen from (0,0,-3): the surface facing the camera has
    // normal (0,0,-1), which remaps to (0.5, 0.5, 0)
    let resolution = UVec2::new(64, 64);
    let scene = Scene::new(
        camera_at(Vec3::new(0.0, 0.0, -3.0), Vec3::ZERO, resolution, 45.0),
        vec![plain_instance(Arc::new(Sphere))],
        None,
        vec![],
    );

    let film = render_simple(
        &scene,
        &NormalsIntegrator::default(),
        &Independent::new(16, 1337),
    );

    let center = film.get(UVec2::new(32, 32));
    assert!(
        (center - Color::new(0.5, 0.5, 0.0)).length() < 0.02,
        "center pixel should be the remapped normal, got {center}"
    );

    // the whole field must be finite and smooth-ish: neighbors differ little
    let neighbor = film.get(UVec2::new(33, 32));
    assert!((center - neighbor).length() < 0.1);
}

#[test]
fn direct_point_light_radiance() {
    // diffuse rectangle at z=0, point light one unit in front of its center
    // on the camera side: L = albedo/pi * cos(theta) * power/(4 pi r^2)
    let resolution = UVec2::new(32, 32);
    let albedo = 0.5;
    let power = Color::splat(10.0);

    let material = Arc::new(Diffuse::new(Arc::new(Constant::new(Color::splat(albedo)))));
    let rectangle = Arc::new(Instance::new(
        Arc::new(Rectangle),
        Some(material),
        None,
        None,
        None,
    ));
    let light = Arc::new(luma_core::lights::PointLight::new(
        Vec3::new(0.0, 0.0, -1.0),
        power,
    ));

    let scene = Scene::new(
        camera_at(Vec3::new(0.0, 0.0, -3.0), Vec3::ZERO, resolution, 30.0),
        vec![rectangle],
        None,
        vec![light as Arc<dyn Light>],
    );

    let film = render_simple(
        &scene,
        &DirectIntegrator::default(),
        &Independent::new(64, 1337),
    );

    let expected = albedo / PI * 10.0 / (4.0 * PI);
    let center = film.get(UVec2::new(16, 16));
    assert!(
        (center.x - expected).abs() < 0.01,
        "center radiance {} should be close to {expected}",
        center.x
    );
}

#[test]
fn instanced_scale_covers_larger_area() {
    // a triangle (0,0,0)-(1,0,0)-(0,1,0) under scale(2) covers [0,2]^2;
    // the ray from (0.5, 0.5, -1) along +z must hit at t = 1
    let mesh = TriangleMesh::new(
        MeshData {
            triangles: vec![[0, 1, 2]],
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: None,
            texcoords: None,
        },
        false,
    );
    let mut transform = Transform::identity();
    transform.scale(Vec3::splat(2.0)).unwrap();
    let instance = Arc::new(Instance::new(
        Arc::new(mesh),
        None,
        None,
        Some(transform),
        None,
    ));

    let scene = Scene::new(
        camera_at(Vec3::new(0.0, 0.0, -3.0), Vec3::ZERO, UVec2::new(8, 8), 45.0),
        vec![instance],
        None,
        vec![],
    );

    let mut rng = Independent::new(1, 1);
    let ray = Ray::new(Vec3::new(0.5, 0.5, -1.0), Vec3::Z);
    let its = scene.intersect(&ray, &mut rng);
    assert!(its.is_hit());
    assert!((its.t - 1.0).abs() < 1e-4, "expected t=1, got {}", its.t);

    // the unscaled triangle would not cover this point
    let ray = Ray::new(Vec3::new(1.5, 0.3, -1.0), Vec3::Z);
    let its = scene.intersect(&ray, &mut rng);
    assert!(its.is_hit(), "scaled triangle covers x=1.5");
}

#[test]
fn bvh_mesh_traversal_cost_is_logarithmic() {
    // a 32x32 quad grid (2048 triangles) over [-1,1]^2; the average number
    // of primitive tests per hit must stay within the log bound
    let n = 32;
    let mut positions = Vec::new();
    let mut triangles = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            positions.push(Vec3::new(
                2.0 * i as f32 / n as f32 - 1.0,
                2.0 * j as f32 / n as f32 - 1.0,
                0.0,
            ));
        }
    }
    let index = |i: u32, j: u32| j * (n + 1) + i;
    for j in 0..n {
        for i in 0..n {
            triangles.push([index(i, j), index(i + 1, j), index(i, j + 1)]);
            triangles.push([index(i + 1, j), index(i + 1, j + 1), index(i, j + 1)]);
        }
    }
    let triangle_count = triangles.len() as f32;

    let mesh = TriangleMesh::new(
        MeshData {
            triangles,
            positions,
            normals: None,
            texcoords: None,
        },
        false,
    );
    let scene = Scene::new(
        camera_at(Vec3::new(0.0, 0.0, -3.0), Vec3::ZERO, UVec2::new(64, 64), 40.0),
        vec![plain_instance(Arc::new(mesh))],
        None,
        vec![],
    );

    let mut rng = Independent::new(1, 1);
    let mut total_prim_tests = 0u64;
    let mut hits = 0u64;
    for y in 0..64 {
        for x in 0..64 {
            rng.seed_pixel(UVec2::new(x, y), 0);
            let sample = scene.camera().sample(UVec2::new(x, y), &mut rng);
            let its = scene.intersect(&sample.ray, &mut rng);
            if its.is_hit() {
                total_prim_tests += its.stats.prim_tests as u64;
                hits += 1;
            }
        }
    }
    assert!(hits > 0);
    let average = total_prim_tests as f32 / hits as f32;
    let bound = 8.0 * triangle_count.log2();
    assert!(
        average <= bound,
        "average primitive tests {average} exceeds 8*log2(n) = {bound}"
    );
}

#[test]
fn dielectric_sphere_refracts_backdrop() {
    // a glass ball in front of a red/blue checkerboard: the straight-through
    // center ray is not bent, so the center pixel keeps the center color
    let resolution = UVec2::new(32, 32);

    let one = |v: f32| Arc::new(Constant::new(Color::splat(v)));
    let glass = Arc::new(Dielectric::new(one(1.5), one(1.0), one(1.0)));
    let ball = Arc::new(Instance::new(Arc::new(Sphere), Some(glass), None, None, None));

    let checker = Arc::new(Checkerboard::new(
        Color::new(1.0, 0.0, 0.0),
        Color::new(0.0, 0.0, 1.0),
        Vec2::splat(2.0),
    ));
    let backdrop_material = Arc::new(Diffuse::new(checker.clone()));
    let mut backdrop_transform = Transform::identity();
    backdrop_transform.scale(Vec3::splat(4.0)).unwrap();
    // turn the rectangle around so its emitting side faces the camera
    backdrop_transform.rotate(Vec3::Y, PI);
    backdrop_transform.translate(Vec3::new(0.0, 0.0, 3.0));
    let backdrop = Arc::new(Instance::new(
        Arc::new(Rectangle),
        Some(backdrop_material),
        Some(Arc::new(luma_core::emission::Lambertian::new(checker))),
        Some(backdrop_transform),
        None,
    ));

    let scene = Scene::new(
        camera_at(Vec3::new(0.0, 0.0, -4.0), Vec3::ZERO, resolution, 40.0),
        vec![ball, backdrop],
        None,
        vec![],
    );

    let film = render(
        &scene,
        &PathTracer::new(8),
        &Independent::new(128, 1337),
        RenderSettings::default(),
        None,
    );

    // center of the checkerboard is color0 (red); through the glass the
    // center pixel must stay predominantly red
    let center = film.get(UVec2::new(16, 16));
    assert!(center.is_finite());
    assert!(
        center.x > center.z,
        "center pixel should be red-dominated, got {center}"
    );
    assert!(center.x > 0.2, "glass should transmit most energy, got {center}");
}

#[test]
fn halton_sequence_matches_radical_inverse_with_mask() {
    // pixel (7,11), sample 0: the sequence is the radical inverse in bases
    // 2, 3, 5, 7, ... rotated by the pixel's PCG32 mask
    fn radical_inverse(mut i: u64, base: u64) -> f64 {
        let mut result = 0.0;
        let mut f = 1.0 / base as f64;
        while i > 0 {
            result += f * (i % base) as f64;
            i /= base;
            f /= base as f64;
        }
        result
    }

    let pixel = UVec2::new(7, 11);
    let mut pcg = luma_core::sampler::Pcg32::default();
    pcg.seed(1337, ((pixel.x as u64) << 32) ^ pixel.y as u64);
    let mask = pcg.next_f32();

    let mut halton = Halton::new(1);
    halton.seed_pixel(pixel, 0);
    for base in [2u64, 3, 5, 7, 11, 13] {
        let mut expected = radical_inverse(0, base) as f32 + mask;
        if expected >= 1.0 {
            expected -= 1.0;
        }
        let actual = halton.next();
        assert!(
            (actual - expected).abs() < 1e-6,
            "base {base}: {actual} vs {expected}"
        );
    }
}

#[test]
fn identical_seeds_render_identical_images() {
    let resolution = UVec2::new(24, 24);
    let material = Arc::new(Diffuse::new(Arc::new(Constant::new(Color::splat(0.7)))));
    let scene = Scene::new(
        camera_at(Vec3::new(0.0, 0.0, -3.0), Vec3::ZERO, resolution, 45.0),
        vec![Arc::new(Instance::new(
            Arc::new(Sphere),
            Some(material),
            None,
            None,
            None,
        ))],
        None,
        vec![Arc::new(luma_core::lights::PointLight::new(
            Vec3::new(2.0, 2.0, -2.0),
            Color::splat(30.0),
        )) as Arc<dyn Light>],
    );

    let integrator = PathTracer::new(4);
    let sampler = Independent::new(8, 42);
    let first = render_simple(&scene, &integrator, &sampler);
    let second = render_simple(&scene, &integrator, &sampler);

    for y in 0..resolution.y {
        for x in 0..resolution.x {
            let pixel = UVec2::new(x, y);
            assert_eq!(first.get(pixel), second.get(pixel), "pixel {pixel}");
        }
    }
}
