//! The declarative scene description.
//!
//! Scenes are JSON documents deserialized into typed configuration structs,
//! one per object category, then assembled into a [`Scene`]. Unknown fields
//! are rejected during deserialization, so a typo in a scene file fails
//! loudly instead of being silently ignored.

use anyhow::Context;
use luma_core::bsdf::{Bsdf, Dielectric, Diffuse, Principled, RoughConductor, RoughDielectric};
use luma_core::camera::{Camera, FovAxis, Perspective, ThinLens};
use luma_core::emission::{Emission, Lambertian};
use luma_core::lights::{AreaLight, DirectionalLight, EnvironmentMap, PointLight};
use luma_core::sampler::{Halton, Independent, Sampler};
use luma_core::shapes::{Group, Rectangle, Sphere, TriangleMesh};
use luma_core::texture::{BorderMode, Checkerboard, Constant, FilterMode, ImageTexture, Texture};
use luma_core::{Bitmap, Instance, Light, Scene, Shape};
use luma_render::{
    AlbedoIntegrator, BvhPerformance, DirectIntegrator, Integrator, NormalsIntegrator, PathTracer,
};
use luma_math::{Color, Transform, UVec2, Vec2, Vec3};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything needed to run one render job.
pub struct RenderJob {
    pub name: String,
    pub scene: Scene,
    pub sampler: Box<dyn Sampler>,
    pub integrator: Box<dyn Integrator>,
    pub output: PathBuf,
}

impl std::fmt::Debug for RenderJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderJob")
            .field("name", &self.name)
            .field("output", &self.output)
            .finish()
    }
}

/// Loads and assembles a scene description file.
pub fn load(path: &Path) -> anyhow::Result<RenderJob> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not open scene file {}", path.display()))?;
    let file: SceneFile = serde_json::from_str(&text)
        .with_context(|| format!("while parsing {}", path.display()))?;

    let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".into());

    let builder = Builder { base_dir };
    builder.build(file, name)
}

struct Builder {
    base_dir: PathBuf,
}

impl Builder {
    fn build(&self, file: SceneFile, name: String) -> anyhow::Result<RenderJob> {
        let camera = self
            .build_camera(&file.camera)
            .context("while creating the camera")?;

        let mut shapes: Vec<Arc<dyn Shape>> = Vec::new();
        for (index, config) in file.shapes.iter().enumerate() {
            let instance = self
                .build_instance(config)
                .with_context(|| format!("while creating shape #{index}"))?;
            shapes.push(instance);
        }

        let background = match &file.background {
            Some(config) => Some(
                self.build_background(config)
                    .context("while creating the background light")?,
            ),
            None => None,
        };

        let mut lights: Vec<Arc<dyn Light>> = Vec::new();
        for (index, config) in file.lights.iter().enumerate() {
            let light = self
                .build_light(config, lights.len(), &mut shapes)
                .with_context(|| format!("while creating light #{index}"))?;
            lights.push(light);
        }
        if let Some(background) = &background {
            lights.push(background.clone());
        }

        if shapes.is_empty() {
            anyhow::bail!("scene contains no shapes");
        }

        let scene = Scene::new(
            camera,
            shapes,
            background.map(|b| b as Arc<dyn luma_core::BackgroundLight>),
            lights,
        );

        Ok(RenderJob {
            name,
            scene,
            sampler: file.sampler.build(),
            integrator: file.integrator.build(),
            output: self.base_dir.join(&file.output),
        })
    }

    fn build_camera(&self, config: &CameraConfig) -> anyhow::Result<Arc<dyn Camera>> {
        let resolution = UVec2::new(config.width, config.height);
        let transform = build_transform(&config.transform).context("in the camera transform")?;
        let axis = match config.fov_axis {
            FovAxisConfig::X => FovAxis::X,
            FovAxisConfig::Y => FovAxis::Y,
        };
        Ok(match config.kind {
            CameraKind::Perspective => {
                Arc::new(Perspective::new(resolution, transform, config.fov, axis))
            }
            CameraKind::Thinlens {
                aperture_radius,
                focus_distance,
            } => Arc::new(ThinLens::new(
                resolution,
                transform,
                config.fov,
                axis,
                aperture_radius,
                focus_distance,
            )),
        })
    }

    fn build_instance(&self, config: &InstanceConfig) -> anyhow::Result<Arc<Instance>> {
        let shape = self
            .build_shape(&config.shape)
            .context("while creating its shape")?;
        let bsdf = match &config.bsdf {
            Some(bsdf) => Some(self.build_bsdf(bsdf).context("while creating its bsdf")?),
            None => None,
        };
        let emission = match &config.emission {
            Some(emission) => Some(
                self.build_emission(emission)
                    .context("while creating its emission")?,
            ),
            None => None,
        };
        let transform = match &config.transform {
            Some(steps) => Some(build_transform(steps).context("in its transform")?),
            None => None,
        };
        let normal_map = match &config.normal_map {
            Some(texture) => Some(
                self.build_texture(texture)
                    .context("while creating its normal map")?,
            ),
            None => None,
        };
        Ok(Arc::new(Instance::new(
            shape, bsdf, emission, transform, normal_map,
        )))
    }

    fn build_shape(&self, config: &ShapeConfig) -> anyhow::Result<Arc<dyn Shape>> {
        Ok(match config {
            ShapeConfig::Sphere {} => Arc::new(Sphere),
            ShapeConfig::Rectangle {} => Arc::new(Rectangle),
            ShapeConfig::Mesh { filename, smooth } => {
                let path = self.base_dir.join(filename);
                let mesh = TriangleMesh::load_ply(&path, *smooth)
                    .with_context(|| format!("could not load mesh {}", path.display()))?;
                Arc::new(mesh)
            }
            ShapeConfig::Group { children } => {
                let mut built: Vec<Arc<dyn Shape>> = Vec::new();
                for (index, child) in children.iter().enumerate() {
                    let instance = self
                        .build_instance(child)
                        .with_context(|| format!("while creating group child #{index}"))?;
                    built.push(instance);
                }
                Arc::new(Group::new(built))
            }
        })
    }

    fn build_bsdf(&self, config: &BsdfConfig) -> anyhow::Result<Arc<dyn Bsdf>> {
        Ok(match config {
            BsdfConfig::Diffuse { albedo } => Arc::new(Diffuse::new(self.build_texture(albedo)?)),
            BsdfConfig::Dielectric {
                ior,
                reflectance,
                transmittance,
            } => Arc::new(Dielectric::new(
                self.build_texture(ior)?,
                self.build_texture(reflectance)?,
                self.build_texture(transmittance)?,
            )),
            BsdfConfig::Roughconductor {
                reflectance,
                roughness,
            } => Arc::new(RoughConductor::new(
                self.build_texture(reflectance)?,
                self.build_texture(roughness)?,
            )),
            BsdfConfig::Roughdielectric {
                ior,
                reflectance,
                transmittance,
                roughness,
            } => Arc::new(RoughDielectric::new(
                self.build_texture(ior)?,
                self.build_texture(reflectance)?,
                self.build_texture(transmittance)?,
                self.build_texture(roughness)?,
            )),
            BsdfConfig::Principled {
                base_color,
                roughness,
                metallic,
                specular,
            } => Arc::new(Principled::new(
                self.build_texture(base_color)?,
                self.build_texture(roughness)?,
                self.build_texture(metallic)?,
                self.build_texture(specular)?,
            )),
        })
    }

    fn build_emission(&self, config: &EmissionConfig) -> anyhow::Result<Arc<dyn Emission>> {
        Ok(match config {
            EmissionConfig::Lambertian { emission } => {
                Arc::new(Lambertian::new(self.build_texture(emission)?))
            }
        })
    }

    fn build_texture(&self, config: &TextureConfig) -> anyhow::Result<Arc<dyn Texture>> {
        Ok(match config {
            TextureConfig::Shorthand(value) => Arc::new(Constant::new(value.to_color())),
            TextureConfig::Constant { value } => Arc::new(Constant::new(value.to_color())),
            TextureConfig::Checkerboard {
                color0,
                color1,
                scale,
            } => Arc::new(Checkerboard::new(
                color0.to_color(),
                color1.to_color(),
                Vec2::from_array(*scale),
            )),
            TextureConfig::Image {
                filename,
                linear,
                exposure,
                border,
                filter,
            } => {
                let path = self.base_dir.join(filename);
                let bitmap = Bitmap::load(&path, *linear)
                    .with_context(|| format!("could not load image {}", path.display()))?;
                Arc::new(ImageTexture::new(
                    Arc::new(bitmap),
                    *exposure,
                    match border {
                        BorderModeConfig::Clamp => BorderMode::Clamp,
                        BorderModeConfig::Repeat => BorderMode::Repeat,
                    },
                    match filter {
                        FilterModeConfig::Nearest => FilterMode::Nearest,
                        FilterModeConfig::Bilinear => FilterMode::Bilinear,
                    },
                ))
            }
        })
    }

    fn build_background(
        &self,
        config: &BackgroundConfig,
    ) -> anyhow::Result<Arc<EnvironmentMap>> {
        let texture = self.build_texture(&config.texture)?;
        let transform = match &config.transform {
            Some(steps) => Some(build_transform(steps).context("in the background transform")?),
            None => None,
        };
        Ok(Arc::new(EnvironmentMap::new(texture, transform)))
    }

    fn build_light(
        &self,
        config: &LightConfig,
        light_index: usize,
        shapes: &mut Vec<Arc<dyn Shape>>,
    ) -> anyhow::Result<Arc<dyn Light>> {
        Ok(match config {
            LightConfig::Point { position, power } => Arc::new(PointLight::new(
                Vec3::from_array(*position),
                power.to_color(),
            )),
            LightConfig::Directional {
                direction,
                intensity,
            } => Arc::new(DirectionalLight::new(
                Vec3::from_array(*direction),
                intensity.to_color(),
            )),
            LightConfig::Area { instance, visible } => {
                let instance = self
                    .build_instance(instance)
                    .context("while creating the area light instance")?;
                instance
                    .set_light(light_index)
                    .context("while registering the area light")?;
                if *visible {
                    shapes.push(instance.clone());
                }
                Arc::new(AreaLight::new(instance))
            }
        })
    }
}

/// Composes a transform from a list of steps, applied in order.
fn build_transform(steps: &[TransformStep]) -> anyhow::Result<Transform> {
    let mut transform = Transform::identity();
    for step in steps {
        match step {
            TransformStep::Translate(offset) => transform.translate(Vec3::from_array(*offset)),
            TransformStep::Scale(factors) => transform
                .scale(factors.to_vector())
                .context("in a scale step")?,
            TransformStep::Rotate { axis, angle } => {
                transform.rotate(Vec3::from_array(*axis), angle.to_radians())
            }
            TransformStep::Lookat { origin, target, up } => transform
                .lookat(
                    Vec3::from_array(*origin),
                    Vec3::from_array(*target),
                    Vec3::from_array(*up),
                )
                .context("in a lookat step")?,
            TransformStep::Matrix(values) => {
                // row-major input, as written in scene files
                let matrix = luma_math::Mat4::from_cols_array(values).transpose();
                transform.matrix(matrix).context("in a matrix step")?
            }
        }
    }
    Ok(transform)
}

// ---------------------------------------------------------------------------
// serde configuration structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    camera: CameraConfig,
    #[serde(default)]
    sampler: SamplerConfig,
    #[serde(default)]
    integrator: IntegratorConfig,
    shapes: Vec<InstanceConfig>,
    #[serde(default)]
    lights: Vec<LightConfig>,
    #[serde(default)]
    background: Option<BackgroundConfig>,
    #[serde(default = "default_output")]
    output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from("render.exr")
}

#[derive(Deserialize)]
struct CameraConfig {
    width: u32,
    height: u32,
    fov: f32,
    #[serde(default)]
    fov_axis: FovAxisConfig,
    #[serde(default)]
    transform: Vec<TransformStep>,
    #[serde(flatten)]
    kind: CameraKind,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum CameraKind {
    Perspective,
    Thinlens {
        aperture_radius: f32,
        focus_distance: f32,
    },
}

#[derive(Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum FovAxisConfig {
    #[default]
    X,
    Y,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum SamplerConfig {
    Independent {
        #[serde(default = "default_sample_count")]
        count: u32,
        #[serde(default = "default_seed")]
        seed: u64,
    },
    Halton {
        #[serde(default = "default_sample_count")]
        count: u32,
    },
}

fn default_sample_count() -> u32 {
    16
}

fn default_seed() -> u64 {
    1337
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::Independent {
            count: default_sample_count(),
            seed: default_seed(),
        }
    }
}

impl SamplerConfig {
    fn build(&self) -> Box<dyn Sampler> {
        match self {
            Self::Independent { count, seed } => Box::new(Independent::new(*count, *seed)),
            Self::Halton { count } => Box::new(Halton::new(*count)),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum IntegratorConfig {
    Normals {
        #[serde(default = "default_true")]
        remap: bool,
    },
    Albedo,
    Bvh {
        #[serde(default = "default_unit")]
        unit: f32,
    },
    Direct,
    Pathtracer {
        #[serde(default = "default_depth")]
        depth: u32,
    },
}

fn default_true() -> bool {
    true
}

fn default_unit() -> f32 {
    1.0
}

fn default_depth() -> u32 {
    2
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self::Pathtracer {
            depth: default_depth(),
        }
    }
}

impl IntegratorConfig {
    fn build(&self) -> Box<dyn Integrator> {
        match self {
            Self::Normals { remap } => Box::new(NormalsIntegrator::new(*remap)),
            Self::Albedo => Box::new(AlbedoIntegrator),
            Self::Bvh { unit } => Box::new(BvhPerformance::new(*unit)),
            Self::Direct => Box::new(DirectIntegrator),
            Self::Pathtracer { depth } => Box::new(PathTracer::new(*depth)),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct InstanceConfig {
    shape: ShapeConfig,
    #[serde(default)]
    bsdf: Option<BsdfConfig>,
    #[serde(default)]
    emission: Option<EmissionConfig>,
    #[serde(default)]
    transform: Option<Vec<TransformStep>>,
    #[serde(default)]
    normal_map: Option<TextureConfig>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ShapeConfig {
    Sphere {},
    Rectangle {},
    Mesh {
        filename: PathBuf,
        #[serde(default = "default_true")]
        smooth: bool,
    },
    Group {
        children: Vec<InstanceConfig>,
    },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum BsdfConfig {
    Diffuse {
        albedo: TextureConfig,
    },
    Dielectric {
        ior: TextureConfig,
        reflectance: TextureConfig,
        transmittance: TextureConfig,
    },
    Roughconductor {
        reflectance: TextureConfig,
        roughness: TextureConfig,
    },
    Roughdielectric {
        ior: TextureConfig,
        reflectance: TextureConfig,
        transmittance: TextureConfig,
        roughness: TextureConfig,
    },
    Principled {
        base_color: TextureConfig,
        roughness: TextureConfig,
        metallic: TextureConfig,
        specular: TextureConfig,
    },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum EmissionConfig {
    Lambertian { emission: TextureConfig },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextureConfig {
    /// A bare number or color array is shorthand for a constant texture.
    Shorthand(ColorValue),
    Constant {
        value: ColorValue,
    },
    Checkerboard {
        color0: ColorValue,
        color1: ColorValue,
        scale: [f32; 2],
    },
    Image {
        filename: PathBuf,
        #[serde(default)]
        linear: bool,
        #[serde(default = "default_exposure")]
        exposure: f32,
        #[serde(default)]
        border: BorderModeConfig,
        #[serde(default)]
        filter: FilterModeConfig,
    },
}

fn default_exposure() -> f32 {
    1.0
}

#[derive(Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum BorderModeConfig {
    Clamp,
    #[default]
    Repeat,
}

#[derive(Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum FilterModeConfig {
    Nearest,
    #[default]
    Bilinear,
}

/// A color given either as a single gray value or as an RGB triple.
#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum ColorValue {
    Scalar(f32),
    Rgb([f32; 3]),
}

impl ColorValue {
    fn to_color(self) -> Color {
        match self {
            Self::Scalar(v) => Color::splat(v),
            Self::Rgb(rgb) => Color::from_array(rgb),
        }
    }
}

/// A scale factor given either uniformly or per axis.
#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum ScaleValue {
    Uniform(f32),
    PerAxis([f32; 3]),
}

impl ScaleValue {
    fn to_vector(self) -> Vec3 {
        match self {
            Self::Uniform(v) => Vec3::splat(v),
            Self::PerAxis(v) => Vec3::from_array(v),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
enum TransformStep {
    Translate([f32; 3]),
    Scale(ScaleValue),
    Rotate {
        axis: [f32; 3],
        /// Rotation angle in degrees.
        angle: f32,
    },
    Lookat {
        origin: [f32; 3],
        target: [f32; 3],
        up: [f32; 3],
    },
    Matrix([f32; 16]),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BackgroundConfig {
    texture: TextureConfig,
    #[serde(default)]
    transform: Option<Vec<TransformStep>>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum LightConfig {
    Point {
        position: [f32; 3],
        power: ColorValue,
    },
    Directional {
        direction: [f32; 3],
        intensity: ColorValue,
    },
    Area {
        instance: Box<InstanceConfig>,
        #[serde(default)]
        visible: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_scene(name: &str, json: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        path
    }

    const MINIMAL: &str = r#"{
        "camera": {
            "type": "perspective",
            "width": 32, "height": 32, "fov": 45,
            "transform": [
                {"lookat": {"origin": [0,0,-3], "target": [0,0,0], "up": [0,1,0]}}
            ]
        },
        "sampler": {"type": "independent", "count": 4},
        "integrator": {"type": "normals"},
        "shapes": [
            {"shape": {"type": "sphere"}, "bsdf": {"type": "diffuse", "albedo": 0.5}}
        ],
        "lights": [
            {"type": "point", "position": [0, 2, 0], "power": [10, 10, 10]}
        ]
    }"#;

    #[test]
    fn test_minimal_scene_builds() {
        let path = write_scene("luma_scene_minimal.json", MINIMAL);
        let job = load(&path).expect("scene builds");
        assert_eq!(job.scene.camera().resolution(), UVec2::new(32, 32));
        assert_eq!(job.sampler.samples_per_pixel(), 4);
        assert!(job.scene.has_lights());
        assert_eq!(job.output.file_name().unwrap(), "render.exr");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let bad = MINIMAL.replace("\"sampler\"", "\"smapler\"");
        let path = write_scene("luma_scene_typo.json", &bad);
        let error = load(&path).expect_err("typo must fail");
        assert!(format!("{error:#}").contains("while parsing"));
    }

    #[test]
    fn test_missing_mesh_reports_context() {
        let scene = r#"{
            "camera": {"type": "perspective", "width": 8, "height": 8, "fov": 45},
            "shapes": [
                {"shape": {"type": "mesh", "filename": "does_not_exist.ply"}}
            ]
        }"#;
        let path = write_scene("luma_scene_missing_mesh.json", scene);
        let error = load(&path).expect_err("missing mesh must fail");
        let message = format!("{error:#}");
        assert!(message.contains("shape #0"), "message: {message}");
        assert!(message.contains("does_not_exist.ply"), "message: {message}");
    }

    #[test]
    fn test_area_light_visible_instance_shared() {
        let scene = r#"{
            "camera": {"type": "perspective", "width": 8, "height": 8, "fov": 45},
            "shapes": [
                {"shape": {"type": "sphere"}}
            ],
            "lights": [
                {"type": "area", "visible": true, "instance": {
                    "shape": {"type": "rectangle"},
                    "emission": {"type": "lambertian", "emission": [5, 5, 5]},
                    "transform": [{"translate": [0, 3, 0]}]
                }}
            ]
        }"#;
        let path = write_scene("luma_scene_area.json", scene);
        let job = load(&path).expect("scene builds");
        assert!(job.scene.has_lights());
    }

    #[test]
    fn test_double_light_registration_fails() {
        // two area lights around the same instance are not expressible in
        // the file format (each light owns its instance), so this guards the
        // builder-level invariant instead
        let instance = Arc::new(Instance::new(Arc::new(Rectangle), None, None, None, None));
        instance.set_light(0).unwrap();
        assert!(instance.set_light(1).is_err());
    }

    #[test]
    fn test_thinlens_and_halton_parse() {
        let scene = r#"{
            "camera": {
                "type": "thinlens", "width": 16, "height": 8, "fov": 60,
                "fov_axis": "y", "aperture_radius": 0.2, "focus_distance": 5
            },
            "sampler": {"type": "halton", "count": 9},
            "integrator": {"type": "pathtracer", "depth": 6},
            "shapes": [{"shape": {"type": "sphere"}}],
            "output": "out/test.exr"
        }"#;
        let path = write_scene("luma_scene_thinlens.json", scene);
        let job = load(&path).expect("scene builds");
        assert_eq!(job.sampler.samples_per_pixel(), 9);
        assert!(job.output.ends_with("out/test.exr"));
    }
}
