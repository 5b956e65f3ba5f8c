//! Float RGB pixel storage shared by image textures and environment maps.

use luma_math::{Color, UVec2};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum BitmapError {
    #[error("could not open image {path}: {source}")]
    Open {
        path: String,
        source: image::ImageError,
    },
    #[error("image {0} has zero resolution")]
    ZeroResolution(String),
}

/// An image in linear RGB with 32-bit float channels.
pub struct Bitmap {
    resolution: UVec2,
    data: Vec<Color>,
}

impl Bitmap {
    /// Creates a black bitmap of the given resolution.
    pub fn new(resolution: UVec2) -> Self {
        Self {
            resolution,
            data: vec![Color::ZERO; (resolution.x * resolution.y) as usize],
        }
    }

    /// Loads an image file.
    ///
    /// HDR formats (EXR, Radiance) are already linear. LDR files are decoded
    /// with an inverse sRGB transform (gamma 2.2) unless `linear` says the
    /// data should be taken as-is.
    pub fn load(path: &Path, linear: bool) -> Result<Self, BitmapError> {
        let image = image::open(path).map_err(|source| BitmapError::Open {
            path: path.display().to_string(),
            source,
        })?;

        let hdr_source = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("exr") | Some("hdr")
        );

        let rgb = image.to_rgb32f();
        let resolution = UVec2::new(rgb.width(), rgb.height());
        if resolution.x == 0 || resolution.y == 0 {
            return Err(BitmapError::ZeroResolution(path.display().to_string()));
        }

        let decode = |v: f32| {
            if hdr_source || linear {
                v
            } else {
                v.powf(2.2)
            }
        };
        let data = rgb
            .pixels()
            .map(|p| Color::new(decode(p.0[0]), decode(p.0[1]), decode(p.0[2])))
            .collect();

        log::debug!(
            "loaded image {} ({}x{})",
            path.display(),
            resolution.x,
            resolution.y
        );
        Ok(Self { resolution, data })
    }

    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    /// The color at a pixel coordinate. Coordinates are clamped to the edge.
    pub fn get(&self, x: i64, y: i64) -> Color {
        let x = x.clamp(0, self.resolution.x as i64 - 1) as u32;
        let y = y.clamp(0, self.resolution.y as i64 - 1) as u32;
        self.data[(y * self.resolution.x + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.data[(y * self.resolution.x + x) as usize] = color;
    }
}
