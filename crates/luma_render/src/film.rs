//! The accumulation target of a render.

use luma_math::{Color, UVec2};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FilmError {
    #[error("could not save image to {path}: {source}")]
    Save {
        path: String,
        source: image::ImageError,
    },
}

/// A grid of linear RGB pixels with 32-bit float channels.
pub struct Film {
    resolution: UVec2,
    data: Vec<Color>,
}

impl Film {
    /// Creates a black film of the given resolution.
    pub fn new(resolution: UVec2) -> Self {
        Self {
            resolution,
            data: vec![Color::ZERO; (resolution.x * resolution.y) as usize],
        }
    }

    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    pub fn get(&self, pixel: UVec2) -> Color {
        self.data[(pixel.y * self.resolution.x + pixel.x) as usize]
    }

    /// Stores a pixel. Non-finite radiance is a programmer error in the
    /// integrators, not bad input data, so it aborts right here.
    pub fn set(&mut self, pixel: UVec2, color: Color) {
        assert!(
            color.is_finite(),
            "non-finite radiance written to pixel {pixel}"
        );
        self.data[(pixel.y * self.resolution.x + pixel.x) as usize] = color;
    }

    /// Raw pixel access for encoders and the preview streamer.
    pub fn data(&self) -> &[Color] {
        &self.data
    }

    /// Saves the film as 32-bit float EXR, three channels.
    pub fn save_exr(&self, path: &Path) -> Result<(), FilmError> {
        let mut image = image::Rgb32FImage::new(self.resolution.x, self.resolution.y);
        for y in 0..self.resolution.y {
            for x in 0..self.resolution.x {
                let color = self.get(UVec2::new(x, y));
                image.put_pixel(x, y, image::Rgb([color.x, color.y, color.z]));
            }
        }
        image::DynamicImage::ImageRgb32F(image)
            .save(path)
            .map_err(|source| FilmError::Save {
                path: path.display().to_string(),
                source,
            })
    }
}
