//! Spatially varying material properties.

mod checkerboard;
mod constant;
mod image;

pub use checkerboard::Checkerboard;
pub use constant::Constant;
pub use image::{BorderMode, FilterMode, ImageTexture};

use luma_math::{Color, Vec2};

/// A spatially varying color (images, procedural patterns, plain constants).
///
/// Texture coordinates usually lie in the unit square, but values outside it
/// are allowed and handled by each implementation's border behavior.
pub trait Texture: Send + Sync {
    /// The color at a given texture coordinate.
    fn evaluate(&self, uv: Vec2) -> Color;

    /// A scalar value at a given texture coordinate.
    ///
    /// Scalar material parameters (roughness, IOR) are typically authored as
    /// grayscale images, so the red channel stands in for the value.
    fn scalar(&self, uv: Vec2) -> f32 {
        self.evaluate(uv).x
    }
}
