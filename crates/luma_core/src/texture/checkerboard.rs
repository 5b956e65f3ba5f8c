use super::Texture;
use luma_math::{Color, Vec2};

/// A procedural checkerboard of two colors.
pub struct Checkerboard {
    color0: Color,
    color1: Color,
    /// Number of tile pairs along each axis of the unit square.
    scale: Vec2,
}

impl Checkerboard {
    pub fn new(color0: Color, color1: Color, scale: Vec2) -> Self {
        Self {
            color0,
            color1,
            scale,
        }
    }

    fn is_odd_tile(x: f32) -> bool {
        (x as i32) % 2 != 0
    }
}

impl Texture for Checkerboard {
    fn evaluate(&self, uv: Vec2) -> Color {
        if Self::is_odd_tile(uv.x * self.scale.x) == Self::is_odd_tile(uv.y * self.scale.y) {
            self.color0
        } else {
            self.color1
        }
    }
}
