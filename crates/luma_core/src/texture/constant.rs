use super::Texture;
use luma_math::{Color, Vec2};

/// A texture with the same color everywhere.
pub struct Constant {
    value: Color,
}

impl Constant {
    pub fn new(value: Color) -> Self {
        Self { value }
    }
}

impl Texture for Constant {
    fn evaluate(&self, _uv: Vec2) -> Color {
        self.value
    }
}
