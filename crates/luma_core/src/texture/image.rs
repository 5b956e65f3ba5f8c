use super::Texture;
use crate::bitmap::Bitmap;
use luma_math::{Color, Vec2};
use std::sync::Arc;

/// How texture coordinates outside the unit square are handled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BorderMode {
    Clamp,
    Repeat,
}

/// How the image is filtered between texels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Bilinear,
}

/// A texture backed by a bitmap.
pub struct ImageTexture {
    image: Arc<Bitmap>,
    exposure: f32,
    border: BorderMode,
    filter: FilterMode,
}

impl ImageTexture {
    pub fn new(image: Arc<Bitmap>, exposure: f32, border: BorderMode, filter: FilterMode) -> Self {
        Self {
            image,
            exposure,
            border,
            filter,
        }
    }

    fn wrap(&self, uv: Vec2) -> Vec2 {
        match self.border {
            BorderMode::Clamp => uv.clamp(Vec2::ZERO, Vec2::ONE),
            BorderMode::Repeat => uv - uv.floor(),
        }
    }
}

impl Texture for ImageTexture {
    fn evaluate(&self, uv: Vec2) -> Color {
        let uv = self.wrap(uv);
        let res = self.image.resolution();
        let value = match self.filter {
            FilterMode::Nearest => {
                let x = (uv.x * res.x as f32) as i64;
                let y = (uv.y * res.y as f32) as i64;
                self.image.get(x, y)
            }
            FilterMode::Bilinear => {
                // texel centers sit at half-integer coordinates
                let x = uv.x * res.x as f32 - 0.5;
                let y = uv.y * res.y as f32 - 0.5;
                let x0 = x.floor();
                let y0 = y.floor();
                let fx = x - x0;
                let fy = y - y0;
                let (x0, y0) = (x0 as i64, y0 as i64);

                let c00 = self.image.get(x0, y0);
                let c10 = self.image.get(x0 + 1, y0);
                let c01 = self.image.get(x0, y0 + 1);
                let c11 = self.image.get(x0 + 1, y0 + 1);

                c00 * (1.0 - fx) * (1.0 - fy)
                    + c10 * fx * (1.0 - fy)
                    + c01 * (1.0 - fx) * fy
                    + c11 * fx * fy
            }
        };
        value * self.exposure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luma_math::UVec2;

    fn two_by_two() -> Arc<Bitmap> {
        let mut bitmap = Bitmap::new(UVec2::new(2, 2));
        bitmap.set(0, 0, Color::new(1.0, 0.0, 0.0));
        bitmap.set(1, 0, Color::new(0.0, 1.0, 0.0));
        bitmap.set(0, 1, Color::new(0.0, 0.0, 1.0));
        bitmap.set(1, 1, Color::new(1.0, 1.0, 1.0));
        Arc::new(bitmap)
    }

    #[test]
    fn test_nearest_picks_texel() {
        let tex = ImageTexture::new(two_by_two(), 1.0, BorderMode::Clamp, FilterMode::Nearest);
        assert_eq!(tex.evaluate(Vec2::new(0.25, 0.25)), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.evaluate(Vec2::new(0.75, 0.25)), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.evaluate(Vec2::new(0.25, 0.75)), Color::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_bilinear_blends_at_center() {
        let tex = ImageTexture::new(two_by_two(), 1.0, BorderMode::Clamp, FilterMode::Bilinear);
        let center = tex.evaluate(Vec2::splat(0.5));
        // equal mix of all four texels
        assert!((center - Color::new(0.5, 0.5, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_repeat_border_wraps() {
        let tex = ImageTexture::new(two_by_two(), 1.0, BorderMode::Repeat, FilterMode::Nearest);
        assert_eq!(
            tex.evaluate(Vec2::new(1.25, 0.25)),
            tex.evaluate(Vec2::new(0.25, 0.25))
        );
        assert_eq!(
            tex.evaluate(Vec2::new(-0.75, 0.25)),
            tex.evaluate(Vec2::new(0.25, 0.25))
        );
    }

    #[test]
    fn test_clamp_border_extends_edges() {
        let tex = ImageTexture::new(two_by_two(), 1.0, BorderMode::Clamp, FilterMode::Nearest);
        assert_eq!(
            tex.evaluate(Vec2::new(5.0, 0.25)),
            tex.evaluate(Vec2::new(0.9, 0.25))
        );
    }

    #[test]
    fn test_exposure_scales_output() {
        let tex = ImageTexture::new(two_by_two(), 2.0, BorderMode::Clamp, FilterMode::Nearest);
        assert_eq!(tex.evaluate(Vec2::new(0.25, 0.25)), Color::new(2.0, 0.0, 0.0));
    }
}
