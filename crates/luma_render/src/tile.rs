//! Work items of the parallel renderer.

use luma_math::UVec2;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// A rectangular region of the image, rendered end-to-end by one worker.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Iterates the pixels of the tile in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = UVec2> + '_ {
        let tile = *self;
        (tile.y..tile.y + tile.height)
            .flat_map(move |y| (tile.x..tile.x + tile.width).map(move |x| UVec2::new(x, y)))
    }
}

/// Cuts the image into tiles ordered center-out.
///
/// Rendering the middle of the image first gives the earliest feedback on
/// whether a render looks right, the same pattern production renderers use.
pub fn generate_tiles(resolution: UVec2, tile_size: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let mut y = 0;
    while y < resolution.y {
        let mut x = 0;
        while x < resolution.x {
            tiles.push(Tile {
                x,
                y,
                width: tile_size.min(resolution.x - x),
                height: tile_size.min(resolution.y - y),
            });
            x += tile_size;
        }
        y += tile_size;
    }

    // sort by distance of the tile center to the image center
    let center = resolution.as_vec2() / 2.0;
    tiles.sort_by(|a, b| {
        let da = (luma_math::Vec2::new(a.x as f32 + a.width as f32 / 2.0, a.y as f32 + a.height as f32 / 2.0) - center).length_squared();
        let db = (luma_math::Vec2::new(b.x as f32 + b.width as f32 / 2.0, b.y as f32 + b.height as f32 / 2.0) - center).length_squared();
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });

    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_cover_image_exactly() {
        let tiles = generate_tiles(UVec2::new(128, 128), 64);
        assert_eq!(tiles.len(), 4);
        let total: u32 = tiles.iter().map(Tile::pixel_count).sum();
        assert_eq!(total, 128 * 128);
    }

    #[test]
    fn test_partial_tiles_at_edges() {
        let tiles = generate_tiles(UVec2::new(100, 70), 64);
        assert_eq!(tiles.len(), 4);
        let total: u32 = tiles.iter().map(Tile::pixel_count).sum();
        assert_eq!(total, 100 * 70);
    }

    #[test]
    fn test_center_tile_comes_first() {
        let tiles = generate_tiles(UVec2::new(192, 192), 64);
        assert_eq!(tiles.len(), 9);
        assert_eq!((tiles[0].x, tiles[0].y), (64, 64));
    }

    #[test]
    fn test_pixel_iteration_is_row_major() {
        let tile = Tile {
            x: 2,
            y: 3,
            width: 2,
            height: 2,
        };
        let pixels: Vec<UVec2> = tile.pixels().collect();
        assert_eq!(
            pixels,
            vec![
                UVec2::new(2, 3),
                UVec2::new(3, 3),
                UVec2::new(2, 4),
                UVec2::new(3, 4),
            ]
        );
    }

    #[test]
    fn test_every_pixel_owned_by_one_tile() {
        let resolution = UVec2::new(100, 70);
        let tiles = generate_tiles(resolution, 64);
        let mut owners = vec![0u8; (resolution.x * resolution.y) as usize];
        for tile in &tiles {
            for pixel in tile.pixels() {
                owners[(pixel.y * resolution.x + pixel.x) as usize] += 1;
            }
        }
        assert!(owners.iter().all(|&count| count == 1));
    }
}
