//! 8x8 tiles of palette-relative color indices.

use serde::Serialize;

use crate::error::{ConversionError, Result};
use crate::handle::PaletteId;

/// Tile width and height in pixels
pub const TILE_SIZE: usize = 8;
/// Number of pixels in a tile
pub const TILE_PIXELS: usize = TILE_SIZE * TILE_SIZE;

/// Color indices of a tile, `pixels[y][x]`
pub type Pixels = [[u8; TILE_SIZE]; TILE_SIZE];

/// Horizontal and vertical mirroring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Flip {
    pub x: bool,
    pub y: bool,
}

impl Flip {
    pub const NONE: Flip = Flip { x: false, y: false };

    /// All orientations in cache order: none, X, Y, both
    pub const ALL: [Flip; 4] = [
        Flip { x: false, y: false },
        Flip { x: true, y: false },
        Flip { x: false, y: true },
        Flip { x: true, y: true },
    ];

    pub fn new(x: bool, y: bool) -> Self {
        Flip { x, y }
    }

    fn index(self) -> usize {
        (if self.y { 2 } else { 0 }) | (if self.x { 1 } else { 0 })
    }
}

fn flip_pixels(pixels: &Pixels, flip: Flip) -> Pixels {
    let mut out = [[0u8; TILE_SIZE]; TILE_SIZE];
    for (y, row) in out.iter_mut().enumerate() {
        let src_y = if flip.y { TILE_SIZE - 1 - y } else { y };
        for (x, value) in row.iter_mut().enumerate() {
            let src_x = if flip.x { TILE_SIZE - 1 - x } else { x };
            *value = pixels[src_y][src_x];
        }
    }
    out
}

/// Represents a single tile
///
/// The four flipped orientations are computed whenever the pixels change, so
/// they can never be stale.
#[derive(Debug, Clone, Serialize)]
pub struct Tile {
    pixels: Pixels,
    palette: PaletteId,
    palette_size: usize,
    #[serde(skip)]
    orientations: [Pixels; 4],
}

impl Tile {
    /// Create a tile whose indices must all be below `palette_size`
    pub fn new(pixels: Pixels, palette: PaletteId, palette_size: usize) -> Result<Self> {
        if let Some(&bad) = pixels.iter().flatten().find(|&&p| p as usize >= palette_size) {
            return Err(ConversionError::InvalidColorIndex(bad as usize));
        }
        Ok(Self::new_unchecked(pixels, palette, palette_size))
    }

    fn new_unchecked(pixels: Pixels, palette: PaletteId, palette_size: usize) -> Self {
        let mut tile = Tile {
            pixels,
            palette,
            palette_size,
            orientations: [pixels; 4],
        };
        tile.refresh_orientations();
        tile
    }

    /// A tile filled with color index 0
    pub fn blank(palette: PaletteId, palette_size: usize) -> Self {
        Self::new_unchecked([[0; TILE_SIZE]; TILE_SIZE], palette, palette_size)
    }

    fn refresh_orientations(&mut self) {
        for flip in Flip::ALL {
            self.orientations[flip.index()] = flip_pixels(&self.pixels, flip);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y][x]
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    /// Default palette used to render and export this tile
    pub fn palette(&self) -> PaletteId {
        self.palette
    }

    pub fn palette_size(&self) -> usize {
        self.palette_size
    }

    pub(crate) fn set_palette(&mut self, palette: PaletteId) {
        self.palette = palette;
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color_index: u8) -> Result<()> {
        if x >= TILE_SIZE || y >= TILE_SIZE {
            return Err(ConversionError::InvalidPixel(x, y));
        }
        if color_index as usize >= self.palette_size {
            return Err(ConversionError::InvalidColorIndex(color_index as usize));
        }
        self.pixels[y][x] = color_index;
        self.refresh_orientations();
        Ok(())
    }

    /// Exchange two color indices everywhere in the tile
    pub fn swap_colors(&mut self, index1: usize, index2: usize) -> Result<bool> {
        if index1 == index2 {
            return Ok(false);
        }
        for index in [index1, index2] {
            if index >= self.palette_size {
                return Err(ConversionError::InvalidColorIndex(index));
            }
        }
        for p in self.pixels.iter_mut().flatten() {
            if *p as usize == index1 {
                *p = index2 as u8;
            } else if *p as usize == index2 {
                *p = index1 as u8;
            }
        }
        self.refresh_orientations();
        Ok(true)
    }

    /// Pixels of the tile mirrored by `flip`
    pub fn orientation(&self, flip: Flip) -> &Pixels {
        &self.orientations[flip.index()]
    }

    /// A new tile with rows and/or columns mirrored
    pub fn flip(&self, flip: Flip) -> Tile {
        Self::new_unchecked(*self.orientation(flip), self.palette, self.palette_size)
    }

    /// Exact index-wise comparison, ignoring palettes
    pub fn equals(&self, other: &Tile) -> bool {
        self.pixels == other.pixels
    }

    /// Find the orientation of this tile that equals `other`.
    ///
    /// Orientations are tried in the order none, X, Y, both.
    pub fn equals_flipped(&self, other: &Tile) -> Option<Flip> {
        Flip::ALL
            .into_iter()
            .find(|flip| *self.orientation(*flip) == other.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Pixels {
        let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
        for (y, row) in pixels.iter_mut().enumerate() {
            for (x, p) in row.iter_mut().enumerate() {
                *p = ((x + 2 * y) % 4) as u8;
            }
        }
        pixels
    }

    fn tile(pixels: Pixels) -> Tile {
        Tile::new(pixels, PaletteId::new(0), 4).unwrap()
    }

    #[test]
    fn test_new_rejects_out_of_range_index() {
        let mut pixels = gradient();
        pixels[3][5] = 4;
        assert!(matches!(
            Tile::new(pixels, PaletteId::new(0), 4),
            Err(ConversionError::InvalidColorIndex(4))
        ));
        assert!(Tile::new(pixels, PaletteId::new(0), 16).is_ok());
    }

    #[test]
    fn test_set_pixel_validates() {
        let mut t = Tile::blank(PaletteId::new(0), 4);
        t.set_pixel(7, 0, 3).unwrap();
        assert_eq!(t.pixel(7, 0), 3);
        assert!(t.set_pixel(0, 0, 4).is_err());
        assert!(matches!(t.set_pixel(8, 0, 1), Err(ConversionError::InvalidPixel(8, 0))));
    }

    #[test]
    fn test_flip_mirrors() {
        let t = tile(gradient());
        let fx = t.flip(Flip::new(true, false));
        let fy = t.flip(Flip::new(false, true));
        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                assert_eq!(fx.pixel(x, y), t.pixel(7 - x, y));
                assert_eq!(fy.pixel(x, y), t.pixel(x, 7 - y));
            }
        }
    }

    #[test]
    fn test_double_flip_is_identity() {
        let t = tile(gradient());
        for flip in Flip::ALL {
            assert!(t.flip(flip).flip(flip).equals(&t), "{flip:?}");
        }
    }

    #[test]
    fn test_mutation_refreshes_orientations() {
        let mut t = Tile::blank(PaletteId::new(0), 4);
        t.set_pixel(0, 0, 2).unwrap();
        assert_eq!(t.orientation(Flip::new(true, true))[7][7], 2);
        assert_eq!(t.orientation(Flip::new(true, false))[0][7], 2);
    }

    #[test]
    fn test_equals_flipped() {
        let t = tile(gradient());
        let mirrored = t.flip(Flip::new(true, true));
        assert_eq!(t.equals_flipped(&t), Some(Flip::NONE));
        assert_eq!(t.equals_flipped(&mirrored), Some(Flip::new(true, true)));
        assert!(!t.equals(&mirrored));

        let mut other = gradient();
        other[0][0] = 3;
        other[0][7] = 0;
        assert_eq!(t.equals_flipped(&tile(other)), None);
    }

    #[test]
    fn test_equals_ignores_palette() {
        let a = Tile::new(gradient(), PaletteId::new(0), 4).unwrap();
        let b = Tile::new(gradient(), PaletteId::new(1), 4).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_swap_colors() {
        let mut t = tile(gradient());
        let before = *t.pixels();
        assert!(t.swap_colors(0, 3).unwrap());
        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                let expected = match before[y][x] {
                    0 => 3,
                    3 => 0,
                    other => other,
                };
                assert_eq!(t.pixel(x, y), expected);
            }
        }
        assert!(!t.swap_colors(1, 1).unwrap());
        assert!(t.swap_colors(1, 4).is_err());
    }
}
