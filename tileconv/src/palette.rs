//! Fixed-capacity ordered color sets.

use serde::Serialize;

use crate::color::Color;
use crate::error::{ConversionError, Result};
use crate::tile::{TILE_PIXELS, TILE_SIZE};

/// Side length and quadrants-per-row of the checker pattern that encodes a
/// palette of `size` colors inside one 8x8 block
pub(crate) fn quadrant_layout(size: usize) -> Option<(usize, usize)> {
    match size {
        4 => Some((4, 2)),
        16 => Some((2, 4)),
        _ => None,
    }
}

/// Represents a palette of colors
///
/// The position of a color is the index tiles use to reference it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Palette { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn color(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    /// Find a color in the palette, returning its first position
    pub fn color_index(&self, color: &Color) -> Option<usize> {
        self.colors.iter().position(|c| c == color)
    }

    pub fn has_color(&self, color: &Color) -> bool {
        self.colors.contains(color)
    }

    /// Check that every given color is in the palette
    pub fn has_colors(&self, colors: &[Color]) -> bool {
        colors.iter().all(|c| self.has_color(c))
    }

    /// Stable sort, darkest color first
    pub fn sort_by_luma(&mut self) {
        self.colors.sort_by(|a, b| a.luma().total_cmp(&b.luma()));
    }

    /// Swap two colors.
    ///
    /// Returns `Ok(false)` without touching anything when both indices are
    /// equal.
    pub fn swap_colors(&mut self, index1: usize, index2: usize) -> Result<bool> {
        if index1 == index2 {
            return Ok(false);
        }
        for index in [index1, index2] {
            if index >= self.colors.len() {
                return Err(ConversionError::InvalidColorIndex(index));
            }
        }
        self.colors.swap(index1, index2);
        Ok(true)
    }

    pub fn set_color(&mut self, index: usize, color: Color) -> Result<()> {
        let slot = self
            .colors
            .get_mut(index)
            .ok_or(ConversionError::InvalidColorIndex(index))?;
        *slot = color;
        Ok(())
    }

    /// Color indices of an 8x8 checker block showing every color of the
    /// palette in its own quadrant.
    ///
    /// Palettes of sizes other than 4 or 16 have no checker layout and get
    /// an all-zero block.
    pub fn checker_block(&self) -> [u8; TILE_PIXELS] {
        let mut block = [0u8; TILE_PIXELS];
        if let Some((size, cols)) = quadrant_layout(self.colors.len()) {
            for (i, index) in block.iter_mut().enumerate() {
                let (x, y) = (i % TILE_SIZE, i / TILE_SIZE);
                *index = ((y / size) * cols + x / size) as u8;
            }
        }
        block
    }
}
