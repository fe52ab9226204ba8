//! Ordered tiles and palettes of one converted image.
//!
//! Tiles and palettes live in arenas addressed by stable handles, so map
//! cells and tile palette references survive reordering. Positions (plain
//! `usize` indices) are what the hardware sees and what editing commands
//! take.

use std::collections::HashSet;

use image::{Rgba, RgbaImage};
use serde::Serialize;

use crate::color::Color;
use crate::error::{ConversionError, Result};
use crate::export::ExportLine;
use crate::handle::{PaletteId, TileId};
use crate::palette::Palette;
use crate::platform::Platform;
use crate::tile::{Flip, Tile, TILE_SIZE};

/// Width of the tile sheet in pixels
pub const SHEET_WIDTH: u32 = 128;
/// Blocks per row of the tile sheet
const SHEET_COLUMNS: usize = SHEET_WIDTH as usize / TILE_SIZE;

/// A tile scheduled for removal because it repeats an earlier one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    /// Tile to remove
    pub tile: TileId,
    /// Earlier tile that replaces it
    pub source: TileId,
    /// Orientation of `source` that reproduces `tile`
    pub flip: Flip,
}

#[derive(Debug, Clone)]
struct TileSlot {
    id: TileId,
    tile: Tile,
    /// Equivalent candidates using other palettes, the current tile included
    alternates: Vec<Tile>,
}

#[derive(Debug, Clone)]
pub struct Tileset {
    platform: Platform,
    palettes: Vec<(PaletteId, Palette)>,
    tiles: Vec<TileSlot>,
    next_palette_id: u32,
    next_tile_id: u32,
}

impl Tileset {
    /// An empty tileset. Callers must add a palette before adding tiles.
    pub fn new(platform: Platform) -> Self {
        Tileset {
            platform,
            palettes: Vec::new(),
            tiles: Vec::new(),
            next_palette_id: 0,
            next_tile_id: 0,
        }
    }

    /// A tileset holding only the platform's default palette
    pub fn with_default_palette(platform: Platform) -> Self {
        let mut tileset = Tileset::new(platform);
        tileset.push_palette(platform.default_palette());
        tileset
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    // --- palettes ---

    pub fn palette_count(&self) -> usize {
        self.palettes.len()
    }

    pub fn palettes(&self) -> impl Iterator<Item = &Palette> {
        self.palettes.iter().map(|(_, palette)| palette)
    }

    pub fn palette(&self, index: usize) -> Option<&Palette> {
        self.palettes.get(index).map(|(_, palette)| palette)
    }

    pub fn palette_id(&self, index: usize) -> Option<PaletteId> {
        self.palettes.get(index).map(|(id, _)| *id)
    }

    /// Current position of a palette
    pub fn palette_index(&self, id: PaletteId) -> Option<usize> {
        self.palettes.iter().position(|(other, _)| *other == id)
    }

    pub fn palette_by_id(&self, id: PaletteId) -> Option<&Palette> {
        self.palettes
            .iter()
            .find(|(other, _)| *other == id)
            .map(|(_, palette)| palette)
    }

    fn palette_mut(&mut self, index: usize) -> Result<&mut Palette> {
        self.palettes
            .get_mut(index)
            .map(|(_, palette)| palette)
            .ok_or(ConversionError::InvalidPaletteIndex(index))
    }

    fn allocate_palette_id(&mut self) -> PaletteId {
        let id = PaletteId::new(self.next_palette_id);
        self.next_palette_id += 1;
        id
    }

    pub(crate) fn push_palette(&mut self, palette: Palette) -> PaletteId {
        let id = self.allocate_palette_id();
        self.palettes.push((id, palette));
        id
    }

    /// Insert a palette at `at`, or append it; returns its position
    pub fn add_palette(&mut self, palette: Palette, at: Option<usize>) -> Result<usize> {
        self.platform.check_palette_size(palette.len())?;
        let index = at.unwrap_or(self.palettes.len());
        if index > self.palettes.len() {
            return Err(ConversionError::InvalidPaletteIndex(index));
        }
        let id = self.allocate_palette_id();
        self.palettes.insert(index, (id, palette));
        Ok(index)
    }

    pub fn swap_palettes(&mut self, index1: usize, index2: usize) -> Result<bool> {
        for index in [index1, index2] {
            if index >= self.palettes.len() {
                return Err(ConversionError::InvalidPaletteIndex(index));
            }
        }
        if index1 == index2 {
            return Ok(false);
        }
        self.palettes.swap(index1, index2);
        Ok(true)
    }

    /// Remove a palette.
    ///
    /// Tiles using it fall back to the first remaining palette and
    /// alternates using it are dropped.
    pub fn remove_palette(&mut self, index: usize) -> Result<Palette> {
        if index >= self.palettes.len() {
            return Err(ConversionError::InvalidPaletteIndex(index));
        }
        if self.palettes.len() == 1 {
            return Err(ConversionError::LastPalette);
        }
        let (removed, palette) = self.palettes.remove(index);
        let fallback = self.palettes[0].0;
        for slot in &mut self.tiles {
            if slot.tile.palette() == removed {
                slot.tile.set_palette(fallback);
            }
            slot.alternates.retain(|tile| tile.palette() != removed);
        }
        Ok(palette)
    }

    /// Swap two colors of a palette and the matching indices of every tile
    /// drawn with it, so the rendered tiles do not change
    pub fn swap_palette_colors(&mut self, palette: usize, index1: usize, index2: usize) -> Result<bool> {
        let id = self
            .palette_id(palette)
            .ok_or(ConversionError::InvalidPaletteIndex(palette))?;
        if !self.palette_mut(palette)?.swap_colors(index1, index2)? {
            return Ok(false);
        }
        for slot in &mut self.tiles {
            if slot.tile.palette() == id {
                slot.tile.swap_colors(index1, index2)?;
            }
            for alternate in slot.alternates.iter_mut().filter(|t| t.palette() == id) {
                alternate.swap_colors(index1, index2)?;
            }
        }
        Ok(true)
    }

    pub fn set_palette_color(&mut self, palette: usize, index: usize, color: Color) -> Result<()> {
        self.palette_mut(palette)?.set_color(index, color)
    }

    // --- tiles ---

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().map(|slot| &slot.tile)
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index).map(|slot| &slot.tile)
    }

    pub fn tile_id(&self, index: usize) -> Option<TileId> {
        self.tiles.get(index).map(|slot| slot.id)
    }

    /// Current position of a tile
    pub fn tile_index(&self, id: TileId) -> Option<usize> {
        self.tiles.iter().position(|slot| slot.id == id)
    }

    pub fn tile_by_id(&self, id: TileId) -> Option<&Tile> {
        self.tiles
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| &slot.tile)
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut TileSlot> {
        self.tiles
            .get_mut(index)
            .ok_or(ConversionError::InvalidTileIndex(index))
    }

    fn allocate_tile_id(&mut self) -> TileId {
        let id = TileId::new(self.next_tile_id);
        self.next_tile_id += 1;
        id
    }

    pub(crate) fn push_tile(&mut self, tile: Tile, alternates: Vec<Tile>) -> TileId {
        let id = self.allocate_tile_id();
        self.tiles.push(TileSlot {
            id,
            tile,
            alternates,
        });
        id
    }

    /// Insert a tile at `at`, or append it; returns its position
    pub fn add_tile(&mut self, tile: Tile, at: Option<usize>) -> Result<usize> {
        if tile.palette_size() != self.platform.palette_size() {
            return Err(ConversionError::PaletteSize {
                platform: self.platform,
                expected: self.platform.palette_size(),
                actual: tile.palette_size(),
            });
        }
        if self.palette_index(tile.palette()).is_none() {
            return Err(ConversionError::UnknownPalette);
        }
        let index = at.unwrap_or(self.tiles.len());
        if index > self.tiles.len() {
            return Err(ConversionError::InvalidTileIndex(index));
        }
        let id = self.allocate_tile_id();
        self.tiles.insert(
            index,
            TileSlot {
                id,
                tile,
                alternates: Vec::new(),
            },
        );
        Ok(index)
    }

    pub fn swap_tiles(&mut self, index1: usize, index2: usize) -> Result<bool> {
        for index in [index1, index2] {
            if index >= self.tiles.len() {
                return Err(ConversionError::InvalidTileIndex(index));
            }
        }
        if index1 == index2 {
            return Ok(false);
        }
        self.tiles.swap(index1, index2);
        Ok(true)
    }

    pub fn remove_tile(&mut self, index: usize) -> Result<Tile> {
        if index >= self.tiles.len() {
            return Err(ConversionError::InvalidTileIndex(index));
        }
        Ok(self.tiles.remove(index).tile)
    }

    /// Remove every tile whose handle is listed, returning how many went
    pub fn remove_tiles(&mut self, ids: &[TileId]) -> usize {
        let ids: HashSet<TileId> = ids.iter().copied().collect();
        let before = self.tiles.len();
        self.tiles.retain(|slot| !ids.contains(&slot.id));
        before - self.tiles.len()
    }

    pub fn set_tile_palette(&mut self, tile: usize, palette: usize) -> Result<()> {
        let id = self
            .palette_id(palette)
            .ok_or(ConversionError::InvalidPaletteIndex(palette))?;
        self.slot_mut(tile)?.tile.set_palette(id);
        Ok(())
    }

    /// Candidate tiles found for this slot during extraction
    pub fn alternates(&self, tile: usize) -> Result<&[Tile]> {
        self.tiles
            .get(tile)
            .map(|slot| slot.alternates.as_slice())
            .ok_or(ConversionError::InvalidTileIndex(tile))
    }

    /// Replace a tile by one of its alternates, keeping its handle
    pub fn select_alternate(&mut self, tile: usize, alternate: usize) -> Result<()> {
        let slot = self.slot_mut(tile)?;
        let chosen = slot
            .alternates
            .get(alternate)
            .cloned()
            .ok_or(ConversionError::InvalidAlternate { tile, alternate })?;
        slot.tile = chosen;
        Ok(())
    }

    // --- deduplication ---

    /// Find tiles that can be dropped in favour of an earlier equivalent.
    ///
    /// Three passes run in order and the first that finds anything wins:
    /// same pixels and palette, same pixels, and (only when map cells can
    /// be flipped) same pixels in any orientation. A tile already marked as
    /// a duplicate is never used as a source.
    pub fn quantizable_tiles(&self) -> Vec<Duplicate> {
        let found = self.find_duplicates(|a, b| a.equals(b) && a.palette() == b.palette());
        if !found.is_empty() {
            return found;
        }
        let found = self.find_duplicates(|a, b| a.equals(b));
        if !found.is_empty() || !self.platform.allows_map_attributes() {
            return found;
        }
        self.find_duplicates(|a, b| a.equals_flipped(b).is_some())
    }

    fn find_duplicates(&self, matches: impl Fn(&Tile, &Tile) -> bool) -> Vec<Duplicate> {
        let mut found = Vec::new();
        let mut marked = HashSet::new();
        for (i, slot) in self.tiles.iter().enumerate() {
            if marked.contains(&slot.id) {
                continue;
            }
            let batch: Vec<Duplicate> = self.tiles[i + 1..]
                .iter()
                .filter(|other| !marked.contains(&other.id) && matches(&slot.tile, &other.tile))
                .map(|other| Duplicate {
                    tile: other.id,
                    source: slot.id,
                    flip: slot.tile.equals_flipped(&other.tile).unwrap_or(Flip::NONE),
                })
                .collect();
            marked.extend(batch.iter().map(|duplicate| duplicate.tile));
            found.extend(batch);
        }
        found
    }

    // --- output ---

    /// One line of encoded bytes per tile
    pub fn export_tiles(&self) -> Vec<ExportLine> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                ExportLine::bytes(
                    &self.platform.encode_tile(slot.tile.pixels()),
                    format!("Tile {i:02x}"),
                )
            })
            .collect()
    }

    /// One line of encoded colors per palette
    pub fn export_palettes(&self) -> Result<Vec<ExportLine>> {
        self.palettes()
            .enumerate()
            .map(|(i, palette)| {
                let data = self.platform.encode_palette(palette)?;
                Ok(ExportLine::palette(data, format!("Palette {i}")))
            })
            .collect()
    }

    /// RGB colors of a tile drawn with its own palette
    pub fn tile_rgb(&self, tile: &Tile) -> Result<[[[u8; 3]; TILE_SIZE]; TILE_SIZE]> {
        let palette = self
            .palette_by_id(tile.palette())
            .ok_or(ConversionError::UnknownPalette)?;
        let mut rgb = [[[0u8; 3]; TILE_SIZE]; TILE_SIZE];
        for (y, row) in rgb.iter_mut().enumerate() {
            for (x, value) in row.iter_mut().enumerate() {
                let index = tile.pixel(x, y) as usize;
                *value = palette
                    .color(index)
                    .ok_or(ConversionError::InvalidColorIndex(index))?
                    .rgb();
            }
        }
        Ok(rgb)
    }

    /// Render palettes as checker blocks followed by the tiles, 16 blocks
    /// per row. Unused blocks stay transparent.
    pub fn to_sheet(&self) -> Result<RgbaImage> {
        let palette_rows = self.palettes.len().div_ceil(SHEET_COLUMNS);
        let tile_rows = self.tiles.len().div_ceil(SHEET_COLUMNS);
        let height = ((palette_rows + tile_rows) * TILE_SIZE) as u32;
        let mut sheet = RgbaImage::new(SHEET_WIDTH, height);

        let mut put_block = |block: usize, pixel: &dyn Fn(usize, usize) -> [u8; 3]| {
            let origin_x = (block % SHEET_COLUMNS * TILE_SIZE) as u32;
            let origin_y = (block / SHEET_COLUMNS * TILE_SIZE) as u32;
            for y in 0..TILE_SIZE {
                for x in 0..TILE_SIZE {
                    let [r, g, b] = pixel(x, y);
                    sheet.put_pixel(origin_x + x as u32, origin_y + y as u32, Rgba([r, g, b, 255]));
                }
            }
        };

        for (i, palette) in self.palettes().enumerate() {
            let checker = palette.checker_block();
            put_block(i, &|x, y| {
                palette
                    .color(checker[y * TILE_SIZE + x] as usize)
                    .map_or([0, 0, 0], |color| color.rgb())
            });
        }
        let first_tile_block = palette_rows * SHEET_COLUMNS;
        for (i, tile) in self.tiles().enumerate() {
            let rgb = self.tile_rgb(tile)?;
            put_block(first_tile_block + i, &|x, y| rgb[y][x]);
        }
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Pixels;

    fn gb_palette(shades: [u16; 4]) -> Palette {
        let model = Platform::GameBoyColor.color_model();
        Palette::new(shades.iter().map(|&n| model.from_native(n)).collect())
    }

    fn pattern(seed: u8) -> Pixels {
        let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
        for (y, row) in pixels.iter_mut().enumerate() {
            for (x, p) in row.iter_mut().enumerate() {
                *p = ((x * seed as usize + y) % 4) as u8;
            }
        }
        pixels
    }

    /// Two palettes and tiles 0..n with the given patterns, all on palette 0
    fn tileset(patterns: &[Pixels]) -> Tileset {
        let mut tileset = Tileset::new(Platform::GameBoyColor);
        let p0 = tileset.push_palette(gb_palette([0, 1, 2, 3]));
        tileset.push_palette(gb_palette([4, 5, 6, 7]));
        for pixels in patterns {
            tileset.push_tile(Tile::new(*pixels, p0, 4).unwrap(), Vec::new());
        }
        tileset
    }

    #[test]
    fn test_add_palette_checks_size_and_position() {
        let mut tileset = tileset(&[]);
        assert_eq!(tileset.add_palette(gb_palette([8, 9, 10, 11]), Some(0)).unwrap(), 0);
        assert_eq!(tileset.palette(0).unwrap().colors()[0].native(), 8);
        assert_eq!(tileset.add_palette(gb_palette([1, 1, 1, 1]), None).unwrap(), 3);
        assert!(matches!(
            tileset.add_palette(gb_palette([1, 1, 1, 1]), Some(9)),
            Err(ConversionError::InvalidPaletteIndex(9))
        ));
        let short = Palette::new(gb_palette([1, 2, 3, 4]).colors()[..2].to_vec());
        assert!(matches!(
            tileset.add_palette(short, None),
            Err(ConversionError::PaletteSize { .. })
        ));
    }

    #[test]
    fn test_add_tile_checks_palette() {
        let mut tileset = tileset(&[pattern(1)]);
        let id = tileset.palette_id(1).unwrap();
        let index = tileset.add_tile(Tile::blank(id, 4), Some(0)).unwrap();
        assert_eq!(index, 0);
        assert_eq!(tileset.tile(0).unwrap().palette(), id);
        assert_eq!(tileset.tile_count(), 2);

        assert!(matches!(
            tileset.add_tile(Tile::blank(PaletteId::new(99), 4), None),
            Err(ConversionError::UnknownPalette)
        ));
        assert!(matches!(
            tileset.add_tile(Tile::blank(id, 16), None),
            Err(ConversionError::PaletteSize { .. })
        ));
    }

    #[test]
    fn test_swap_tiles() {
        let mut tileset = tileset(&[pattern(1), pattern(2)]);
        let first = tileset.tile_id(0).unwrap();
        assert!(!tileset.swap_tiles(1, 1).unwrap());
        assert!(tileset.swap_tiles(0, 1).unwrap());
        assert_eq!(tileset.tile_index(first), Some(1));
        assert!(matches!(
            tileset.swap_tiles(0, 2),
            Err(ConversionError::InvalidTileIndex(2))
        ));
    }

    #[test]
    fn test_remove_tile() {
        let mut tileset = tileset(&[pattern(1), pattern(2)]);
        let second = tileset.tile_id(1).unwrap();
        let removed = tileset.remove_tile(0).unwrap();
        assert_eq!(removed.pixels(), &pattern(1));
        assert_eq!(tileset.tile_index(second), Some(0));
        assert!(tileset.remove_tile(1).is_err());
    }

    #[test]
    fn test_remove_palette_repairs_tiles() {
        let mut tileset = tileset(&[pattern(1)]);
        let p1 = tileset.palette_id(1).unwrap();
        tileset.set_tile_palette(0, 1).unwrap();
        assert_eq!(tileset.tile(0).unwrap().palette(), p1);

        tileset.swap_palettes(0, 1).unwrap();
        let removed = tileset.remove_palette(0).unwrap();
        assert_eq!(removed.colors()[0].native(), 4);
        let remaining = tileset.palette_id(0).unwrap();
        assert_eq!(tileset.tile(0).unwrap().palette(), remaining);
        assert!(matches!(tileset.remove_palette(0), Err(ConversionError::LastPalette)));
    }

    #[test]
    fn test_set_tile_palette_validates() {
        let mut tileset = tileset(&[pattern(1)]);
        assert!(matches!(
            tileset.set_tile_palette(0, 2),
            Err(ConversionError::InvalidPaletteIndex(2))
        ));
        assert!(matches!(
            tileset.set_tile_palette(3, 0),
            Err(ConversionError::InvalidTileIndex(3))
        ));
    }

    #[test]
    fn test_swap_palette_colors_keeps_rendering() {
        let mut tileset = tileset(&[pattern(1), pattern(3)]);
        let before: Vec<_> = tileset.tiles().map(|t| tileset.tile_rgb(t).unwrap()).collect();
        assert!(tileset.swap_palette_colors(0, 0, 3).unwrap());
        assert_eq!(tileset.palette(0).unwrap().colors()[0].native(), 3);
        let after: Vec<_> = tileset.tiles().map(|t| tileset.tile_rgb(t).unwrap()).collect();
        assert_eq!(before, after);
        assert_ne!(tileset.tile(0).unwrap().pixels(), &pattern(1));
        assert!(!tileset.swap_palette_colors(0, 2, 2).unwrap());
    }

    #[test]
    fn test_alternates() {
        let mut tileset = tileset(&[]);
        let p0 = tileset.palette_id(0).unwrap();
        let p1 = tileset.palette_id(1).unwrap();
        let a = Tile::new(pattern(1), p0, 4).unwrap();
        let b = Tile::new(pattern(2), p1, 4).unwrap();
        let id = tileset.push_tile(a.clone(), vec![a, b]);
        assert_eq!(tileset.alternates(0).unwrap().len(), 2);

        tileset.select_alternate(0, 1).unwrap();
        assert_eq!(tileset.tile(0).unwrap().palette(), p1);
        assert_eq!(tileset.tile_id(0), Some(id));
        assert!(matches!(
            tileset.select_alternate(0, 2),
            Err(ConversionError::InvalidAlternate { tile: 0, alternate: 2 })
        ));

        tileset.remove_palette(1).unwrap();
        assert_eq!(tileset.alternates(0).unwrap().len(), 1);
    }

    #[test]
    fn test_quantizable_same_palette_first() {
        let mut tileset = tileset(&[pattern(1), pattern(1), pattern(2), pattern(1)]);
        tileset.set_tile_palette(3, 1).unwrap();
        let found = tileset.quantizable_tiles();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tile, tileset.tile_id(1).unwrap());
        assert_eq!(found[0].source, tileset.tile_id(0).unwrap());
        assert_eq!(found[0].flip, Flip::NONE);
    }

    #[test]
    fn test_quantizable_any_palette() {
        let mut tileset = tileset(&[pattern(1), pattern(2), pattern(1)]);
        tileset.set_tile_palette(2, 1).unwrap();
        let found = tileset.quantizable_tiles();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tile, tileset.tile_id(2).unwrap());
        assert_eq!(found[0].source, tileset.tile_id(0).unwrap());
    }

    #[test]
    fn test_quantizable_flipped() {
        let pixels = pattern(1);
        let tileset_with_flip = |platform| {
            let mut tileset = Tileset::new(platform);
            let p = tileset.push_palette(platform.default_palette());
            let tile = Tile::new(pixels, p, 4).unwrap();
            tileset.push_tile(tile.clone(), Vec::new());
            tileset.push_tile(tile.flip(Flip::new(true, false)), Vec::new());
            tileset
        };

        let cgb = tileset_with_flip(Platform::GameBoyColor);
        let found = cgb.quantizable_tiles();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].flip, Flip::new(true, false));

        let dmg = tileset_with_flip(Platform::GameBoy);
        assert!(dmg.quantizable_tiles().is_empty());
    }

    #[test]
    fn test_duplicates_are_never_sources() {
        let tileset = tileset(&[pattern(1), pattern(1), pattern(1)]);
        let found = tileset.quantizable_tiles();
        assert_eq!(found.len(), 2);
        let source = tileset.tile_id(0).unwrap();
        assert!(found.iter().all(|d| d.source == source));
    }

    #[test]
    fn test_remove_tiles() {
        let mut tileset = tileset(&[pattern(1), pattern(1), pattern(2)]);
        let ids: Vec<_> = tileset.quantizable_tiles().iter().map(|d| d.tile).collect();
        assert_eq!(tileset.remove_tiles(&ids), 1);
        assert_eq!(tileset.tile_count(), 2);
    }

    #[test]
    fn test_export() {
        let tileset = tileset(&[pattern(1), pattern(2)]);
        let tiles = tileset.export_tiles();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[1].comment, "Tile 01");
        assert_eq!(tiles[0].values.len(), 16);

        let palettes = tileset.export_palettes().unwrap();
        assert_eq!(palettes.len(), 2);
        assert_eq!(palettes[1].comment, "Palette 1");
        assert_eq!(palettes[1].values, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_sheet_layout() {
        let patterns: Vec<_> = (0..17).map(|i| pattern(i as u8)).collect();
        let tileset = tileset(&patterns);
        let sheet = tileset.to_sheet().unwrap();
        assert_eq!(sheet.width(), 128);
        // one row of palettes, two rows of tiles
        assert_eq!(sheet.height(), 24);
        // palette 0 checker: top-left quadrant shows color 0
        let color0 = tileset.palette(0).unwrap().colors()[0].rgb();
        let p = sheet.get_pixel(0, 0);
        assert_eq!([p[0], p[1], p[2], p[3]], [color0[0], color0[1], color0[2], 255]);
        // third palette slot is empty
        assert_eq!(sheet.get_pixel(16, 0)[3], 0);
        // tile 16 starts the second tile row
        assert_eq!(sheet.get_pixel(0, 16)[3], 255);
        assert_eq!(sheet.get_pixel(8, 16)[3], 0);
    }
}
