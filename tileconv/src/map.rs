//! Grids of tile references.

use serde::Serialize;

use crate::error::{ConversionError, Result};
use crate::export::ExportLine;
use crate::handle::TileId;
use crate::platform::MapFormat;
use crate::tile::Flip;
use crate::tileset::Tileset;

/// Largest tile position an 8-bit map index can hold
pub const MAX_MAP_INDEX: usize = 0xff;

/// One map cell: a tile drawn with optional mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapCell {
    pub tile: TileId,
    pub flip: Flip,
}

/// Width x height grid of cells, row-major. Empty cells have no tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    width: u32,
    height: u32,
    cells: Vec<Option<MapCell>>,
}

impl Map {
    pub fn new(width: u32, height: u32) -> Self {
        Map {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cells(&self) -> &[Option<MapCell>] {
        &self.cells
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(ConversionError::InvalidMapCell(x, y));
        }
        Ok((y * self.width + x) as usize)
    }

    pub fn map_tile(&self, x: u32, y: u32) -> Result<Option<MapCell>> {
        Ok(self.cells[self.offset(x, y)?])
    }

    /// Point a cell at the tile currently at `tile_index`
    pub fn set_map_tile(
        &mut self,
        x: u32,
        y: u32,
        tile_index: usize,
        flip: Flip,
        tileset: &Tileset,
    ) -> Result<MapCell> {
        let tile = tileset
            .tile_id(tile_index)
            .ok_or(ConversionError::InvalidTileIndex(tile_index))?;
        let offset = self.offset(x, y)?;
        let cell = MapCell { tile, flip };
        self.cells[offset] = Some(cell);
        Ok(cell)
    }

    pub(crate) fn set_cell(&mut self, x: u32, y: u32, cell: MapCell) -> Result<()> {
        let offset = self.offset(x, y)?;
        self.cells[offset] = Some(cell);
        Ok(())
    }

    /// Rewrite every cell showing the tile at position `search` to show the
    /// tile at position `replace` with the given flip. Returns the number of
    /// cells changed.
    pub fn replace_map_tiles(
        &mut self,
        search: usize,
        replace: usize,
        flip: Flip,
        tileset: &Tileset,
    ) -> Result<usize> {
        let search = tileset
            .tile_id(search)
            .ok_or(ConversionError::InvalidTileIndex(search))?;
        let replace = tileset
            .tile_id(replace)
            .ok_or(ConversionError::InvalidTileIndex(replace))?;
        Ok(self.update_cells(search, |_| MapCell { tile: replace, flip }))
    }

    /// Repoint cells from a removed duplicate to its source. The duplicate
    /// is `source` seen through `flip`, so the flips combine.
    pub(crate) fn repoint_tile(&mut self, search: TileId, replace: TileId, flip: Flip) -> usize {
        self.update_cells(search, |cell| MapCell {
            tile: replace,
            flip: Flip::new(cell.flip.x != flip.x, cell.flip.y != flip.y),
        })
    }

    /// Empty every cell showing `tile`
    pub(crate) fn clear_tile(&mut self, tile: TileId) -> usize {
        let mut cleared = 0;
        for cell in &mut self.cells {
            if cell.is_some_and(|c| c.tile == tile) {
                *cell = None;
                cleared += 1;
            }
        }
        cleared
    }

    fn update_cells(&mut self, search: TileId, update: impl Fn(MapCell) -> MapCell) -> usize {
        let mut changed = 0;
        for cell in self.cells.iter_mut().flatten() {
            if cell.tile == search {
                *cell = update(*cell);
                changed += 1;
            }
        }
        changed
    }

    /// Check that every referenced tile exists and fits an 8-bit index
    pub fn check_valid_indexes(&self, tileset: &Tileset) -> bool {
        self.cells.iter().flatten().all(|cell| {
            tileset
                .tile_index(cell.tile)
                .is_some_and(|index| index <= MAX_MAP_INDEX)
        })
    }

    fn format(&self, tileset: &Tileset) -> Result<MapFormat> {
        let platform = tileset.platform();
        let format = platform
            .map_format()
            .ok_or(ConversionError::NoMapFormat(platform))?;
        if !self.check_valid_indexes(tileset) {
            return Err(ConversionError::MapIndexOverflow);
        }
        Ok(format)
    }

    /// Tile index and attribute byte of a cell; empty cells are zero
    fn cell_bytes(&self, cell: &Option<MapCell>, format: MapFormat, tileset: &Tileset) -> (u8, u8) {
        let Some(cell) = cell else {
            return (0, 0);
        };
        let Some(index) = tileset.tile_index(cell.tile) else {
            return (0, 0);
        };
        let palette = tileset
            .tile(index)
            .and_then(|tile| tileset.palette_index(tile.palette()))
            .unwrap_or(0);
        (index as u8, format.attribute(palette, cell.flip))
    }

    fn rows(&self) -> impl Iterator<Item = &[Option<MapCell>]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// One line of tile indices per map row. Platforms that interleave
    /// attributes get an index byte followed by an attribute byte per cell.
    pub fn export(&self, tileset: &Tileset) -> Result<Vec<ExportLine>> {
        let format = self.format(tileset)?;
        Ok(self
            .rows()
            .enumerate()
            .map(|(y, row)| {
                let mut bytes = Vec::with_capacity(row.len() * 2);
                for cell in row {
                    let (index, attribute) = self.cell_bytes(cell, format, tileset);
                    bytes.push(index);
                    if let MapFormat::Interleaved { .. } = format {
                        bytes.push(attribute);
                    }
                }
                ExportLine::bytes(&bytes, format!("Row {y}"))
            })
            .collect())
    }

    /// One line of attribute bytes per map row, for platforms that keep
    /// attributes in a separate table
    pub fn export_attributes(&self, tileset: &Tileset) -> Result<Vec<ExportLine>> {
        let format = self.format(tileset)?;
        if !matches!(format, MapFormat::SeparateAttributes { .. }) {
            return Err(ConversionError::NoAttributes(tileset.platform()));
        }
        Ok(self
            .rows()
            .enumerate()
            .map(|(y, row)| {
                let bytes: Vec<u8> = row
                    .iter()
                    .map(|cell| self.cell_bytes(cell, format, tileset).1)
                    .collect();
                ExportLine::bytes(&bytes, format!("Row {y}"))
            })
            .collect())
    }
}
