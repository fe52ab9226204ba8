//! Stable handles for tiles and palettes owned by a tileset.
//!
//! Positions inside a tileset change when entries are swapped, inserted or
//! removed; handles do not. Tiles reference their palette and map cells
//! reference their tile through these handles.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PaletteId(u32);

impl PaletteId {
    pub(crate) fn new(id: u32) -> Self {
        PaletteId(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileId(u32);

impl TileId {
    pub(crate) fn new(id: u32) -> Self {
        TileId(id)
    }
}
