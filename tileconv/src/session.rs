//! Editing session over one converted image.
//!
//! A [`Session`] owns the tileset, the optional map and the warnings of an
//! extraction. Commands that change tiles also repair the map.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{debug, info};
use serde::Serialize;

use crate::color::Color;
use crate::config::OutputFormat;
use crate::error::{ConversionError, Result};
use crate::export::{self, ExportLine};
use crate::extract::{BlockWarning, TilesetExtractor};
use crate::map::{Map, MapCell};
use crate::platform::{MapFormat, Platform};
use crate::tile::Flip;
use crate::tileset::{Duplicate, Tileset, SHEET_WIDTH};

/// Tile count above which extraction tries to merge duplicate tiles
pub const AUTO_QUANTIZE_TILES: usize = 0xff;

#[derive(Debug, Clone)]
pub struct Session {
    platform: Platform,
    source_width: u32,
    tileset: Tileset,
    map: Option<Map>,
    warnings: Vec<BlockWarning>,
}

/// Summary written next to the binary artifacts
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub platform: Platform,
    pub palettes: usize,
    pub tiles: usize,
    pub map_size: Option<(u32, u32)>,
    pub warnings: Vec<BlockWarning>,
    pub exports: Exports,
}

/// Every export payload of a session
#[derive(Debug, Clone, Default, Serialize)]
pub struct Exports {
    pub tiles: Vec<ExportLine>,
    pub palettes: Vec<ExportLine>,
    pub map: Option<Vec<ExportLine>>,
    pub attributes: Option<Vec<ExportLine>>,
}

impl Session {
    /// Extract a tileset from `image`.
    ///
    /// With `auto_quantize`, images producing more than 255 tiles get one
    /// round of duplicate removal, unless they are 128 pixels wide (the tile
    /// sheet layout, taken as final).
    pub fn from_image(image: &RgbaImage, platform: Platform, auto_quantize: bool) -> Result<Self> {
        let extraction = TilesetExtractor::new(platform).extract(image)?;
        let mut session = Session {
            platform,
            source_width: image.width(),
            tileset: extraction.tileset,
            map: extraction.map,
            warnings: extraction.warnings,
        };
        if auto_quantize && session.needs_quantization() {
            let duplicates = session.quantizable_tiles();
            if duplicates.is_empty() {
                info!("{} tiles and no duplicates to merge", session.tileset.tile_count());
            } else {
                session.remove_duplicates(&duplicates);
            }
        }
        Ok(session)
    }

    /// Read an image file and extract it
    pub fn open(path: impl AsRef<Path>, platform: Platform, auto_quantize: bool) -> Result<Self> {
        let image = image::open(path)?.to_rgba8();
        Session::from_image(&image, platform, auto_quantize)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn source_width(&self) -> u32 {
        self.source_width
    }

    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    pub fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }

    pub fn warnings(&self) -> &[BlockWarning] {
        &self.warnings
    }

    /// Whether the tile count is too high for 8-bit map indices
    pub fn needs_quantization(&self) -> bool {
        self.tileset.tile_count() > AUTO_QUANTIZE_TILES && self.source_width != SHEET_WIDTH
    }

    pub fn quantizable_tiles(&self) -> Vec<Duplicate> {
        self.tileset.quantizable_tiles()
    }

    /// Remove one round of duplicate tiles, returning how many went
    pub fn quantize(&mut self) -> Result<usize> {
        let duplicates = self.quantizable_tiles();
        if duplicates.is_empty() {
            return Err(ConversionError::NothingToQuantize);
        }
        Ok(self.remove_duplicates(&duplicates))
    }

    fn remove_duplicates(&mut self, duplicates: &[Duplicate]) -> usize {
        if let Some(map) = self.map.as_mut() {
            for duplicate in duplicates {
                let cells = map.repoint_tile(duplicate.tile, duplicate.source, duplicate.flip);
                debug!("{:?} -> {:?}: {} cells", duplicate.tile, duplicate.source, cells);
            }
        }
        let ids: Vec<_> = duplicates.iter().map(|d| d.tile).collect();
        let removed = self.tileset.remove_tiles(&ids);
        info!(
            "Removed {} duplicate tiles, {} left",
            removed,
            self.tileset.tile_count()
        );
        removed
    }

    // --- editing ---

    pub fn swap_tiles(&mut self, index1: usize, index2: usize) -> Result<bool> {
        self.tileset.swap_tiles(index1, index2)
    }

    /// Remove a tile; map cells showing it become empty
    pub fn remove_tile(&mut self, index: usize) -> Result<()> {
        let id = self
            .tileset
            .tile_id(index)
            .ok_or(ConversionError::InvalidTileIndex(index))?;
        self.tileset.remove_tile(index)?;
        if let Some(map) = self.map.as_mut() {
            map.clear_tile(id);
        }
        Ok(())
    }

    pub fn swap_palettes(&mut self, index1: usize, index2: usize) -> Result<bool> {
        self.tileset.swap_palettes(index1, index2)
    }

    pub fn remove_palette(&mut self, index: usize) -> Result<()> {
        self.tileset.remove_palette(index).map(|_| ())
    }

    pub fn set_tile_palette(&mut self, tile: usize, palette: usize) -> Result<()> {
        self.tileset.set_tile_palette(tile, palette)
    }

    pub fn select_alternate(&mut self, tile: usize, alternate: usize) -> Result<()> {
        self.tileset.select_alternate(tile, alternate)
    }

    pub fn swap_palette_colors(&mut self, palette: usize, index1: usize, index2: usize) -> Result<bool> {
        self.tileset.swap_palette_colors(palette, index1, index2)
    }

    pub fn set_palette_color(&mut self, palette: usize, index: usize, color: Color) -> Result<()> {
        self.tileset.set_palette_color(palette, index, color)
    }

    pub fn set_map_tile(&mut self, x: u32, y: u32, tile: usize, flip: Flip) -> Result<MapCell> {
        let tileset = &self.tileset;
        let map = self
            .map
            .as_mut()
            .ok_or(ConversionError::NoMapFormat(self.platform))?;
        map.set_map_tile(x, y, tile, flip, tileset)
    }

    pub fn replace_map_tiles(&mut self, search: usize, replace: usize, flip: Flip) -> Result<usize> {
        let tileset = &self.tileset;
        let map = self
            .map
            .as_mut()
            .ok_or(ConversionError::NoMapFormat(self.platform))?;
        map.replace_map_tiles(search, replace, flip, tileset)
    }

    // --- output ---

    pub fn export_map(&self) -> Result<Vec<ExportLine>> {
        self.map
            .as_ref()
            .ok_or(ConversionError::NoMapFormat(self.platform))?
            .export(&self.tileset)
    }

    pub fn export_attributes(&self) -> Result<Vec<ExportLine>> {
        self.map
            .as_ref()
            .ok_or(ConversionError::NoMapFormat(self.platform))?
            .export_attributes(&self.tileset)
    }

    /// Collect every payload the platform supports
    pub fn exports(&self) -> Result<Exports> {
        let has_attributes = matches!(
            self.platform.map_format(),
            Some(MapFormat::SeparateAttributes { .. })
        );
        Ok(Exports {
            tiles: self.tileset.export_tiles(),
            palettes: self.tileset.export_palettes()?,
            map: self.map.as_ref().map(|_| self.export_map()).transpose()?,
            attributes: has_attributes
                .then(|| self.export_attributes())
                .transpose()?,
        })
    }

    pub fn report(&self) -> Result<Report> {
        Ok(Report {
            platform: self.platform,
            palettes: self.tileset.palette_count(),
            tiles: self.tileset.tile_count(),
            map_size: self.map.as_ref().map(|map| (map.width(), map.height())),
            warnings: self.warnings.clone(),
            exports: self.exports()?,
        })
    }

    /// Write tiles, palettes, map and attributes next to `prefix`, returning
    /// the files written. Tiles and palettes are written before the map is
    /// exported, so they exist even when the map does not fit 8-bit indices.
    pub fn write_artifacts(&self, prefix: &str, format: OutputFormat) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(4);
        let write = |suffix: &str, lines: &[ExportLine], written: &mut Vec<PathBuf>| -> Result<()> {
            let path = PathBuf::from(format!("{prefix}{suffix}.{}", format.extension()));
            match format {
                OutputFormat::Bin => export::write_binary(&path, lines)?,
                OutputFormat::Hex => export::write_hex(&path, lines)?,
            }
            debug!("Wrote {}", path.display());
            written.push(path);
            Ok(())
        };

        write("", &self.tileset.export_tiles(), &mut written)?;
        write("_palettes", &self.tileset.export_palettes()?, &mut written)?;
        if self.map.is_some() {
            write("_map", &self.export_map()?, &mut written)?;
            if let Some(MapFormat::SeparateAttributes { .. }) = self.platform.map_format() {
                write("_map_attributes", &self.export_attributes()?, &mut written)?;
            }
        }
        Ok(written)
    }

    /// Write the tile sheet image
    pub fn write_sheet(&self, path: impl AsRef<Path>) -> Result<()> {
        self.tileset.to_sheet()?.save(path)?;
        Ok(())
    }

    /// Write the JSON report
    pub fn write_report(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &self.report()?)?;
        Ok(())
    }
}
