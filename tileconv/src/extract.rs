//! Image to tileset extraction
//!
//! This module turns an RGBA image into palettes, deduplicated tiles and a
//! map. The image is processed in 8x8 blocks, row-major:
//! 1. blocks that are mostly transparent are skipped
//! 2. each block's colors are encoded for the platform and, when there are
//!    too many, the least distinct pairs are merged
//! 3. leading rows made only of checker blocks are read as palettes
//! 4. the remaining blocks get a palette: an existing superset, a new full
//!    palette, or a palette built by merging smaller pending blocks
//! 5. every block becomes a tile, with one alternate per usable palette

use image::{imageops, RgbaImage};
use log::{debug, info, warn};
use serde::Serialize;

use crate::color::{closest_pair, Color};
use crate::error::{ConversionError, Result};
use crate::map::{Map, MapCell};
use crate::palette::{quadrant_layout, Palette};
use crate::platform::Platform;
use crate::tile::{Flip, Pixels, Tile, TILE_PIXELS, TILE_SIZE};
use crate::tileset::Tileset;

/// Maximum number of 8x8 blocks in an input image
pub const MAX_BLOCKS: usize = 4096;
/// Maximum number of blocks that may exceed the palette capacity
pub const MAX_WARNINGS: usize = 360;
/// Maximum number of palettes in a tileset
pub const MAX_PALETTES: usize = 64;
/// Pixels with a lower alpha count as transparent
const ALPHA_THRESHOLD: u8 = 192;
/// Blocks with at least this many transparent pixels are skipped
const TRANSPARENT_PIXELS: usize = 32;
/// Filler for palette slots no block needs
const PADDING_RGB: [u8; 3] = [255, 0, 255];

const BLOCK_SIZE: u32 = TILE_SIZE as u32;

/// A block that used more colors than a palette holds
#[derive(Debug, Clone, Serialize)]
pub struct BlockWarning {
    /// Block column
    pub x: u32,
    /// Block row
    pub y: u32,
    /// Distinct colors before merging
    pub colors: usize,
    /// Original pixels of the block
    #[serde(skip)]
    pub pixels: RgbaImage,
}

/// Result of a successful extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    pub tileset: Tileset,
    pub map: Option<Map>,
    pub warnings: Vec<BlockWarning>,
    /// Leading block rows that were read as palettes
    pub embedded_rows: u32,
}

/// One non-transparent block after color encoding and merging
#[derive(Debug, Clone)]
struct Block {
    x: u32,
    y: u32,
    pixels: [Color; TILE_PIXELS],
    /// Distinct colors in order of first appearance
    colors: Vec<Color>,
    /// Quadrant colors when the block is a checker palette
    embedded: Option<Vec<Color>>,
}

/// Main struct for the extraction process
pub struct TilesetExtractor {
    platform: Platform,
}

impl TilesetExtractor {
    pub fn new(platform: Platform) -> Self {
        TilesetExtractor { platform }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Main execution function to run the entire extraction
    pub fn extract(&self, image: &RgbaImage) -> Result<Extraction> {
        let (columns, rows) = self.check_dimensions(image)?;
        info!(
            "Extracting {}x{} blocks for {}",
            columns, rows, self.platform
        );

        // Read blocks, consuming leading palette rows
        let mut palettes = Vec::new();
        let mut blocks = Vec::new();
        let mut warnings = Vec::new();
        let mut embedded_rows = 0;
        let mut scanning = true;

        for y in 0..rows {
            let mut row = Vec::new();
            for x in 0..columns {
                let Some(block) = self.read_block(image, x, y, scanning, &mut warnings)? else {
                    continue;
                };
                if scanning && block.embedded.is_none() {
                    scanning = false;
                }
                row.push(block);
            }

            if scanning {
                for block in row {
                    if let Some(colors) = block.embedded {
                        debug!("Embedded palette at {},{}", block.x, block.y);
                        self.register_palette(&mut palettes, Palette::new(colors))?;
                    }
                }
                embedded_rows += 1;
            } else {
                blocks.extend(row);
            }
        }
        debug!(
            "{} embedded palette rows, {} palettes",
            embedded_rows,
            palettes.len()
        );

        // Palettes for blocks not covered yet
        let pending = self.assign_palettes(&blocks, &mut palettes)?;
        self.resolve_pending(&blocks, pending, &mut palettes)?;

        let mut tileset = Tileset::new(self.platform);
        for palette in palettes {
            tileset.push_palette(palette);
        }
        if tileset.palette_count() == 0 {
            tileset.push_palette(self.platform.default_palette());
        }

        let mut map = self
            .platform
            .map_format()
            .map(|_| Map::new(columns, rows - embedded_rows));
        self.build_tiles(&blocks, &mut tileset, map.as_mut(), embedded_rows)?;

        info!(
            "{} palettes, {} tiles, {} warnings",
            tileset.palette_count(),
            tileset.tile_count(),
            warnings.len()
        );

        Ok(Extraction {
            tileset,
            map,
            warnings,
            embedded_rows,
        })
    }

    /// Validate the image size, returning its size in blocks
    fn check_dimensions(&self, image: &RgbaImage) -> Result<(u32, u32)> {
        let (width, height) = image.dimensions();
        if width % BLOCK_SIZE != 0 || height % BLOCK_SIZE != 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        let (columns, rows) = (width / BLOCK_SIZE, height / BLOCK_SIZE);
        let blocks = columns as usize * rows as usize;
        if blocks > MAX_BLOCKS {
            return Err(ConversionError::TooManyBlocks(blocks));
        }
        Ok((columns, rows))
    }

    /// Read the block at block coordinates `x`, `y`. Returns `None` for
    /// transparent blocks.
    fn read_block(
        &self,
        image: &RgbaImage,
        x: u32,
        y: u32,
        check_embedded: bool,
        warnings: &mut Vec<BlockWarning>,
    ) -> Result<Option<Block>> {
        let model = self.platform.color_model();
        let capacity = self.platform.palette_size();

        let mut transparent = 0;
        let mut pixels = [model.encode(0, 0, 0); TILE_PIXELS];
        let mut colors: Vec<Color> = Vec::new();
        for (i, pixel) in pixels.iter_mut().enumerate() {
            let (px, py) = ((i % TILE_SIZE) as u32, (i / TILE_SIZE) as u32);
            let [r, g, b, a] = image.get_pixel(x * BLOCK_SIZE + px, y * BLOCK_SIZE + py).0;
            if a < ALPHA_THRESHOLD {
                transparent += 1;
                if transparent == TRANSPARENT_PIXELS {
                    return Ok(None);
                }
            }
            *pixel = model.encode(r, g, b);
            if !colors.contains(pixel) {
                colors.push(*pixel);
            }
        }

        if colors.len() > capacity {
            warn!(
                "Block {},{} has {} colors, merging down to {}",
                x,
                y,
                colors.len(),
                capacity
            );
            warnings.push(BlockWarning {
                x,
                y,
                colors: colors.len(),
                pixels: imageops::crop_imm(image, x * BLOCK_SIZE, y * BLOCK_SIZE, BLOCK_SIZE, BLOCK_SIZE)
                    .to_image(),
            });
            if warnings.len() > MAX_WARNINGS {
                return Err(ConversionError::TooManyWarnings);
            }
            merge_colors(&mut pixels, &mut colors, capacity);
        }

        let embedded = if check_embedded {
            embedded_palette(&pixels, capacity)
        } else {
            None
        };

        Ok(Some(Block {
            x,
            y,
            pixels,
            colors,
            embedded,
        }))
    }

    fn register_palette(&self, palettes: &mut Vec<Palette>, palette: Palette) -> Result<()> {
        palettes.push(palette);
        if palettes.len() > MAX_PALETTES {
            return Err(ConversionError::TooManyPalettes);
        }
        Ok(())
    }

    /// Register full palettes right away and return the blocks that still
    /// need one
    fn assign_palettes(&self, blocks: &[Block], palettes: &mut Vec<Palette>) -> Result<Vec<usize>> {
        let capacity = self.platform.palette_size();
        let mut pending = Vec::new();
        for (i, block) in blocks.iter().enumerate() {
            if palettes.iter().any(|p| p.has_colors(&block.colors)) {
                continue;
            }
            if block.colors.len() == capacity {
                self.register_palette(palettes, Palette::new(block.colors.clone()))?;
            } else {
                pending.push(i);
            }
        }
        Ok(pending)
    }

    /// Build palettes for pending blocks, largest first, filling each with
    /// the largest pending blocks that still fit. Only absorbed blocks leave
    /// the pool; a block that got its own palette can still be absorbed.
    fn resolve_pending(&self, blocks: &[Block], mut pending: Vec<usize>, palettes: &mut Vec<Palette>) -> Result<()> {
        let capacity = self.platform.palette_size();
        let padding = self.platform.encode_color(PADDING_RGB[0], PADDING_RGB[1], PADDING_RGB[2]);

        pending.sort_by_key(|&i| std::cmp::Reverse(blocks[i].colors.len()));
        let mut available = vec![true; pending.len()];
        debug!("{} blocks waiting for a palette", pending.len());

        for current in 0..pending.len() {
            let block = &blocks[pending[current]];
            if palettes.iter().any(|p| p.has_colors(&block.colors)) {
                continue;
            }

            let mut colors = block.colors.clone();
            while colors.len() < capacity {
                let room = capacity - colors.len();
                let Some(next) = (0..pending.len())
                    .find(|&j| j != current && available[j] && blocks[pending[j]].colors.len() <= room)
                else {
                    break;
                };
                available[next] = false;
                for color in &blocks[pending[next]].colors {
                    if !colors.contains(color) {
                        colors.push(*color);
                    }
                }
            }
            colors.resize(capacity, padding);

            let mut palette = Palette::new(colors);
            palette.sort_by_luma();
            self.register_palette(palettes, palette)?;
        }
        Ok(())
    }

    /// Turn blocks into tiles and fill the map
    fn build_tiles(
        &self,
        blocks: &[Block],
        tileset: &mut Tileset,
        mut map: Option<&mut Map>,
        embedded_rows: u32,
    ) -> Result<()> {
        let capacity = self.platform.palette_size();
        for block in blocks {
            let mut candidates: Vec<Tile> = Vec::new();
            for index in 0..tileset.palette_count() {
                let (Some(id), Some(palette)) = (tileset.palette_id(index), tileset.palette(index)) else {
                    continue;
                };
                if !palette.has_colors(&block.colors) {
                    continue;
                }
                let tile = Tile::new(block_indices(block, palette), id, capacity)?;
                if !candidates.iter().any(|other| other.equals(&tile)) {
                    candidates.push(tile);
                }
            }

            let tile = candidates
                .first()
                .cloned()
                .ok_or(ConversionError::UnknownPalette)?;
            let id = tileset.push_tile(tile, candidates);
            if let Some(map) = map.as_deref_mut() {
                map.set_cell(
                    block.x,
                    block.y - embedded_rows,
                    MapCell {
                        tile: id,
                        flip: Flip::NONE,
                    },
                )?;
            }
        }
        Ok(())
    }
}

/// Merge the least distinct colors until `capacity` remain. The rarer color
/// of each pair is replaced; on equal counts the second one goes.
fn merge_colors(pixels: &mut [Color; TILE_PIXELS], colors: &mut Vec<Color>, capacity: usize) {
    while colors.len() > capacity {
        let Some(pair) = closest_pair(colors.as_slice()) else {
            break;
        };
        let (first, second) = (colors[pair.first], colors[pair.second]);
        let count = |color: Color| pixels.iter().filter(|&&p| p == color).count();

        let (keep, removed, removed_index) = if count(first) < count(second) {
            (second, first, pair.first)
        } else {
            (first, second, pair.second)
        };
        for pixel in pixels.iter_mut().filter(|p| **p == removed) {
            *pixel = keep;
        }
        colors.remove(removed_index);
    }
}

/// Quadrant colors if the block is a checker of `capacity` solid quadrants
/// using at least two colors
fn embedded_palette(pixels: &[Color; TILE_PIXELS], capacity: usize) -> Option<Vec<Color>> {
    let (size, columns) = quadrant_layout(capacity)?;
    let mut colors = Vec::with_capacity(capacity);
    for quadrant in 0..capacity {
        let start_x = size * (quadrant % columns);
        let start_y = size * (quadrant / columns);
        let color = pixels[start_y * TILE_SIZE + start_x];
        for y in start_y..start_y + size {
            for x in start_x..start_x + size {
                if pixels[y * TILE_SIZE + x] != color {
                    return None;
                }
            }
        }
        colors.push(color);
    }
    colors
        .iter()
        .any(|color| *color != colors[0])
        .then_some(colors)
}

/// Color indices of a block in a palette that holds all its colors
fn block_indices(block: &Block, palette: &Palette) -> Pixels {
    let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
    for (i, color) in block.pixels.iter().enumerate() {
        pixels[i / TILE_SIZE][i % TILE_SIZE] = palette.color_index(color).unwrap_or(0) as u8;
    }
    pixels
}
