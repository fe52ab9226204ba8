//! Errors raised while converting images and editing tilesets.

use std::io;

use thiserror::Error;

use crate::platform::Platform;

/// Broad category of a [`ConversionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input or an invalid index/argument.
    Validation,
    /// A hard capacity limit was exceeded.
    Capacity,
    /// Reading or writing files failed.
    Io,
}

/// Errors that can occur during image conversion
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Invalid image dimensions {0}x{1} (width and height must be divisible by 8)")]
    InvalidDimensions(u32, u32),

    #[error("Too many blocks in the image: {0} (maximum is {max})", max = crate::extract::MAX_BLOCKS)]
    TooManyBlocks(usize),

    #[error("Too many blocks exceed the color limit of the platform (more than {max})", max = crate::extract::MAX_WARNINGS)]
    TooManyWarnings,

    #[error("Too many palettes in the image (maximum is {max})", max = crate::extract::MAX_PALETTES)]
    TooManyPalettes,

    #[error("No quantizable tiles found")]
    NothingToQuantize,

    #[error("Invalid tile index {0}")]
    InvalidTileIndex(usize),

    #[error("Invalid palette index {0}")]
    InvalidPaletteIndex(usize),

    #[error("Invalid color index {0}")]
    InvalidColorIndex(usize),

    #[error("Pixel {0},{1} is outside the tile")]
    InvalidPixel(usize, usize),

    #[error("Invalid alternate {alternate} for tile {tile}")]
    InvalidAlternate { tile: usize, alternate: usize },

    #[error("Palette has {actual} colors, {platform} palettes hold {expected}")]
    PaletteSize {
        platform: Platform,
        expected: usize,
        actual: usize,
    },

    #[error("Tile references a palette that is not part of the tileset")]
    UnknownPalette,

    #[error("Cannot remove the only existing palette")]
    LastPalette,

    #[error("Map cell {0},{1} is outside the map")]
    InvalidMapCell(u32, u32),

    #[error("Map contains invalid tile indexes (greater than 0xff)")]
    MapIndexOverflow,

    #[error("{0} has no map format")]
    NoMapFormat(Platform),

    #[error("{0} map has no separate attribute table")]
    NoAttributes(Platform),

    #[error("Invalid {platform} tile data: {actual} bytes (expected {expected})")]
    TileDataLength {
        platform: Platform,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid {0} palette data")]
    PaletteData(Platform),

    #[error("Failed to read image: {0}")]
    ImageReadError(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ConversionError {
    /// Category of the error, used by callers to decide how to present it.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::TooManyBlocks(_)
            | ConversionError::TooManyWarnings
            | ConversionError::TooManyPalettes
            | ConversionError::NothingToQuantize => ErrorKind::Capacity,
            ConversionError::ImageReadError(_)
            | ConversionError::IoError(_)
            | ConversionError::JsonError(_) => ErrorKind::Io,
            _ => ErrorKind::Validation,
        }
    }
}

pub type Result<T, E = ConversionError> = std::result::Result<T, E>;
