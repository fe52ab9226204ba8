//! Convert images into tiles, palettes and maps for retro console graphics
//! hardware.
//!
//! Supported platforms are the monochrome and color Game Boy, the Super
//! Famicom and the Neo Geo Pocket Color. An image is cut into 8x8 blocks;
//! every block becomes a tile drawn with one of a small number of
//! fixed-size palettes, and the block layout becomes a tile map.
//!
//! ```no_run
//! use tileconv::{Platform, Session};
//!
//! let session = Session::open("hero.png", Platform::GameBoyColor, true)?;
//! let tiles = session.tileset().export_tiles();
//! # Ok::<(), tileconv::ConversionError>(())
//! ```

pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod handle;
pub mod map;
pub mod palette;
pub mod platform;
pub mod session;
pub mod tile;
pub mod tileset;

pub use codec::PaletteData;
pub use color::{Color, ColorModel};
pub use config::{Config, OutputFormat};
pub use error::{ConversionError, ErrorKind, Result};
pub use export::{DataKind, ExportLine};
pub use extract::{BlockWarning, Extraction, TilesetExtractor};
pub use handle::{PaletteId, TileId};
pub use map::{Map, MapCell};
pub use palette::Palette;
pub use platform::{MapFormat, Platform};
pub use session::{Report, Session};
pub use tile::{Flip, Tile};
pub use tileset::{Duplicate, Tileset};
