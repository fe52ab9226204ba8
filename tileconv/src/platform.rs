//! Target hardware descriptions.
//!
//! Each platform fixes a palette capacity, a native color model, a tile
//! layout and, optionally, a map layout with per-cell attributes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{self, PaletteData};
use crate::color::{Color, ColorModel};
use crate::error::{ConversionError, Result};
use crate::palette::Palette;
use crate::tile::{Flip, Pixels};

/// Mask applied to the palette number stored in a map attribute byte
const ATTRIBUTE_PALETTE_MASK: u8 = 0x07;

/// Supported graphics hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Monochrome handheld
    #[serde(rename = "dmg")]
    GameBoy,
    /// Color handheld
    #[serde(rename = "cgb")]
    GameBoyColor,
    /// 16-bit home console
    #[serde(rename = "sfc")]
    SuperFamicom,
    /// Rival color handheld
    #[serde(rename = "ngpc")]
    NeoGeoPocketColor,
}

/// How a platform stores its tile map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFormat {
    /// Tile indices only
    Indices,
    /// Tile indices plus a separate table of attribute bytes
    SeparateAttributes { flip_x: u8, flip_y: u8 },
    /// Index byte and attribute byte interleaved per cell
    Interleaved { flip_x: u8, flip_y: u8 },
}

impl MapFormat {
    /// Whether map cells can carry flip flags
    pub fn has_flip_attributes(self) -> bool {
        !matches!(self, MapFormat::Indices)
    }

    /// Attribute byte for a cell, zero for formats without attributes
    pub fn attribute(self, palette_index: usize, flip: Flip) -> u8 {
        let (flip_x, flip_y) = match self {
            MapFormat::Indices => return 0,
            MapFormat::SeparateAttributes { flip_x, flip_y }
            | MapFormat::Interleaved { flip_x, flip_y } => (flip_x, flip_y),
        };
        let mut attribute = palette_index as u8 & ATTRIBUTE_PALETTE_MASK;
        if flip.x {
            attribute |= flip_x;
        }
        if flip.y {
            attribute |= flip_y;
        }
        attribute
    }
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::GameBoy,
        Platform::GameBoyColor,
        Platform::SuperFamicom,
        Platform::NeoGeoPocketColor,
    ];

    /// Short identifier used on the command line and in config files
    pub fn id(self) -> &'static str {
        match self {
            Platform::GameBoy => "dmg",
            Platform::GameBoyColor => "cgb",
            Platform::SuperFamicom => "sfc",
            Platform::NeoGeoPocketColor => "ngpc",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::GameBoy => "Game Boy",
            Platform::GameBoyColor => "Game Boy Color",
            Platform::SuperFamicom => "Super Famicom",
            Platform::NeoGeoPocketColor => "Neo Geo Pocket Color",
        }
    }

    /// Number of colors in every palette
    pub fn palette_size(self) -> usize {
        match self {
            Platform::SuperFamicom => 16,
            _ => 4,
        }
    }

    pub fn bits_per_pixel(self) -> usize {
        match self {
            Platform::SuperFamicom => 4,
            _ => 2,
        }
    }

    pub fn bytes_per_tile(self) -> usize {
        self.bits_per_pixel() * 8
    }

    pub fn color_model(self) -> ColorModel {
        match self {
            Platform::GameBoy => ColorModel::Grayscale2,
            Platform::GameBoyColor | Platform::SuperFamicom => ColorModel::Rgb15,
            Platform::NeoGeoPocketColor => ColorModel::Rgb12,
        }
    }

    pub fn map_format(self) -> Option<MapFormat> {
        match self {
            Platform::GameBoy => Some(MapFormat::Indices),
            Platform::GameBoyColor => Some(MapFormat::SeparateAttributes {
                flip_x: 0x20,
                flip_y: 0x40,
            }),
            Platform::SuperFamicom => Some(MapFormat::Interleaved {
                flip_x: 0x40,
                flip_y: 0x80,
            }),
            Platform::NeoGeoPocketColor => None,
        }
    }

    /// Whether map cells carry palette and flip attributes
    pub fn allows_map_attributes(self) -> bool {
        self.map_format()
            .is_some_and(MapFormat::has_flip_attributes)
    }

    /// Encode an RGB24 color for this platform
    pub fn encode_color(self, r: u8, g: u8, b: u8) -> Color {
        self.color_model().encode(r, g, b)
    }

    /// Palette used when raw tiles are imported without one
    pub fn default_palette(self) -> Palette {
        let model = self.color_model();
        let colors = match self {
            Platform::GameBoy => (0..4).map(|shade| model.from_native(shade)).collect(),
            Platform::GameBoyColor => [(224, 248, 208), (136, 192, 112), (52, 104, 86), (8, 24, 32)]
                .iter()
                .map(|&(r, g, b)| model.encode(r, g, b))
                .collect(),
            Platform::SuperFamicom => (0..16u8)
                .map(|i| {
                    let level = 255 - i * 17;
                    model.encode(level, level, level)
                })
                .collect(),
            Platform::NeoGeoPocketColor => {
                [(240, 240, 240), (176, 176, 180), (80, 80, 88), (32, 32, 40)]
                    .iter()
                    .map(|&(r, g, b)| model.encode(r, g, b))
                    .collect()
            }
        };
        Palette::new(colors)
    }

    /// Encode tile pixels to the platform's tile bytes
    pub fn encode_tile(self, pixels: &Pixels) -> Vec<u8> {
        match self {
            Platform::NeoGeoPocketColor => codec::encode_packed(pixels),
            _ => codec::encode_planar(pixels, self.bits_per_pixel()),
        }
    }

    /// Decode tile bytes produced by [`Platform::encode_tile`]
    pub fn decode_tile(self, data: &[u8]) -> Result<Pixels> {
        if data.len() != self.bytes_per_tile() {
            return Err(ConversionError::TileDataLength {
                platform: self,
                expected: self.bytes_per_tile(),
                actual: data.len(),
            });
        }
        Ok(match self {
            Platform::NeoGeoPocketColor => codec::decode_packed(data),
            _ => codec::decode_planar(data, self.bits_per_pixel()),
        })
    }

    /// Encode a palette: one shade byte on the monochrome handheld, one
    /// word per color elsewhere
    pub fn encode_palette(self, palette: &Palette) -> Result<PaletteData> {
        self.check_palette_size(palette.len())?;
        if self.color_model().is_word_sized() {
            return Ok(PaletteData::Words(
                palette.colors().iter().map(Color::native).collect(),
            ));
        }
        let byte = palette
            .colors()
            .iter()
            .fold(0u8, |byte, color| (byte << 2) | (color.native() as u8 & 0x03));
        Ok(PaletteData::Bytes(vec![byte]))
    }

    /// Decode palette data produced by [`Platform::encode_palette`]
    pub fn decode_palette(self, data: &PaletteData) -> Result<Palette> {
        let model = self.color_model();
        let colors: Vec<Color> = match (data, model.is_word_sized()) {
            (PaletteData::Bytes(bytes), false) if bytes.len() == 1 => (0..4)
                .map(|i| model.from_native(((bytes[0] >> (6 - 2 * i)) & 0x03) as u16))
                .collect(),
            (PaletteData::Words(words), true) => {
                words.iter().map(|&word| model.from_native(word)).collect()
            }
            _ => return Err(ConversionError::PaletteData(self)),
        };
        self.check_palette_size(colors.len())?;
        Ok(Palette::new(colors))
    }

    /// Reject palettes whose length differs from the platform capacity
    pub fn check_palette_size(self, actual: usize) -> Result<()> {
        if actual != self.palette_size() {
            return Err(ConversionError::PaletteSize {
                platform: self,
                expected: self.palette_size(),
                actual,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|platform| platform.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown platform '{s}' (expected dmg, cgb, sfc or ngpc)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TILE_SIZE;

    #[test]
    fn test_capacities() {
        assert_eq!(Platform::GameBoy.palette_size(), 4);
        assert_eq!(Platform::GameBoyColor.palette_size(), 4);
        assert_eq!(Platform::SuperFamicom.palette_size(), 16);
        assert_eq!(Platform::NeoGeoPocketColor.palette_size(), 4);
        assert_eq!(Platform::SuperFamicom.bytes_per_tile(), 32);
        assert_eq!(Platform::NeoGeoPocketColor.bytes_per_tile(), 16);
    }

    #[test]
    fn test_parse_platform() {
        assert_eq!("sfc".parse::<Platform>(), Ok(Platform::SuperFamicom));
        assert_eq!("NGPC".parse::<Platform>(), Ok(Platform::NeoGeoPocketColor));
        assert!("nes".parse::<Platform>().is_err());
        for platform in Platform::ALL {
            assert_eq!(platform.id().parse::<Platform>(), Ok(platform));
        }
    }

    #[test]
    fn test_map_attributes() {
        assert!(!Platform::GameBoy.allows_map_attributes());
        assert!(Platform::GameBoyColor.allows_map_attributes());
        assert!(Platform::SuperFamicom.allows_map_attributes());
        assert!(Platform::NeoGeoPocketColor.map_format().is_none());

        let cgb = Platform::GameBoyColor.map_format().unwrap();
        assert_eq!(cgb.attribute(3, Flip::new(true, false)), 0x23);
        assert_eq!(cgb.attribute(9, Flip::new(false, true)), 0x41);
        let sfc = Platform::SuperFamicom.map_format().unwrap();
        assert_eq!(sfc.attribute(2, Flip::new(true, true)), 0xc2);
        assert_eq!(MapFormat::Indices.attribute(2, Flip::new(true, true)), 0);
    }

    #[test]
    fn test_monochrome_palette_byte() {
        let platform = Platform::GameBoy;
        let data = platform.encode_palette(&platform.default_palette()).unwrap();
        // shades 0, 1, 2, 3 at bit offsets 6, 4, 2, 0
        assert_eq!(data, PaletteData::Bytes(vec![0x1b]));
        assert_eq!(platform.decode_palette(&data).unwrap(), platform.default_palette());
    }

    #[test]
    fn test_color_palette_words() {
        let platform = Platform::GameBoyColor;
        let model = platform.color_model();
        let palette = Palette::new(vec![
            model.encode(255, 255, 255),
            model.encode(255, 0, 0),
            model.encode(0, 255, 0),
            model.encode(0, 0, 0),
        ]);
        let data = platform.encode_palette(&palette).unwrap();
        assert_eq!(data, PaletteData::Words(vec![0x7fff, 0x001f, 0x03e0, 0x0000]));
        assert_eq!(platform.decode_palette(&data).unwrap(), palette);
    }

    #[test]
    fn test_palette_size_is_checked() {
        let short = Palette::new(Platform::GameBoyColor.default_palette().colors()[..3].to_vec());
        assert!(matches!(
            Platform::GameBoyColor.encode_palette(&short),
            Err(ConversionError::PaletteSize { expected: 4, actual: 3, .. })
        ));
        assert!(Platform::SuperFamicom
            .decode_palette(&PaletteData::Words(vec![0; 4]))
            .is_err());
        assert!(Platform::GameBoy
            .decode_palette(&PaletteData::Words(vec![0; 4]))
            .is_err());
    }

    #[test]
    fn test_default_palettes_fit_capacity() {
        for platform in Platform::ALL {
            let palette = platform.default_palette();
            assert_eq!(palette.len(), platform.palette_size(), "{platform}");
            assert!(platform.encode_palette(&palette).is_ok());
        }
        let sfc = Platform::SuperFamicom.default_palette();
        assert_eq!(sfc.colors()[0].rgb(), [255, 255, 255]);
        assert_eq!(sfc.colors()[15].rgb(), [0, 0, 0]);
    }

    #[test]
    fn test_tile_codecs() {
        let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
        pixels[0] = [0, 1, 2, 3, 3, 2, 1, 0];
        pixels[7][7] = 3;
        for platform in Platform::ALL {
            let data = platform.encode_tile(&pixels);
            assert_eq!(data.len(), platform.bytes_per_tile());
            assert_eq!(platform.decode_tile(&data).unwrap(), pixels, "{platform}");
        }
        // packed row 0 1 2 3 | 3 2 1 0 is word 0x1be4, low byte first
        let ngpc = Platform::NeoGeoPocketColor.encode_tile(&pixels);
        assert_eq!(&ngpc[0..2], &[0xe4, 0x1b]);
        let dmg = Platform::GameBoy.encode_tile(&pixels);
        assert_eq!(&dmg[0..2], &[0x5a, 0x3c]);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert!(matches!(
            Platform::SuperFamicom.decode_tile(&[0; 16]),
            Err(ConversionError::TileDataLength { expected: 32, actual: 16, .. })
        ));
    }
}
