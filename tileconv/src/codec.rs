//! Bit packing of tiles and palettes.
//!
//! Two tile layouts are used by the supported hardware:
//! - planar: one byte per bitplane per row, bitplanes interleaved in pairs
//!   (2bpp: 16 bytes; 4bpp: two 16-byte groups, low pair then high pair)
//! - packed: 2 bits per pixel, 4 pixels per byte, each row stored as a
//!   little-endian 16-bit word (right half first)

use crate::tile::{Pixels, TILE_SIZE};

/// Bytes taken by one pair of bitplanes of a tile
const PLANE_PAIR_BYTES: usize = TILE_SIZE * 2;

/// Encoded palette data, either shade bytes or 16-bit color words
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteData {
    Bytes(Vec<u8>),
    Words(Vec<u16>),
}

impl PaletteData {
    /// Raw bytes, words split low byte first
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            PaletteData::Bytes(bytes) => bytes.clone(),
            PaletteData::Words(words) => words.iter().flat_map(|w| w.to_le_bytes()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PaletteData::Bytes(bytes) => bytes.len(),
            PaletteData::Words(words) => words.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Encode a tile as interleaved bitplanes (`bpp` is 2 or 4)
pub fn encode_planar(pixels: &Pixels, bpp: usize) -> Vec<u8> {
    let mut data = vec![0u8; PLANE_PAIR_BYTES * bpp / 2];
    for (y, row) in pixels.iter().enumerate() {
        for (x, &color_index) in row.iter().enumerate() {
            for plane in 0..bpp {
                let bit = (color_index >> plane) & 0x01;
                let offset = (plane / 2) * PLANE_PAIR_BYTES + y * 2 + plane % 2;
                data[offset] |= bit << (7 - x);
            }
        }
    }
    data
}

/// Inverse of [`encode_planar`]; `data` must hold `8 * bpp` bytes
pub fn decode_planar(data: &[u8], bpp: usize) -> Pixels {
    let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
    for (y, row) in pixels.iter_mut().enumerate() {
        for (x, color_index) in row.iter_mut().enumerate() {
            for plane in 0..bpp {
                let offset = (plane / 2) * PLANE_PAIR_BYTES + y * 2 + plane % 2;
                *color_index |= ((data[offset] >> (7 - x)) & 0x01) << plane;
            }
        }
    }
    pixels
}

/// Encode a 2bpp tile as packed pixels.
///
/// Each row is a 16-bit word with the leftmost pixel in the top two bits,
/// stored low byte first: the byte holding pixels 4-7 precedes the byte
/// holding pixels 0-3.
pub fn encode_packed(pixels: &Pixels) -> Vec<u8> {
    let mut data = Vec::with_capacity(PLANE_PAIR_BYTES);
    for row in pixels {
        let word = row
            .iter()
            .fold(0u16, |word, &color_index| (word << 2) | (color_index & 0x03) as u16);
        data.extend_from_slice(&word.to_le_bytes());
    }
    data
}

/// Inverse of [`encode_packed`]; `data` must hold 16 bytes
pub fn decode_packed(data: &[u8]) -> Pixels {
    let mut pixels = [[0u8; TILE_SIZE]; TILE_SIZE];
    for (row, bytes) in pixels.iter_mut().zip(data.chunks_exact(2)) {
        let word = u16::from_le_bytes([bytes[0], bytes[1]]);
        for (x, color_index) in row.iter_mut().enumerate() {
            *color_index = ((word >> (14 - 2 * x)) & 0x03) as u8;
        }
    }
    pixels
}
