//! Color types and utilities for console graphics.
//!
//! This module contains color-related functionality including:
//! - `ColorModel`, the native color encodings used by the supported hardware
//! - `Color`, a native color value with its derived RGB24 form
//! - `Lab` and the CIEDE2000 perceptual color difference
//! - closest pair search used when a block has too many colors

use std::hash::{Hash, Hasher};

use itertools::Itertools;
use serde::{Serialize, Serializer};

/// Gray levels of the monochrome handheld, lightest first
const GRAYSCALE_SHADES: [u8; 4] = [255, 170, 85, 0];
/// Divisor between an 8-bit channel and a 5-bit channel
const RESCALE_24_TO_15: f64 = 8.22580645161291;
/// Divisor between an 8-bit channel and a 4-bit channel
const RESCALE_24_TO_12: f64 = 17.0;
const BIT5_MASK: u16 = 0b0001_1111;
const BIT4_MASK: u16 = 0b0000_1111;

/// Native color encoding of a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    /// 2-bit shade index into four fixed gray levels
    Grayscale2,
    /// 5 bits per channel, red in the low bits
    Rgb15,
    /// 4 bits per channel, red in the low bits
    Rgb12,
}

impl ColorModel {
    /// Number of significant bits in a native value
    pub fn bits(self) -> u32 {
        match self {
            ColorModel::Grayscale2 => 2,
            ColorModel::Rgb15 => 15,
            ColorModel::Rgb12 => 12,
        }
    }

    /// Whether palettes of this model are exported as 16-bit words
    pub fn is_word_sized(self) -> bool {
        !matches!(self, ColorModel::Grayscale2)
    }

    /// Encode an RGB24 color to the nearest native value
    pub fn encode(self, r: u8, g: u8, b: u8) -> Color {
        let native = match self {
            ColorModel::Grayscale2 => {
                let gray = 0.3 * r as f64 + 0.59 * g as f64 + 0.11 * b as f64;
                // earlier shade wins on equal distance
                let mut best = 0;
                for (i, shade) in GRAYSCALE_SHADES.iter().enumerate().skip(1) {
                    if (*shade as f64 - gray).abs() < (GRAYSCALE_SHADES[best] as f64 - gray).abs() {
                        best = i;
                    }
                }
                best as u16
            }
            ColorModel::Rgb15 => {
                let to5 = |c: u8| ((c as f64 / RESCALE_24_TO_15).round() as u16) & BIT5_MASK;
                to5(r) | (to5(g) << 5) | (to5(b) << 10)
            }
            ColorModel::Rgb12 => {
                let to4 = |c: u8| ((c as f64 / RESCALE_24_TO_12).round() as u16) & BIT4_MASK;
                to4(r) | (to4(g) << 4) | (to4(b) << 8)
            }
        };
        self.from_native(native)
    }

    /// Decode a native value to RGB24
    pub fn decode(self, native: u16) -> [u8; 3] {
        match self {
            ColorModel::Grayscale2 => {
                let shade = GRAYSCALE_SHADES[(native & 0x03) as usize];
                [shade, shade, shade]
            }
            ColorModel::Rgb15 => {
                let to8 = |c: u16| (c as f64 * RESCALE_24_TO_15).round() as u8;
                [
                    to8(native & BIT5_MASK),
                    to8((native >> 5) & BIT5_MASK),
                    to8((native >> 10) & BIT5_MASK),
                ]
            }
            ColorModel::Rgb12 => {
                let to8 = |c: u16| (c as f64 * RESCALE_24_TO_12).round() as u8;
                [
                    to8(native & BIT4_MASK),
                    to8((native >> 4) & BIT4_MASK),
                    to8((native >> 8) & BIT4_MASK),
                ]
            }
        }
    }

    /// Build a color from a native value, dropping bits the model does not use
    pub fn from_native(self, native: u16) -> Color {
        let native = native & ((1 << self.bits()) - 1);
        Color {
            native,
            rgb: self.decode(native),
        }
    }
}

/// A platform-native color and its RGB24 equivalent.
///
/// Two colors are equal when their native values are equal.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Color {
    native: u16,
    rgb: [u8; 3],
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.native == other.native
    }
}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.native.hash(state);
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.native, self.to_hex24()).serialize(serializer)
    }
}

impl Color {
    /// Native value as stored by the hardware
    pub fn native(&self) -> u16 {
        self.native
    }

    /// RGB24 components
    pub fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    /// Perceived brightness, used to order palettes
    pub fn luma(&self) -> f64 {
        let [r, g, b] = self.rgb;
        0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
    }

    pub fn to_hex24(&self) -> String {
        hex::encode(self.rgb)
    }

    pub fn lab(&self) -> Lab {
        let [r, g, b] = self.rgb;
        Lab::from_rgb(r, g, b)
    }
}

/// CIE L*a*b* color (D65 white point, 2° observer)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    pub fn new(l: f64, a: f64, b: f64) -> Self {
        Lab { l, a, b }
    }

    /// Convert from sRGB through XYZ
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let linear = |c: u8| {
            let c = c as f64 / 255.0;
            let c = if c > 0.04045 {
                ((c + 0.055) / 1.055).powf(2.4)
            } else {
                c / 12.92
            };
            c * 100.0
        };
        let (r, g, b) = (linear(r), linear(g), linear(b));

        let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
        let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
        let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

        let f = |t: f64| {
            if t > 0.008856 {
                t.powf(1.0 / 3.0)
            } else {
                7.787 * t + 16.0 / 116.0
            }
        };
        let fx = f(x / 95.047);
        let fy = f(y / 100.0);
        let fz = f(z / 108.883);

        Lab {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }
}

/// Hue angle in degrees within [0, 360)
fn hue_degrees(b: f64, a: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    let h = b.atan2(a).to_degrees();
    if h >= 0.0 {
        h
    } else {
        h + 360.0
    }
}

/// Calculate the CIEDE2000 difference between two Lab colors.
///
/// Follows Sharma, Wu and Dalal, "The CIEDE2000 Color-Difference Formula:
/// Implementation Notes, Supplementary Test Data, and Mathematical
/// Observations", with kL = kC = kH = 1.
pub fn ciede2000(c1: Lab, c2: Lab) -> f64 {
    const POW25_7: f64 = 6_103_515_625.0; // 25^7

    let chroma1 = (c1.a * c1.a + c1.b * c1.b).sqrt();
    let chroma2 = (c2.a * c2.a + c2.b * c2.b).sqrt();
    let mean_chroma = (chroma1 + chroma2) / 2.0;

    let g = 0.5 * (1.0 - (mean_chroma.powi(7) / (mean_chroma.powi(7) + POW25_7)).sqrt());

    let a1p = (1.0 + g) * c1.a;
    let a2p = (1.0 + g) * c2.a;
    let c1p = (a1p * a1p + c1.b * c1.b).sqrt();
    let c2p = (a2p * a2p + c2.b * c2.b).sqrt();
    let h1p = hue_degrees(c1.b, a1p);
    let h2p = hue_degrees(c2.b, a2p);

    let delta_lp = c2.l - c1.l;
    let delta_cp = c2p - c1p;

    let chroma_product = c1p * c2p;
    let delta_hp = if chroma_product == 0.0 {
        0.0
    } else if (h2p - h1p).abs() <= 180.0 {
        h2p - h1p
    } else if h2p - h1p > 180.0 {
        h2p - h1p - 360.0
    } else {
        h2p - h1p + 360.0
    };
    let delta_big_hp = 2.0 * chroma_product.sqrt() * (delta_hp.to_radians() / 2.0).sin();

    let mean_lp = (c1.l + c2.l) / 2.0;
    let mean_cp = (c1p + c2p) / 2.0;
    let mean_hp = if chroma_product == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        (h1p + h2p) / 2.0
    } else if h1p + h2p < 360.0 {
        (h1p + h2p + 360.0) / 2.0
    } else {
        (h1p + h2p - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (mean_hp - 30.0).to_radians().cos()
        + 0.24 * (2.0 * mean_hp).to_radians().cos()
        + 0.32 * (3.0 * mean_hp + 6.0).to_radians().cos()
        - 0.20 * (4.0 * mean_hp - 63.0).to_radians().cos();
    let delta_theta = 30.0 * (-((mean_hp - 275.0) / 25.0).powi(2)).exp();
    let r_c = 2.0 * (mean_cp.powi(7) / (mean_cp.powi(7) + POW25_7)).sqrt();
    let l50 = (mean_lp - 50.0).powi(2);
    let s_l = 1.0 + (0.015 * l50) / (20.0 + l50).sqrt();
    let s_c = 1.0 + 0.045 * mean_cp;
    let s_h = 1.0 + 0.015 * mean_cp * t;
    let r_t = -r_c * (2.0 * delta_theta).to_radians().sin();

    let dl = delta_lp / s_l;
    let dc = delta_cp / s_c;
    let dh = delta_big_hp / s_h;
    (dl * dl + dc * dc + dh * dh + r_t * dc * dh).sqrt()
}

/// Perceptual difference between two native colors
pub fn color_difference(a: &Color, b: &Color) -> f64 {
    ciede2000(a.lab(), b.lab())
}

/// The two least distinct colors of a set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPair {
    pub first: usize,
    pub second: usize,
    pub difference: f64,
}

/// Find the pair of colors with the smallest non-zero CIEDE2000 difference.
///
/// Pairs are scanned in index order and only a strictly smaller difference
/// replaces the current best, so the first pair found wins ties.
pub fn closest_pair(colors: &[Color]) -> Option<ClosestPair> {
    let labs = colors.iter().map(Color::lab).collect::<Vec<_>>();
    let mut best: Option<ClosestPair> = None;

    for (i, j) in (0..labs.len()).tuple_combinations() {
        let difference = ciede2000(labs[i], labs[j]);
        if difference == 0.0 {
            continue;
        }
        if best.map_or(true, |b| difference < b.difference) {
            best = Some(ClosestPair {
                first: i,
                second: j,
                difference,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ciede2000_reference_pairs() {
        // Sharma et al. supplementary test data
        let pairs = [
            (
                Lab::new(50.0, 2.6772, -79.7751),
                Lab::new(50.0, 0.0, -82.7485),
                2.0425,
            ),
            (Lab::new(50.0, 0.0, 0.0), Lab::new(50.0, -1.0, 2.0), 2.3669),
            (Lab::new(50.0, 2.5, 0.0), Lab::new(73.0, 25.0, -18.0), 27.1492),
            (
                Lab::new(60.2574, -34.0099, 36.2677),
                Lab::new(60.4626, -34.1751, 39.4387),
                1.2644,
            ),
        ];
        for (a, b, expected) in pairs {
            assert_abs_diff_eq!(ciede2000(a, b), expected, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_ciede2000_identity_and_symmetry() {
        let model = ColorModel::Rgb15;
        let colors = [
            model.encode(255, 0, 0),
            model.encode(12, 200, 99),
            model.encode(0, 0, 0),
            model.encode(250, 250, 250),
        ];
        for a in &colors {
            assert_eq!(color_difference(a, a), 0.0);
            for b in &colors {
                assert_abs_diff_eq!(color_difference(a, b), color_difference(b, a), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_grayscale_encoding() {
        let model = ColorModel::Grayscale2;
        assert_eq!(model.encode(255, 255, 255).native(), 0);
        assert_eq!(model.encode(170, 170, 170).native(), 1);
        assert_eq!(model.encode(90, 80, 85).native(), 2);
        assert_eq!(model.encode(0, 0, 0).native(), 3);
        assert_eq!(model.encode(128, 128, 128).native(), 1);
        assert_eq!(model.from_native(2).rgb(), [85, 85, 85]);
    }

    #[test]
    fn test_rgb15_encoding() {
        let model = ColorModel::Rgb15;
        assert_eq!(model.encode(255, 255, 255).native(), 0x7fff);
        assert_eq!(model.encode(255, 0, 0).native(), 0x001f);
        assert_eq!(model.encode(0, 255, 0).native(), 0x03e0);
        assert_eq!(model.encode(0, 0, 255).native(), 0x7c00);
        assert_eq!(model.encode(255, 0, 255).rgb(), [255, 0, 255]);
    }

    #[test]
    fn test_rgb12_encoding() {
        let model = ColorModel::Rgb12;
        assert_eq!(model.encode(255, 255, 255).native(), 0x0fff);
        assert_eq!(model.encode(0, 0, 255).native(), 0x0f00);
        assert_eq!(model.encode(17, 34, 51).native(), 0x0321);
        assert_eq!(model.from_native(0x0321).rgb(), [17, 34, 51]);
    }

    #[test]
    fn test_encoding_is_stable_after_one_pass() {
        for model in [ColorModel::Grayscale2, ColorModel::Rgb15, ColorModel::Rgb12] {
            for r in (0..=255u8).step_by(7) {
                for g in (0..=255u8).step_by(11) {
                    for b in (0..=255u8).step_by(13) {
                        let first = model.encode(r, g, b);
                        let [r2, g2, b2] = first.rgb();
                        assert_eq!(model.encode(r2, g2, b2), first, "{model:?} {r} {g} {b}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_equality_uses_native_value() {
        let model = ColorModel::Rgb15;
        assert_eq!(model.encode(255, 0, 0), model.encode(254, 1, 2));
        assert_ne!(model.encode(255, 0, 0), model.encode(0, 0, 0));
    }

    #[test]
    fn test_closest_pair() {
        let model = ColorModel::Rgb15;
        let colors = [
            model.encode(0, 0, 0),
            model.encode(255, 255, 255),
            model.encode(255, 0, 0),
            model.encode(240, 0, 0),
        ];
        let pair = closest_pair(&colors).unwrap();
        assert_eq!((pair.first, pair.second), (2, 3));
        assert!(pair.difference > 0.0);
    }

    #[test]
    fn test_closest_pair_first_wins_ties() {
        let model = ColorModel::Grayscale2;
        // (0,1), (0,3), (1,2) and (2,3) are all the same white/light gray pair
        let colors = [
            model.from_native(0),
            model.from_native(1),
            model.from_native(0),
            model.from_native(1),
        ];
        let pair = closest_pair(&colors).unwrap();
        assert_eq!((pair.first, pair.second), (0, 1));
    }

    #[test]
    fn test_closest_pair_needs_two_distinct_colors() {
        let model = ColorModel::Rgb12;
        assert!(closest_pair(&[]).is_none());
        assert!(closest_pair(&[model.encode(1, 2, 3)]).is_none());
    }
}
