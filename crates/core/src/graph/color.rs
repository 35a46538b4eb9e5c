//! Per-function block coloring.
//!
//! Each function in the payload gets one color from a light-luminosity
//! palette with hues spread evenly over the full circle, so adjacent
//! functions stay visually distinguishable. The color is broadcast to every
//! block address the function lists.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::Address;

/// Saturation/lightness of the palette's light tier.
const PALETTE_SATURATION: f64 = 0.55;
const PALETTE_LIGHTNESS: f64 = 0.75;

/// An RGB color, serialized as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Convert from HSL. Hue in degrees, saturation/lightness in `0..=1`.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let (r1, g1, b1) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self { r: channel(r1), g: channel(g1), b: channel(b1) }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| D::Error::custom(format!("invalid color string {s:?}")))
    }
}

/// Generate `count` perceptually-spaced colors at the light tier.
pub fn palette(count: usize) -> Vec<Color> {
    (0..count)
        .map(|i| {
            let hue = 360.0 * i as f64 / count as f64;
            Color::from_hsl(hue, PALETTE_SATURATION, PALETTE_LIGHTNESS)
        })
        .collect()
}

/// Map every listed block address to its owning function's color.
///
/// Colors are assigned in the map's iteration order (ascending address). A
/// block address appearing under more than one function keeps the
/// later-processed function's color; the upstream domain leaves that
/// priority unspecified.
pub fn assign_colors(functions: &BTreeMap<Address, Vec<Address>>) -> BTreeMap<Address, Color> {
    let colors = palette(functions.len());
    let mut block_to_color = BTreeMap::new();
    for (color, blocks) in colors.into_iter().zip(functions.values()) {
        for &block in blocks {
            block_to_color.insert(block, color);
        }
    }
    block_to_color
}
