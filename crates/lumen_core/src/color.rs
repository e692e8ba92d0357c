//! 24-bit hex colors

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a hex color string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Wrong number of hex digits (3 or 6 expected after an optional `#`)
    #[error("invalid hex color length {len} in {input:?}")]
    InvalidLength { input: String, len: usize },

    /// A character that is not a hex digit
    #[error("invalid hex digit {digit:?} in {input:?}")]
    InvalidDigit { input: String, digit: char },
}

/// An opaque sRGB color with 8 bits per channel
///
/// The canonical string form is lowercase `#rrggbb`. Parsing accepts
/// `#rrggbb`, `rrggbb`, and the `#rgb` shorthand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const WHITE: HexColor = HexColor::rgb(0xff, 0xff, 0xff);
    pub const BLACK: HexColor = HexColor::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value (upper byte ignored)
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Packed `0xRRGGBB` value
    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub const fn from_channels(channels: [u8; 3]) -> Self {
        Self::rgb(channels[0], channels[1], channels[2])
    }

    /// Parse a hex color string
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if let Some(digit) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit {
                input: input.to_string(),
                digit,
            });
        }

        let value = match digits.len() {
            6 => u32::from_str_radix(digits, 16).map_err(|_| ColorParseError::InvalidLength {
                input: input.to_string(),
                len: digits.len(),
            })?,
            3 => {
                // #abc -> #aabbcc
                let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
                u32::from_str_radix(&expanded, 16).map_err(|_| {
                    ColorParseError::InvalidLength {
                        input: input.to_string(),
                        len: digits.len(),
                    }
                })?
            }
            len => {
                return Err(ColorParseError::InvalidLength {
                    input: input.to_string(),
                    len,
                })
            }
        };

        Ok(Self::from_hex(value))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        HexColor::parse(&raw).map_err(serde::de::Error::custom)
    }
}
