//! Shade derivation for brand colors
//!
//! Variants are produced by a **linear per-channel add**: the same integer
//! amount is added to R, G and B independently and each channel is clamped to
//! `0..=255`. This is not a perceptual lightness transform. Near the channel
//! limits the clamp makes the operation lossy, so `shade(shade(c, -a), a)`
//! only returns `c` when no channel clamped.

use lumen_core::{ColorParseError, HexColor};

/// Shift every channel of `color` by `amount`, clamping to `0..=255`
pub fn shade(color: HexColor, amount: i32) -> HexColor {
    let channels = color
        .channels()
        .map(|channel| i32::from(channel).saturating_add(amount).clamp(0, 255) as u8);
    HexColor::from_channels(channels)
}

/// String form of [`shade`]: parses `color` and returns lowercase `#rrggbb`
pub fn shade_hex(color: &str, amount: i32) -> Result<String, ColorParseError> {
    Ok(shade(HexColor::parse(color)?, amount).to_string())
}

/// Semantic shade variant keys
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ShadeVariant {
    Base,
    Hover,
    Active,
    Lighter,
    Dark,
}

impl ShadeVariant {
    /// Per-channel offset applied to the base color
    pub const fn amount(self) -> i32 {
        match self {
            Self::Base => 0,
            Self::Hover => -10,
            Self::Active => -30,
            Self::Lighter => 20,
            Self::Dark => -20,
        }
    }

    /// Suffix appended to the role name in style variable names
    pub const fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Base => None,
            Self::Hover => Some("hover"),
            Self::Active => Some("active"),
            Self::Lighter => Some("lighter"),
            Self::Dark => Some("dark"),
        }
    }

    pub fn all() -> &'static [ShadeVariant] {
        const VARIANTS: [ShadeVariant; 5] = [
            ShadeVariant::Base,
            ShadeVariant::Dark,
            ShadeVariant::Lighter,
            ShadeVariant::Hover,
            ShadeVariant::Active,
        ];
        &VARIANTS
    }
}

/// The fixed variant set derived from one base color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadeSet {
    pub base: HexColor,
    pub hover: HexColor,
    pub active: HexColor,
    pub lighter: HexColor,
    pub dark: HexColor,
}

impl ShadeSet {
    pub fn derive(base: HexColor) -> Self {
        Self {
            base: shade(base, ShadeVariant::Base.amount()),
            hover: shade(base, ShadeVariant::Hover.amount()),
            active: shade(base, ShadeVariant::Active.amount()),
            lighter: shade(base, ShadeVariant::Lighter.amount()),
            dark: shade(base, ShadeVariant::Dark.amount()),
        }
    }

    /// Get a color by variant key
    pub fn get(&self, variant: ShadeVariant) -> HexColor {
        match variant {
            ShadeVariant::Base => self.base,
            ShadeVariant::Hover => self.hover,
            ShadeVariant::Active => self.active,
            ShadeVariant::Lighter => self.lighter,
            ShadeVariant::Dark => self.dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vector() {
        assert_eq!(shade_hex("#1f6feb", -10).unwrap(), "#1565e1");
    }

    #[test]
    fn test_zero_is_identity() {
        for hex in [0x000000, 0xffffff, 0x1f6feb, 0x0a0b0c, 0xf0f0f0] {
            let c = HexColor::from_hex(hex);
            assert_eq!(shade(c, 0), c);
        }
    }

    #[test]
    fn test_clamps_each_channel_independently() {
        let c = HexColor::rgb(5, 128, 250);
        assert_eq!(shade(c, -10), HexColor::rgb(0, 118, 240));
        assert_eq!(shade(c, 10), HexColor::rgb(15, 138, 255));
        assert_eq!(shade(c, i32::MAX), HexColor::WHITE);
        assert_eq!(shade(c, i32::MIN), HexColor::BLACK);
    }

    #[test]
    fn test_round_trip_exact_without_clamping() {
        let c = HexColor::from_hex(0x405060);
        for amount in [1, 15, 30, 60] {
            assert_eq!(shade(shade(c, -amount), amount), c);
        }
    }

    #[test]
    fn test_round_trip_lossy_at_boundary() {
        let c = HexColor::rgb(5, 100, 100);
        assert_ne!(shade(shade(c, -10), 10), c);
    }

    #[test]
    fn test_output_always_six_digits() {
        for hex in [0x000000, 0x010203, 0xfefefe] {
            for amount in [-300, -30, -1, 0, 1, 20, 300] {
                let out = shade(HexColor::from_hex(hex), amount).to_string();
                assert_eq!(out.len(), 7, "{out}");
                assert!(out[1..].chars().all(|c| c.is_ascii_hexdigit()));
            }
        }
    }

    #[test]
    fn test_shade_set_offsets() {
        let set = ShadeSet::derive(HexColor::from_hex(0x1f6feb));
        assert_eq!(set.base.to_string(), "#1f6feb");
        assert_eq!(set.hover.to_string(), "#1565e1");
        assert_eq!(set.active.to_string(), "#0151cd");
        assert_eq!(set.lighter.to_string(), "#3383ff");
        assert_eq!(set.dark.to_string(), "#0b5bd7");
        assert_eq!(set.get(ShadeVariant::Hover), set.hover);
    }
}
