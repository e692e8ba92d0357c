//! Built-in color presets.
//!
//! The catalog only names color pairs for display; it never decides which
//! colors are applied.

use crate::theme::DEFAULT_THEME_NAME;
use lumen_core::HexColor;
use std::fmt::{Display, Formatter};

/// Built-in preset catalog, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemePreset {
    /// Stock blue/purple pair.
    Default,
    Ocean,
    Forest,
    Sunset,
    Violet,
    Slate,
}

impl ThemePreset {
    /// Stable preset id for config/serialization.
    pub fn id(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Ocean => "ocean",
            Self::Forest => "forest",
            Self::Sunset => "sunset",
            Self::Violet => "violet",
            Self::Slate => "slate",
        }
    }

    /// User-facing display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Ocean => "Ocean",
            Self::Forest => "Forest",
            Self::Sunset => "Sunset",
            Self::Violet => "Violet",
            Self::Slate => "Slate",
        }
    }

    pub fn primary(self) -> HexColor {
        match self {
            Self::Default => HexColor::from_hex(0x1f6feb),
            Self::Ocean => HexColor::from_hex(0x0969da),
            Self::Forest => HexColor::from_hex(0x1a7f37),
            Self::Sunset => HexColor::from_hex(0xd1242f),
            Self::Violet => HexColor::from_hex(0x8250df),
            Self::Slate => HexColor::from_hex(0x475569),
        }
    }

    pub fn accent(self) -> HexColor {
        match self {
            Self::Default => HexColor::from_hex(0x8957e5),
            Self::Ocean => HexColor::from_hex(0x1b7c83),
            Self::Forest => HexColor::from_hex(0x4d8a2f),
            Self::Sunset => HexColor::from_hex(0xfb8500),
            Self::Violet => HexColor::from_hex(0xbf3989),
            Self::Slate => HexColor::from_hex(0x64748b),
        }
    }

    /// Full preset list.
    pub fn all() -> &'static [ThemePreset] {
        const PRESETS: [ThemePreset; 6] = [
            ThemePreset::Default,
            ThemePreset::Ocean,
            ThemePreset::Forest,
            ThemePreset::Sunset,
            ThemePreset::Violet,
            ThemePreset::Slate,
        ];
        &PRESETS
    }

    /// Look up a preset by id.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.id() == id)
    }

    /// Reverse lookup: the first preset whose primary and accent both match.
    pub fn find(primary: HexColor, accent: HexColor) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.primary() == primary && p.accent() == accent)
    }

    /// Theme name for a color pair, `"default"` when nothing matches.
    pub fn name_for(primary: HexColor, accent: HexColor) -> &'static str {
        Self::find(primary, accent).map_or(DEFAULT_THEME_NAME, Self::id)
    }
}

impl Display for ThemePreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
