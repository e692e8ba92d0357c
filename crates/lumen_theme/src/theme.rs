//! Theme data model

use crate::presets::ThemePreset;
use lumen_core::HexColor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Concrete light/dark scheme (OS preference signal and rendered result)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Theme mode as chosen by the user, the remote settings, or the system
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    /// No explicit choice recorded; follows the OS preference live
    #[default]
    System,
    /// Custom palette; light unless a companion dark flag is stored
    Custom,
}

impl ThemeMode {
    /// Wire/storage form
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
            Self::Custom => "custom",
        }
    }

    /// Whether the mode is an explicit choice (anything but `System`)
    pub fn is_explicit(self) -> bool {
        self != Self::System
    }
}

impl From<ColorScheme> for ThemeMode {
    fn from(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => Self::Light,
            ColorScheme::Dark => Self::Dark,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized theme mode string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme mode {0:?}")]
pub struct UnknownMode(pub String);

impl FromStr for ThemeMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            "custom" => Ok(Self::Custom),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Brand colors plus the preset name they match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary_color: HexColor,
    pub accent_color: HexColor,
    pub background_color: HexColor,
    #[serde(default = "default_theme_name")]
    pub theme_name: String,
}

pub const DEFAULT_PRIMARY: HexColor = HexColor::from_hex(0x1f6feb);
pub const DEFAULT_ACCENT: HexColor = HexColor::from_hex(0x8957e5);
pub const DEFAULT_BACKGROUND: HexColor = HexColor::WHITE;
pub const DEFAULT_THEME_NAME: &str = "default";

fn default_theme_name() -> String {
    DEFAULT_THEME_NAME.to_string()
}

impl ThemeColors {
    /// Build from the three colors, naming them by preset lookup
    pub fn new(primary: HexColor, accent: HexColor, background: HexColor) -> Self {
        Self {
            primary_color: primary,
            accent_color: accent,
            background_color: background,
            theme_name: ThemePreset::name_for(primary, accent).to_string(),
        }
    }

    /// Recompute `theme_name` from the current primary/accent pair
    pub fn renamed(mut self) -> Self {
        self.theme_name = ThemePreset::name_for(self.primary_color, self.accent_color).to_string();
        self
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self::new(DEFAULT_PRIMARY, DEFAULT_ACCENT, DEFAULT_BACKGROUND)
    }
}

/// The single authoritative resolved configuration applied to the UI
///
/// `is_dark` is derived: every constructor and mutator recomputes it from the
/// other fields plus the OS preference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveTheme {
    mode: ThemeMode,
    colors: ThemeColors,
    /// Stored dark/light companion flag, consulted only in `Custom` mode
    custom_dark: bool,
    /// Remote "default to dark" override
    default_dark_override: bool,
    is_dark: bool,
}

impl EffectiveTheme {
    pub fn new(mode: ThemeMode, colors: ThemeColors, os_scheme: ColorScheme) -> Self {
        let mut theme = Self {
            mode,
            colors,
            custom_dark: false,
            default_dark_override: false,
            is_dark: false,
        };
        theme.recompute(os_scheme);
        theme
    }

    pub fn with_custom_dark(mut self, custom_dark: bool, os_scheme: ColorScheme) -> Self {
        self.custom_dark = custom_dark;
        self.recompute(os_scheme);
        self
    }

    pub fn with_default_dark_override(mut self, enabled: bool, os_scheme: ColorScheme) -> Self {
        self.default_dark_override = enabled;
        self.recompute(os_scheme);
        self
    }

    /// Dark/light policy:
    /// `Dark` mode, or `System` mode while the OS prefers dark, or the
    /// default-dark override. `Custom` uses its stored companion flag.
    pub fn compute_is_dark(&self, os_scheme: ColorScheme) -> bool {
        let by_mode = match self.mode {
            ThemeMode::Dark => true,
            ThemeMode::Light => false,
            ThemeMode::System => os_scheme.is_dark(),
            ThemeMode::Custom => self.custom_dark,
        };
        by_mode || self.default_dark_override
    }

    /// Recompute `is_dark` against a (possibly new) OS preference
    pub fn recompute(&mut self, os_scheme: ColorScheme) {
        self.is_dark = self.compute_is_dark(os_scheme);
    }

    pub fn set_mode(&mut self, mode: ThemeMode, os_scheme: ColorScheme) {
        self.mode = mode;
        self.recompute(os_scheme);
    }

    pub fn set_colors(&mut self, colors: ThemeColors) {
        self.colors = colors;
    }

    pub fn set_custom_dark(&mut self, custom_dark: bool, os_scheme: ColorScheme) {
        self.custom_dark = custom_dark;
        self.recompute(os_scheme);
    }

    pub fn clear_default_dark_override(&mut self, os_scheme: ColorScheme) {
        self.default_dark_override = false;
        self.recompute(os_scheme);
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn colors(&self) -> &ThemeColors {
        &self.colors
    }

    pub fn theme_name(&self) -> &str {
        &self.colors.theme_name
    }

    pub fn is_dark(&self) -> bool {
        self.is_dark
    }

    pub fn custom_dark(&self) -> bool {
        self.custom_dark
    }

    pub fn default_dark_override(&self) -> bool {
        self.default_dark_override
    }

    /// The concrete scheme this theme renders in
    ///
    /// Unlike [`Self::mode`], never `System`: that mode resolves through the
    /// OS preference.
    pub fn resolved_scheme(&self) -> ColorScheme {
        ColorScheme::from_prefers_dark(self.is_dark)
    }
}
