//! Remote settings snapshot and the client that fetches it

use crate::error::{FetchError, ThemeError};
use crate::theme::{ThemeMode, DEFAULT_ACCENT, DEFAULT_BACKGROUND, DEFAULT_PRIMARY};
use lumen_core::HexColor;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Source of the backend-held settings
///
/// Implementations perform the network round trip; the engine awaits
/// `fetch_settings` only while the user is authenticated.
#[allow(async_fn_in_trait)]
pub trait SettingsClient {
    async fn fetch_settings(&self) -> Result<RemoteSettingsSnapshot, FetchError>;
}

/// Client for hosts without a settings service; every fetch fails
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineClient;

impl SettingsClient for OfflineClient {
    async fn fetch_settings(&self) -> Result<RemoteSettingsSnapshot, FetchError> {
        Err(FetchError::Network("no settings service configured".into()))
    }
}

/// `theme` sub-object of the remote settings
///
/// Unknown fields are ignored and missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeSettings {
    /// Kept as raw JSON so out-of-range values can be reported and coerced
    pub mode: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub primary_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub accent_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub background_color: Option<String>,
    #[serde(deserialize_with = "lenient_true")]
    pub enable_dark_mode: bool,
    #[serde(deserialize_with = "lenient")]
    pub default_dark_mode: bool,
    #[serde(deserialize_with = "lenient")]
    pub enable_custom_fonts: bool,
    #[serde(deserialize_with = "lenient")]
    pub custom_font: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub custom_logo_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub enable_custom_styles: bool,
    #[serde(rename = "customCSS", deserialize_with = "lenient")]
    pub custom_css: Option<String>,
    #[serde(deserialize_with = "lenient_true")]
    pub show_logo: bool,
    #[serde(deserialize_with = "lenient_true")]
    pub show_user_avatar: bool,
    #[serde(deserialize_with = "lenient")]
    pub menu_style: Option<String>,
}

/// Field decoder that never fails: `null` or a value of the wrong type
/// becomes `T::default()`
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(raw).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring mistyped remote theme field");
        T::default()
    }))
}

/// [`lenient`] for flags that default to on
fn lenient_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Bool(flag) => flag,
        Value::Null => true,
        other => {
            tracing::warn!(value = %other, "ignoring mistyped remote theme flag");
            true
        }
    })
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            mode: None,
            primary_color: None,
            accent_color: None,
            background_color: None,
            enable_dark_mode: true,
            default_dark_mode: false,
            enable_custom_fonts: false,
            custom_font: None,
            custom_logo_url: None,
            enable_custom_styles: false,
            custom_css: None,
            show_logo: true,
            show_user_avatar: true,
            menu_style: None,
        }
    }
}

impl ThemeSettings {
    /// The explicit mode, accepted only when it is `light` or `dark`
    pub fn explicit_mode(&self) -> Result<ThemeMode, ThemeError> {
        let invalid = |value: String| ThemeError::Validation {
            field: "mode",
            value,
        };
        match &self.mode {
            Some(Value::String(raw)) => match raw.parse::<ThemeMode>() {
                Ok(mode @ (ThemeMode::Light | ThemeMode::Dark)) => Ok(mode),
                _ => Err(invalid(raw.clone())),
            },
            Some(other) => Err(invalid(other.to_string())),
            None => Err(invalid("<missing>".into())),
        }
    }

    pub fn primary(&self) -> HexColor {
        parse_color("primaryColor", self.primary_color.as_deref(), DEFAULT_PRIMARY)
    }

    pub fn accent(&self) -> HexColor {
        parse_color("accentColor", self.accent_color.as_deref(), DEFAULT_ACCENT)
    }

    pub fn background(&self) -> HexColor {
        parse_color(
            "backgroundColor",
            self.background_color.as_deref(),
            DEFAULT_BACKGROUND,
        )
    }

    /// Whether the backend asks for dark rendering regardless of mode
    pub fn default_dark_override(&self) -> bool {
        self.enable_dark_mode && self.default_dark_mode
    }
}

fn parse_color(field: &'static str, raw: Option<&str>, fallback: HexColor) -> HexColor {
    match raw.map(HexColor::parse) {
        Some(Ok(color)) => color,
        Some(Err(err)) => {
            let err = ThemeError::from(err);
            tracing::warn!(field, error = %err, "ignoring invalid remote color");
            fallback
        }
        None => fallback,
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default, deserialize_with = "lenient")]
    theme: Option<ThemeSettings>,
}

/// Backend-held settings as last fetched
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteSettingsSnapshot {
    theme: Option<ThemeSettings>,
    raw: Value,
}

impl RemoteSettingsSnapshot {
    /// Interpret a settings document; `null` is an empty snapshot
    pub fn from_value(raw: Value) -> Result<Self, FetchError> {
        let theme = if raw.is_null() {
            None
        } else {
            Envelope::deserialize(&raw)?.theme
        };
        Ok(Self { theme, raw })
    }

    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        Self::from_value(serde_json::from_str(body)?)
    }

    /// The theme sub-object, if present
    pub fn theme(&self) -> Option<&ThemeSettings> {
        self.theme.as_ref()
    }

    /// The full document, unknown fields included
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}
