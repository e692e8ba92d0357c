//! System color scheme detection
//!
//! Best-effort query of the desktop's dark-mode preference. Anything that
//! cannot be determined resolves to [`ColorScheme::Light`].

use crate::theme::ColorScheme;

/// Environment override checked before any platform query (`light` / `dark`)
pub const SCHEME_ENV: &str = "LUMEN_COLOR_SCHEME";

/// Detect the current system color scheme
pub fn detect_system_color_scheme() -> ColorScheme {
    if let Some(scheme) = std::env::var(SCHEME_ENV)
        .ok()
        .as_deref()
        .and_then(parse_scheme_name)
    {
        tracing::debug!(?scheme, "color scheme from {SCHEME_ENV}");
        return scheme;
    }

    let detected = platform_scheme();
    tracing::debug!(?detected, "detected system color scheme");
    detected.unwrap_or_default()
}

#[cfg(target_os = "linux")]
fn platform_scheme() -> Option<ColorScheme> {
    if let Some(scheme) = std::env::var("GTK_THEME").ok().as_deref().and_then(parse_gtk_theme) {
        return Some(scheme);
    }

    let output = std::process::Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_gsettings_color_scheme(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(target_os = "macos")]
fn platform_scheme() -> Option<ColorScheme> {
    // Exits non-zero when the key is unset, which means light
    let output = std::process::Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .ok()?;
    Some(parse_apple_interface_style(
        output.status.success(),
        &String::from_utf8_lossy(&output.stdout),
    ))
}

#[cfg(target_os = "windows")]
fn platform_scheme() -> Option<ColorScheme> {
    let output = std::process::Command::new("reg")
        .args([
            "query",
            r"HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize",
            "/v",
            "AppsUseLightTheme",
        ])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_windows_apps_use_light_theme(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn platform_scheme() -> Option<ColorScheme> {
    None
}

/// `light` / `dark`, case-insensitive
pub fn parse_scheme_name(raw: &str) -> Option<ColorScheme> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "dark" => Some(ColorScheme::Dark),
        "light" => Some(ColorScheme::Light),
        _ => None,
    }
}

/// `GTK_THEME=Adwaita:dark` style values
pub fn parse_gtk_theme(raw: &str) -> Option<ColorScheme> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(ColorScheme::from_prefers_dark(
        raw.to_ascii_lowercase().ends_with(":dark"),
    ))
}

/// Output of `gsettings get org.gnome.desktop.interface color-scheme`
pub fn parse_gsettings_color_scheme(raw: &str) -> Option<ColorScheme> {
    match raw.trim().trim_matches('\'') {
        "prefer-dark" => Some(ColorScheme::Dark),
        "prefer-light" | "default" => Some(ColorScheme::Light),
        _ => None,
    }
}

/// Output of `defaults read -g AppleInterfaceStyle`
pub fn parse_apple_interface_style(key_present: bool, raw: &str) -> ColorScheme {
    ColorScheme::from_prefers_dark(key_present && raw.trim().eq_ignore_ascii_case("dark"))
}

/// Output of the `AppsUseLightTheme` registry query
pub fn parse_windows_apps_use_light_theme(raw: &str) -> Option<ColorScheme> {
    let value = raw
        .lines()
        .find(|line| line.contains("AppsUseLightTheme"))?
        .split_whitespace()
        .last()?;
    match value {
        "0x0" => Some(ColorScheme::Dark),
        "0x1" => Some(ColorScheme::Light),
        _ => None,
    }
}
