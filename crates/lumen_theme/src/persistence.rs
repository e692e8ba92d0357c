//! Local cache of the last resolved theme
//!
//! The cache is a mirror, never a source of truth on its own: malformed
//! entries are logged, discarded and treated as misses.

use crate::error::{Result, ThemeError};
use crate::theme::{EffectiveTheme, ThemeColors, ThemeMode};
use lumen_platform::KeyValueStorage;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Persisted mode, plain string (`light`, `dark`, `system`, `custom`)
pub const MODE_KEY: &str = "themeMode";
/// Persisted colors, JSON `{primaryColor, accentColor, backgroundColor, themeName}`
pub const COLORS_KEY: &str = "themeColors";
/// Full remote settings mirror for other consumers
pub const SNAPSHOT_KEY: &str = "systemSettings";
/// Dark/light companion flag for `custom` mode, JSON bool
pub const CUSTOM_DARK_KEY: &str = "themeCustomDark";

/// What the cache currently holds; each part may be missing independently
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CachedRecord {
    pub mode: Option<ThemeMode>,
    pub colors: Option<ThemeColors>,
    pub custom_dark: Option<bool>,
}

impl CachedRecord {
    /// Nothing usable was cached
    pub fn is_empty(&self) -> bool {
        self.mode.is_none() && self.colors.is_none()
    }
}

/// Typed access to the persisted theme keys
pub struct ThemeCache {
    storage: Box<dyn KeyValueStorage>,
}

impl ThemeCache {
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Read the cached record, discarding anything that fails to decode
    pub fn load(&self) -> CachedRecord {
        CachedRecord {
            mode: self.recover(MODE_KEY, self.read_mode()),
            colors: self.recover(COLORS_KEY, self.read_json(COLORS_KEY)),
            custom_dark: self.recover(CUSTOM_DARK_KEY, self.read_json(CUSTOM_DARK_KEY)),
        }
    }

    /// Persist mode, colors, and the custom companion flag of a resolved theme
    pub fn store_theme(&self, theme: &EffectiveTheme) -> Result<()> {
        self.store_mode(theme.mode())?;
        self.store_colors(theme.colors())?;
        if theme.mode() == ThemeMode::Custom {
            self.write_json(CUSTOM_DARK_KEY, &theme.custom_dark())?;
        }
        Ok(())
    }

    pub fn store_mode(&self, mode: ThemeMode) -> Result<()> {
        self.storage.set(MODE_KEY, mode.as_str())?;
        Ok(())
    }

    pub fn store_colors(&self, colors: &ThemeColors) -> Result<()> {
        self.write_json(COLORS_KEY, colors)
    }

    pub fn store_snapshot(&self, raw: &Value) -> Result<()> {
        self.write_json(SNAPSHOT_KEY, raw)
    }

    /// The mirrored remote settings document, if one was stored
    pub fn snapshot(&self) -> Option<Value> {
        self.recover(SNAPSHOT_KEY, self.read_json(SNAPSHOT_KEY))
    }

    /// Forget every theme key
    pub fn clear(&self) -> Result<()> {
        for key in [MODE_KEY, COLORS_KEY, SNAPSHOT_KEY, CUSTOM_DARK_KEY] {
            self.storage.remove(key)?;
        }
        Ok(())
    }

    fn read_mode(&self) -> Result<Option<ThemeMode>> {
        let Some(raw) = self.storage.get(MODE_KEY)? else {
            return Ok(None);
        };
        raw.parse::<ThemeMode>()
            .map(Some)
            .map_err(|_| ThemeError::Validation {
                field: MODE_KEY,
                value: raw,
            })
    }

    fn read_json<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| ThemeError::CacheParse { key, source })
    }

    /// Serialize fully before touching storage so a failed encode writes nothing
    fn write_json<T: serde::Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<()> {
        let encoded =
            serde_json::to_string(value).map_err(|source| ThemeError::CacheEncode { key, source })?;
        self.storage.set(key, &encoded)?;
        Ok(())
    }

    fn recover<T>(&self, key: &'static str, read: Result<Option<T>>) -> Option<T> {
        match read {
            Ok(value) => value,
            Err(err @ (ThemeError::CacheParse { .. } | ThemeError::Validation { .. })) => {
                tracing::warn!(key, error = %err, "discarding malformed cache entry");
                if let Err(err) = self.storage.remove(key) {
                    tracing::warn!(key, error = %err, "failed to discard cache entry");
                }
                None
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "cache read failed");
                None
            }
        }
    }
}

impl fmt::Debug for ThemeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ColorScheme;
    use lumen_core::HexColor;
    use lumen_platform::MemoryStorage;

    #[test]
    fn test_empty_storage_is_cache_miss() {
        let cache = ThemeCache::new(MemoryStorage::new());
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_store_and_load_theme() {
        let storage = MemoryStorage::new();
        let cache = ThemeCache::new(storage.clone());
        let colors = ThemeColors::new(
            HexColor::from_hex(0x0969da),
            HexColor::from_hex(0x1b7c83),
            HexColor::from_hex(0xf6f8fa),
        );
        let theme = EffectiveTheme::new(ThemeMode::Dark, colors.clone(), ColorScheme::Light);

        cache.store_theme(&theme).unwrap();

        assert_eq!(storage.get(MODE_KEY).unwrap().as_deref(), Some("dark"));
        let record = cache.load();
        assert_eq!(record.mode, Some(ThemeMode::Dark));
        assert_eq!(record.colors, Some(colors));
        assert_eq!(record.colors.unwrap().theme_name, "ocean");
        assert_eq!(record.custom_dark, None);
    }

    #[test]
    fn test_custom_mode_persists_companion_flag() {
        let cache = ThemeCache::new(MemoryStorage::new());
        let theme = EffectiveTheme::new(ThemeMode::Custom, ThemeColors::default(), ColorScheme::Light)
            .with_custom_dark(true, ColorScheme::Light);

        cache.store_theme(&theme).unwrap();
        assert_eq!(cache.load().custom_dark, Some(true));
    }

    #[test]
    fn test_malformed_entries_are_discarded() {
        let storage = MemoryStorage::new();
        storage.set(MODE_KEY, "sepia").unwrap();
        storage.set(COLORS_KEY, "{\"primaryColor\": \"#1f6f").unwrap();

        let cache = ThemeCache::new(storage.clone());
        assert!(cache.load().is_empty());

        // Discarded, not repaired
        assert_eq!(storage.get(MODE_KEY).unwrap(), None);
        assert_eq!(storage.get(COLORS_KEY).unwrap(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_colors_with_invalid_hex_are_discarded() {
        let storage = MemoryStorage::new();
        storage
            .set(
                COLORS_KEY,
                r##"{"primaryColor":"blue","accentColor":"#8957e5","backgroundColor":"#ffffff"}"##,
            )
            .unwrap();

        let cache = ThemeCache::new(storage);
        assert_eq!(cache.load().colors, None);
    }

    #[test]
    fn test_snapshot_mirror() {
        let storage = MemoryStorage::new();
        let cache = ThemeCache::new(storage.clone());
        let raw = serde_json::json!({ "theme": { "mode": "light" }, "locale": "en" });
        cache.store_snapshot(&raw).unwrap();
        cache.store_mode(ThemeMode::Light).unwrap();
        assert_eq!(storage.len(), 2);
        assert_eq!(cache.snapshot(), Some(raw));

        cache.clear().unwrap();
        assert_eq!(cache.snapshot(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_unencodable_value_is_encode_error() {
        use std::collections::BTreeMap;

        let storage = MemoryStorage::new();
        let cache = ThemeCache::new(storage.clone());
        let bad: BTreeMap<Vec<u8>, i32> = BTreeMap::from([(vec![1], 1)]);

        let err = cache.write_json(SNAPSHOT_KEY, &bad).unwrap_err();
        assert!(matches!(err, ThemeError::CacheEncode { key: SNAPSHOT_KEY, .. }));
        assert!(err.to_string().starts_with("failed to encode systemSettings"));
        assert_eq!(storage.get(SNAPSHOT_KEY).unwrap(), None);
    }
}
