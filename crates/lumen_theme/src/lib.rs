//! Lumen Theme
//!
//! Resolves the application's color theme from three sources and keeps the
//! render surface in sync with it.
//!
//! # Overview
//!
//! - **Remote settings**: backend-held `theme` settings, fetched only while
//!   the user is authenticated ([`SettingsClient`])
//! - **Local cache**: the last resolved theme, persisted in a
//!   [`KeyValueStorage`](lumen_platform::KeyValueStorage) ([`ThemeCache`])
//! - **System preference**: the OS dark/light signal ([`PreferenceSignal`])
//!
//! Precedence is remote, then cache, then system preference with built-in
//! colors. The merged [`EffectiveTheme`] is persisted and pushed into a
//! [`RenderTarget`] as style variables with derived shades.
//!
//! # Quick Start
//!
//! ```rust
//! use lumen_platform::MemoryStorage;
//! use lumen_theme::{
//!     ColorScheme, OfflineClient, PreferenceSignal, RecordingTarget, ThemeMode, ThemeStore,
//! };
//! use std::rc::Rc;
//!
//! let target = RecordingTarget::new();
//! let signal = Rc::new(PreferenceSignal::new(ColorScheme::Dark));
//! let store = ThemeStore::new(OfflineClient, MemoryStorage::new(), target.clone(), signal);
//! store.init();
//!
//! assert_eq!(store.mode(), ThemeMode::System);
//! assert!(store.is_dark());
//! assert_eq!(target.variable("--primary").as_deref(), Some("#1f6feb"));
//!
//! store.toggle_theme();
//! assert_eq!(store.mode(), ThemeMode::Light);
//! ```
//!
//! # Concurrency
//!
//! Everything runs on one thread. Reconciliations are `async` and may
//! overlap; each carries a generation number and a result is dropped if a
//! newer run or an explicit user change happened while it was pending.

pub mod error;
pub mod persistence;
pub mod platform;
pub mod presets;
pub mod reconcile;
pub mod settings;
pub mod sink;
pub mod state;
pub mod theme;
pub mod tokens;
pub mod watcher;

// Re-export commonly used types
pub use error::{FetchError, Result, ThemeError};
pub use persistence::{CachedRecord, ThemeCache};
pub use platform::detect_system_color_scheme;
pub use presets::ThemePreset;
pub use reconcile::{Generation, ReconcilePhase, ReconciliationEngine, Resolution, ThemeSource};
pub use settings::{OfflineClient, RemoteSettingsSnapshot, SettingsClient, ThemeSettings};
pub use sink::{style_variables, ApplicationSink, RecordingTarget, RenderTarget, SinkOp, StyleVariables};
pub use state::{ThemeEvent, ThemeStore};
pub use theme::{ColorScheme, EffectiveTheme, ThemeColors, ThemeMode, UnknownMode};
pub use tokens::*;
pub use watcher::{PreferenceSignal, SchemeObserver, SystemPreferenceMonitor};
