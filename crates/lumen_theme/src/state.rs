//! Theme store
//!
//! [`ThemeStore`] is the one authoritative holder of the [`EffectiveTheme`].
//! It is an explicit object with an `init()`/`dispose()` lifecycle, shared as
//! `Rc<ThemeStore<_>>` with whatever needs it, and driven by discrete
//! [`ThemeEvent`]s rather than re-running on every render.
//!
//! All state lives in `Cell`/`RefCell` and is only touched between awaits,
//! so reconciliations may interleave on one thread without locking.

use crate::persistence::ThemeCache;
use crate::reconcile::{ReconcilePhase, ReconciliationEngine, Resolution};
use crate::settings::SettingsClient;
use crate::sink::{ApplicationSink, RenderTarget};
use crate::theme::{ColorScheme, EffectiveTheme, ThemeColors, ThemeMode};
use crate::watcher::{PreferenceSignal, SchemeObserver, SystemPreferenceMonitor};
use lumen_platform::KeyValueStorage;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Events that trigger a reconciliation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeEvent {
    /// The host's authentication state changed (or was first observed)
    AuthStateChanged(bool),
    /// Re-run with the last known auth state, even if already `Ready`
    ManualRefreshRequested,
}

/// Authoritative theme state plus its collaborators
pub struct ThemeStore<C> {
    engine: ReconciliationEngine<C>,
    cache: ThemeCache,
    sink: RefCell<ApplicationSink>,
    monitor: SystemPreferenceMonitor,
    theme: RefCell<EffectiveTheme>,
}

impl<C: SettingsClient + 'static> ThemeStore<C> {
    /// Build the store with the best theme available without waiting:
    /// the cached record if any, else the OS preference and built-in colors
    pub fn new(
        client: C,
        storage: impl KeyValueStorage + 'static,
        target: impl RenderTarget + 'static,
        signal: Rc<PreferenceSignal>,
    ) -> Rc<Self> {
        let cache = ThemeCache::new(storage);
        let initial = crate::reconcile::resolve_local(&cache.load(), signal.current());

        Rc::new(Self {
            engine: ReconciliationEngine::new(client),
            cache,
            sink: RefCell::new(ApplicationSink::new(target)),
            monitor: SystemPreferenceMonitor::new(signal),
            theme: RefCell::new(initial.theme),
        })
    }

    /// Mount the OS preference listener and paint the initial theme
    ///
    /// Calling `init` again after `dispose` re-mounts exactly one listener.
    pub fn init(self: &Rc<Self>) {
        self.monitor.mount(Rc::downgrade(self));
        self.apply_current();
        tracing::debug!(mode = %self.mode(), "theme store initialized");
    }

    /// Release the OS preference listener
    pub fn dispose(&self) {
        self.monitor.unmount();
        tracing::debug!("theme store disposed");
    }

    pub fn is_mounted(&self) -> bool {
        self.monitor.is_mounted()
    }

    // ========== Events ==========

    pub async fn dispatch(&self, event: ThemeEvent) -> EffectiveTheme {
        match event {
            ThemeEvent::AuthStateChanged(authenticated) => self.reconcile(authenticated).await,
            ThemeEvent::ManualRefreshRequested => {
                let authenticated = self.engine.last_auth().unwrap_or(false);
                self.run(authenticated).await
            }
        }
    }

    /// Reconcile for an auth state; a no-op if already `Ready` for it
    pub async fn reconcile(&self, authenticated: bool) -> EffectiveTheme {
        if self.engine.is_settled_for(authenticated) {
            tracing::trace!(authenticated, "reconcile: already settled");
            return self.theme();
        }
        self.run(authenticated).await
    }

    async fn run(&self, authenticated: bool) -> EffectiveTheme {
        let generation = self.engine.begin(authenticated);
        let cached = self.cache.load();

        let Resolution {
            mut theme,
            source,
            snapshot,
        } = self
            .engine
            .resolve(authenticated, &cached, self.monitor.current())
            .await;

        if !self.engine.settle(generation) {
            return self.theme();
        }

        // The OS preference may have moved while the fetch was pending
        theme.recompute(self.monitor.current());

        if let Err(err) = self.cache.store_theme(&theme) {
            tracing::warn!(error = %err, "failed to persist theme");
        }
        if let Some(raw) = snapshot {
            if let Err(err) = self.cache.store_snapshot(&raw) {
                tracing::warn!(error = %err, "failed to mirror remote settings");
            }
        }

        tracing::debug!(
            generation = generation.get(),
            ?source,
            mode = %theme.mode(),
            is_dark = theme.is_dark(),
            "reconcile: ready"
        );
        self.replace(theme)
    }

    // ========== Explicit changes ==========

    /// Record an explicit mode; an explicit choice also clears the remote
    /// default-dark override and supersedes any pending reconciliation
    pub fn set_mode(&self, mode: ThemeMode) -> EffectiveTheme {
        self.engine.supersede();
        let os = self.monitor.current();
        let theme = {
            let mut theme = self.theme.borrow().clone();
            theme.set_mode(mode, os);
            theme.clear_default_dark_override(os);
            theme
        };

        if let Err(err) = self.cache.store_theme(&theme) {
            tracing::warn!(error = %err, "failed to persist theme mode");
        }
        tracing::debug!(%mode, "theme mode set");
        self.replace(theme)
    }

    /// Replace the brand colors; the theme name is re-derived from presets
    pub fn set_colors(&self, colors: ThemeColors) -> EffectiveTheme {
        self.engine.supersede();
        let theme = {
            let mut theme = self.theme.borrow().clone();
            theme.set_colors(colors.renamed());
            theme
        };

        if let Err(err) = self.cache.store_colors(theme.colors()) {
            tracing::warn!(error = %err, "failed to persist theme colors");
        }
        self.replace(theme)
    }

    /// Set the dark/light companion flag used by `Custom` mode
    pub fn set_custom_dark(&self, custom_dark: bool) -> EffectiveTheme {
        self.engine.supersede();
        let theme = {
            let mut theme = self.theme.borrow().clone();
            theme.set_custom_dark(custom_dark, self.monitor.current());
            theme
        };

        if let Err(err) = self.cache.store_theme(&theme) {
            tracing::warn!(error = %err, "failed to persist custom dark flag");
        }
        self.replace(theme)
    }

    /// Flip between explicit light and dark based on what is shown now
    pub fn toggle_theme(&self) -> EffectiveTheme {
        let next = ColorScheme::from_prefers_dark(self.is_dark()).toggle();
        self.set_mode(next.into())
    }

    // ========== Access ==========

    pub fn theme(&self) -> EffectiveTheme {
        self.theme.borrow().clone()
    }

    /// The selected mode, which stays `System` when nothing was cached or
    /// fetched. Use [`EffectiveTheme::resolved_scheme`] (or [`Self::is_dark`])
    /// for the scheme actually rendered, e.g. dark when the OS prefers dark.
    pub fn mode(&self) -> ThemeMode {
        self.theme.borrow().mode()
    }

    pub fn is_dark(&self) -> bool {
        self.theme.borrow().is_dark()
    }

    pub fn colors(&self) -> ThemeColors {
        self.theme.borrow().colors().clone()
    }

    pub fn phase(&self) -> ReconcilePhase {
        self.engine.phase()
    }

    pub fn engine(&self) -> &ReconciliationEngine<C> {
        &self.engine
    }

    pub fn cache(&self) -> &ThemeCache {
        &self.cache
    }

    pub fn signal(&self) -> &Rc<PreferenceSignal> {
        self.monitor.signal()
    }

    /// Number of times the sink has painted a theme
    pub fn applied_count(&self) -> u64 {
        self.sink.borrow().applied_count()
    }

    fn replace(&self, theme: EffectiveTheme) -> EffectiveTheme {
        *self.theme.borrow_mut() = theme.clone();
        self.sink.borrow_mut().apply(&theme);
        theme
    }

    fn apply_current(&self) {
        let theme = self.theme();
        self.sink.borrow_mut().apply(&theme);
    }
}

impl<C: SettingsClient + 'static> SchemeObserver for ThemeStore<C> {
    /// OS changes only matter while no explicit mode is recorded
    fn system_scheme_changed(&self, scheme: ColorScheme) {
        if self.mode().is_explicit() {
            tracing::trace!(?scheme, mode = %self.mode(), "ignoring OS change, explicit mode set");
            return;
        }

        let theme = {
            let mut theme = self.theme.borrow().clone();
            theme.recompute(scheme);
            theme
        };
        self.replace(theme);
    }
}

impl<C> fmt::Debug for ThemeStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("engine", &self.engine)
            .field("monitor", &self.monitor)
            .field("theme", &self.theme.borrow())
            .finish_non_exhaustive()
    }
}
