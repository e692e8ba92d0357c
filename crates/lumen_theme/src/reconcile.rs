//! Reconciliation of remote, cached, and system theme sources
//!
//! The engine owns the settings client, the `Uninitialized -> Loading ->
//! Ready` lifecycle, and a monotonically increasing generation counter. Each
//! run captures a [`Generation`] when it begins; when it completes, the result
//! is only kept if no later run (or explicit user change) has advanced the
//! counter in the meantime.

use crate::error::ThemeError;
use crate::persistence::CachedRecord;
use crate::settings::{RemoteSettingsSnapshot, SettingsClient};
use crate::theme::{ColorScheme, EffectiveTheme, ThemeColors, ThemeMode};
use lumen_core::StateMachine;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Reconciliation lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReconcilePhase {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum PhaseEvent {
    Begin,
    Settle,
}

/// Token identifying one reconciliation run
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Which source a resolved theme came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeSource {
    Remote,
    Cache,
    /// No remote and no cache: OS preference and built-in colors
    System,
}

/// Outcome of resolving the sources, before it is persisted and applied
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub theme: EffectiveTheme,
    pub source: ThemeSource,
    /// Full remote document to mirror, when the remote answered
    pub snapshot: Option<Value>,
}

/// Merges the three theme sources into one [`EffectiveTheme`]
pub struct ReconciliationEngine<C> {
    client: C,
    phase: RefCell<StateMachine<ReconcilePhase, PhaseEvent>>,
    generation: Cell<u64>,
    last_auth: Cell<Option<bool>>,
    /// Times the engine entered `Ready`
    completed: Rc<Cell<u64>>,
}

impl<C: SettingsClient> ReconciliationEngine<C> {
    pub fn new(client: C) -> Self {
        use ReconcilePhase::{Loading, Ready, Uninitialized};

        let completed = Rc::new(Cell::new(0));
        let on_ready = completed.clone();

        let phase = StateMachine::builder(Uninitialized)
            .on(Uninitialized, PhaseEvent::Begin, Loading)
            .on(Loading, PhaseEvent::Begin, Loading)
            .on(Ready, PhaseEvent::Begin, Loading)
            .on(Loading, PhaseEvent::Settle, Ready)
            .on_enter(Ready, move || {
                on_ready.set(on_ready.get() + 1);
                tracing::trace!(completed = on_ready.get(), "reconcile: entered ready");
            })
            .build();

        Self {
            client,
            phase: RefCell::new(phase),
            generation: Cell::new(0),
            last_auth: Cell::new(None),
            completed,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn phase(&self) -> ReconcilePhase {
        self.phase.borrow().current_state()
    }

    pub fn generation(&self) -> Generation {
        Generation(self.generation.get())
    }

    /// How many times a run (or a supersede) settled the engine into `Ready`
    pub fn completed_runs(&self) -> u64 {
        self.completed.get()
    }

    /// Auth state of the most recently started run
    pub fn last_auth(&self) -> Option<bool> {
        self.last_auth.get()
    }

    /// A completed run already covers this auth state
    pub fn is_settled_for(&self, authenticated: bool) -> bool {
        self.phase() == ReconcilePhase::Ready && self.last_auth.get() == Some(authenticated)
    }

    /// Start a run: advance the generation and enter `Loading`
    pub fn begin(&self, authenticated: bool) -> Generation {
        let generation = self.advance();
        self.last_auth.set(Some(authenticated));
        self.phase.borrow_mut().send(PhaseEvent::Begin);
        tracing::debug!(
            generation = generation.get(),
            authenticated,
            "reconcile: begin"
        );
        generation
    }

    /// Finish a run; `false` if it was superseded and must be discarded
    pub fn settle(&self, generation: Generation) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(
                generation = generation.get(),
                current = self.generation.get(),
                "reconcile: discarding superseded result"
            );
            return false;
        }
        self.phase.borrow_mut().send(PhaseEvent::Settle);
        true
    }

    /// Invalidate any in-flight run without starting a new one
    ///
    /// Used for explicit user changes, which always win over a pending
    /// remote result.
    pub fn supersede(&self) -> Generation {
        let generation = self.advance();
        if self.phase() == ReconcilePhase::Loading {
            self.phase.borrow_mut().send(PhaseEvent::Settle);
        }
        generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation.get() == generation.0
    }

    fn advance(&self) -> Generation {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        Generation(next)
    }

    /// Resolve the sources; never fails
    ///
    /// When authenticated the remote snapshot wins. A failed fetch, or an
    /// unauthenticated run, falls back to the cache, and then to the OS
    /// preference with built-in colors.
    pub async fn resolve(
        &self,
        authenticated: bool,
        cached: &CachedRecord,
        os_scheme: ColorScheme,
    ) -> Resolution {
        if authenticated {
            match self.client.fetch_settings().await {
                Ok(snapshot) => return resolve_remote(&snapshot, os_scheme),
                Err(err) => {
                    let err = ThemeError::from(err);
                    tracing::warn!(error = %err, "remote settings unavailable, using local theme");
                }
            }
        }
        resolve_local(cached, os_scheme)
    }
}

impl<C> fmt::Debug for ReconciliationEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("phase", &self.phase.borrow().current_state())
            .field("generation", &self.generation.get())
            .field("last_auth", &self.last_auth.get())
            .field("completed", &self.completed.get())
            .finish_non_exhaustive()
    }
}

/// Theme from a fetched snapshot
///
/// Only `light` and `dark` are accepted as remote modes; anything else
/// follows the OS preference.
pub fn resolve_remote(snapshot: &RemoteSettingsSnapshot, os_scheme: ColorScheme) -> Resolution {
    let settings = snapshot.theme().cloned().unwrap_or_default();

    let mode = settings.explicit_mode().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "remote theme mode rejected, following system preference");
        ThemeMode::System
    });
    let colors = ThemeColors::new(settings.primary(), settings.accent(), settings.background());
    let theme = EffectiveTheme::new(mode, colors, os_scheme)
        .with_default_dark_override(settings.default_dark_override(), os_scheme);

    Resolution {
        theme,
        source: ThemeSource::Remote,
        snapshot: Some(snapshot.raw().clone()),
    }
}

/// Theme from the cache, or from the OS preference and defaults on a miss
pub fn resolve_local(cached: &CachedRecord, os_scheme: ColorScheme) -> Resolution {
    let source = if cached.is_empty() {
        ThemeSource::System
    } else {
        ThemeSource::Cache
    };
    let mode = cached.mode.unwrap_or(ThemeMode::System);
    let colors = cached.colors.clone().unwrap_or_default().renamed();
    let theme = EffectiveTheme::new(mode, colors, os_scheme)
        .with_custom_dark(cached.custom_dark.unwrap_or(false), os_scheme);

    Resolution {
        theme,
        source,
        snapshot: None,
    }
}
