//! System preference monitoring
//!
//! [`PreferenceSignal`] models the single OS/browser "prefers dark" signal.
//! The host updates it (from a media-query callback, a platform poll, or
//! tests); [`SystemPreferenceMonitor`] forwards changes to one observer for as
//! long as it is mounted.

use crate::platform::detect_system_color_scheme;
use crate::theme::ColorScheme;
use lumen_core::{Listeners, Subscription};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// The OS dark-mode preference and its listeners
pub struct PreferenceSignal {
    current: Cell<ColorScheme>,
    listeners: Listeners<ColorScheme>,
}

impl PreferenceSignal {
    pub fn new(initial: ColorScheme) -> Self {
        Self {
            current: Cell::new(initial),
            listeners: Listeners::new(),
        }
    }

    /// Seed from the platform's current preference
    pub fn detect() -> Self {
        Self::new(detect_system_color_scheme())
    }

    pub fn current(&self) -> ColorScheme {
        self.current.get()
    }

    /// Update the signal; listeners run only when the value changes
    pub fn set(&self, scheme: ColorScheme) -> bool {
        if self.current.replace(scheme) == scheme {
            return false;
        }
        tracing::debug!(?scheme, "system color scheme changed");
        self.listeners.emit(&scheme);
        true
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ColorScheme) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for PreferenceSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceSignal")
            .field("current", &self.current.get())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Receiver of OS preference changes
pub trait SchemeObserver {
    fn system_scheme_changed(&self, scheme: ColorScheme);
}

/// Forwards [`PreferenceSignal`] changes to a mounted observer
///
/// At most one subscription is held; mounting again replaces it, and
/// unmounting (or dropping the monitor) releases it.
pub struct SystemPreferenceMonitor {
    signal: Rc<PreferenceSignal>,
    subscription: RefCell<Option<Subscription>>,
}

impl SystemPreferenceMonitor {
    pub fn new(signal: Rc<PreferenceSignal>) -> Self {
        Self {
            signal,
            subscription: RefCell::new(None),
        }
    }

    pub fn signal(&self) -> &Rc<PreferenceSignal> {
        &self.signal
    }

    pub fn current(&self) -> ColorScheme {
        self.signal.current()
    }

    /// Start forwarding changes to `observer` (held weakly)
    pub fn mount<O: SchemeObserver + 'static>(&self, observer: Weak<O>) {
        let subscription = self.signal.subscribe(move |scheme| {
            if let Some(observer) = observer.upgrade() {
                observer.system_scheme_changed(*scheme);
            }
        });
        // Replacing drops (and unsubscribes) any previous listener
        drop(self.subscription.replace(Some(subscription)));
    }

    pub fn unmount(&self) {
        drop(self.subscription.replace(None));
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.borrow().is_some()
    }
}

impl fmt::Debug for SystemPreferenceMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemPreferenceMonitor")
            .field("signal", &self.signal)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
