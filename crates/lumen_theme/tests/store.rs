use lumen_platform::{KeyValueStorage, MemoryStorage};
use lumen_theme::persistence::{COLORS_KEY, MODE_KEY, SNAPSHOT_KEY};
use lumen_theme::{
    ColorScheme, FetchError, PreferenceSignal, ReconcilePhase, RecordingTarget,
    RemoteSettingsSnapshot, SettingsClient, ThemeColors, ThemeEvent, ThemeMode, ThemeStore,
};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::oneshot;

/// Answers every fetch with the same document and counts calls
struct Fixed {
    body: Value,
    calls: Rc<Cell<usize>>,
}

impl Fixed {
    fn new(body: Value) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Self {
                body,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl SettingsClient for Fixed {
    async fn fetch_settings(&self) -> Result<RemoteSettingsSnapshot, FetchError> {
        self.calls.set(self.calls.get() + 1);
        RemoteSettingsSnapshot::from_value(self.body.clone())
    }
}

/// Each fetch waits until the test releases its response
#[derive(Default)]
struct Gated {
    pending: RefCell<VecDeque<oneshot::Receiver<Value>>>,
}

impl Gated {
    fn gate(&self) -> oneshot::Sender<Value> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push_back(rx);
        tx
    }
}

impl SettingsClient for Gated {
    async fn fetch_settings(&self) -> Result<RemoteSettingsSnapshot, FetchError> {
        let rx = self.pending.borrow_mut().pop_front();
        let Some(rx) = rx else {
            return Err(FetchError::Network("no gate".into()));
        };
        let body = rx
            .await
            .map_err(|_| FetchError::Network("gate closed".into()))?;
        RemoteSettingsSnapshot::from_value(body)
    }
}

struct Harness<C> {
    store: Rc<ThemeStore<C>>,
    storage: MemoryStorage,
    target: RecordingTarget,
    signal: Rc<PreferenceSignal>,
}

fn harness<C: SettingsClient + 'static>(client: C, os: ColorScheme) -> Harness<C> {
    harness_with_storage(client, os, MemoryStorage::new())
}

fn harness_with_storage<C: SettingsClient + 'static>(
    client: C,
    os: ColorScheme,
    storage: MemoryStorage,
) -> Harness<C> {
    let target = RecordingTarget::new();
    let signal = Rc::new(PreferenceSignal::new(os));
    let store = ThemeStore::new(client, storage.clone(), target.clone(), signal.clone());
    Harness {
        store,
        storage,
        target,
        signal,
    }
}

fn remote_dark() -> Value {
    json!({
        "theme": {
            "mode": "dark",
            "primaryColor": "#1a7f37",
            "accentColor": "#4d8a2f"
        },
        "locale": "en"
    })
}

#[tokio::test]
async fn remote_dark_wins_over_light_os() {
    let (client, _) = Fixed::new(remote_dark());
    let h = harness(client, ColorScheme::Light);

    let theme = h.store.reconcile(true).await;

    assert_eq!(theme.mode(), ThemeMode::Dark);
    assert!(theme.is_dark());
    assert_eq!(theme.theme_name(), "forest");
    assert!(h.target.is_dark());
    assert_eq!(h.target.variable("--primary").as_deref(), Some("#1a7f37"));

    assert_eq!(h.storage.get(MODE_KEY).unwrap().as_deref(), Some("dark"));
    let mirrored: Value = serde_json::from_str(&h.storage.get(SNAPSHOT_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(mirrored["locale"], "en");
    assert_eq!(h.store.phase(), ReconcilePhase::Ready);
}

#[tokio::test]
async fn nothing_available_follows_dark_os_with_defaults() {
    let (client, calls) = Fixed::new(remote_dark());
    let h = harness(client, ColorScheme::Dark);

    let theme = h.store.reconcile(false).await;

    assert_eq!(calls.get(), 0);
    assert_eq!(theme.mode(), ThemeMode::System);
    assert_eq!(theme.resolved_scheme(), ColorScheme::Dark);
    assert!(theme.is_dark());
    // The store reports the selection, not the rendered scheme
    assert_eq!(h.store.mode(), ThemeMode::System);
    assert!(h.store.is_dark());
    assert_eq!(theme.colors(), &ThemeColors::default());
    assert_eq!(theme.theme_name(), "default");
    // No remote snapshot to mirror
    assert_eq!(h.storage.get(SNAPSHOT_KEY).unwrap(), None);
}

#[tokio::test]
async fn failed_fetch_falls_back_to_cache() {
    let storage = MemoryStorage::new();
    storage.set(MODE_KEY, "light").unwrap();
    let h = harness_with_storage(Gated::default(), ColorScheme::Dark, storage);

    // No gate queued, so the fetch fails
    let theme = h.store.reconcile(true).await;

    assert_eq!(theme.mode(), ThemeMode::Light);
    assert!(!theme.is_dark());
    assert_eq!(h.store.phase(), ReconcilePhase::Ready);
}

#[tokio::test]
async fn toggle_persists_and_ignores_os_changes() {
    let (client, _) = Fixed::new(Value::Null);
    let h = harness(client, ColorScheme::Dark);
    h.store.init();
    h.store.reconcile(false).await;
    assert!(h.store.is_dark());

    let theme = h.store.toggle_theme();
    assert_eq!(theme.mode(), ThemeMode::Light);
    assert_eq!(h.storage.get(MODE_KEY).unwrap().as_deref(), Some("light"));

    h.signal.set(ColorScheme::Light);
    h.signal.set(ColorScheme::Dark);
    assert_eq!(h.store.mode(), ThemeMode::Light);
    assert!(!h.store.is_dark());
    assert!(!h.target.is_dark());
}

#[tokio::test]
async fn os_changes_apply_while_following_system() {
    let (client, _) = Fixed::new(Value::Null);
    let h = harness(client, ColorScheme::Light);
    h.store.init();
    let before = h.target.applications();

    h.signal.set(ColorScheme::Dark);

    assert!(h.store.is_dark());
    assert!(h.target.is_dark());
    assert_eq!(h.target.applications(), before + 1);
    // Following the OS never records an explicit mode
    assert_eq!(h.store.mode(), ThemeMode::System);
}

#[tokio::test]
async fn later_reconcile_wins_over_slower_earlier_one() {
    let h = harness(Gated::default(), ColorScheme::Light);
    let release = h.store.engine().client().gate();

    let slow = h.store.reconcile(true);
    let fast = async {
        // Let the authenticated run start and park on its fetch
        while h.store.engine().generation().get() == 0 {
            tokio::task::yield_now().await;
        }
        let theme = h.store.reconcile(false).await;
        release.send(remote_dark()).unwrap();
        theme
    };

    let (slow_result, fast_result) = tokio::join!(slow, fast);

    assert_eq!(fast_result.mode(), ThemeMode::System);
    assert_eq!(slow_result, fast_result);
    assert_eq!(h.store.mode(), ThemeMode::System);
    assert!(!h.store.is_dark());
    assert_eq!(h.storage.get(MODE_KEY).unwrap().as_deref(), Some("system"));
    assert_eq!(h.storage.get(SNAPSHOT_KEY).unwrap(), None);
    assert_eq!(h.target.applications(), 1);
    assert_eq!(h.store.phase(), ReconcilePhase::Ready);
}

#[tokio::test]
async fn explicit_choice_beats_pending_remote_result() {
    let h = harness(Gated::default(), ColorScheme::Light);
    let release = h.store.engine().client().gate();

    let pending = h.store.reconcile(true);
    let user = async {
        while h.store.engine().generation().get() == 0 {
            tokio::task::yield_now().await;
        }
        h.store.set_mode(ThemeMode::Light);
        release.send(remote_dark()).unwrap();
    };

    tokio::join!(pending, user);

    assert_eq!(h.store.mode(), ThemeMode::Light);
    assert!(!h.store.is_dark());
    assert_eq!(h.storage.get(MODE_KEY).unwrap().as_deref(), Some("light"));
}

#[tokio::test]
async fn reconcile_is_idempotent_per_auth_state() {
    let (client, calls) = Fixed::new(remote_dark());
    let h = harness(client, ColorScheme::Light);

    let first = h.store.dispatch(ThemeEvent::AuthStateChanged(true)).await;
    let second = h.store.dispatch(ThemeEvent::AuthStateChanged(true)).await;

    assert_eq!(first, second);
    assert_eq!(calls.get(), 1);
    assert_eq!(h.store.engine().completed_runs(), 1);
    assert_eq!(h.target.applications(), 1);

    h.store.dispatch(ThemeEvent::ManualRefreshRequested).await;
    assert_eq!(calls.get(), 2);
    assert_eq!(h.target.applications(), 2);

    // Logging out re-resolves from the cache the remote run wrote
    let theme = h.store.dispatch(ThemeEvent::AuthStateChanged(false)).await;
    assert_eq!(calls.get(), 2);
    assert_eq!(theme.mode(), ThemeMode::Dark);
}

#[tokio::test]
async fn default_dark_override_cleared_by_explicit_mode() {
    let (client, _) = Fixed::new(json!({
        "theme": { "mode": "light", "enableDarkMode": true, "defaultDarkMode": true }
    }));
    let h = harness(client, ColorScheme::Light);

    let theme = h.store.reconcile(true).await;
    assert_eq!(theme.mode(), ThemeMode::Light);
    assert!(theme.is_dark());

    let theme = h.store.set_mode(ThemeMode::Light);
    assert!(!theme.is_dark());
}

#[test]
fn init_dispose_never_accumulates_listeners() {
    let (client, _) = Fixed::new(Value::Null);
    let h = harness(client, ColorScheme::Light);

    for _ in 0..5 {
        h.store.init();
        assert_eq!(h.signal.listener_count(), 1);
        h.store.dispose();
        assert_eq!(h.signal.listener_count(), 0);
    }

    h.store.init();
    h.store.init();
    assert_eq!(h.signal.listener_count(), 1);
}

#[test]
fn startup_uses_cache_without_waiting() {
    let storage = MemoryStorage::new();
    storage.set(MODE_KEY, "dark").unwrap();
    storage
        .set(
            COLORS_KEY,
            r##"{"primaryColor":"#8250df","accentColor":"#bf3989","backgroundColor":"#ffffff","themeName":"old"}"##,
        )
        .unwrap();
    let (client, _) = Fixed::new(Value::Null);
    let h = harness_with_storage(client, ColorScheme::Light, storage);

    h.store.init();

    assert_eq!(h.store.phase(), ReconcilePhase::Uninitialized);
    assert_eq!(h.store.mode(), ThemeMode::Dark);
    assert_eq!(h.store.colors().theme_name, "violet");
    assert_eq!(h.target.variable("--accent").as_deref(), Some("#bf3989"));
    assert_eq!(h.target.applications(), 1);
}

#[test]
fn malformed_cache_is_a_miss() {
    let storage = MemoryStorage::new();
    storage.set(MODE_KEY, "sepia").unwrap();
    storage.set(COLORS_KEY, "not json").unwrap();
    let (client, _) = Fixed::new(Value::Null);
    let h = harness_with_storage(client, ColorScheme::Light, storage);

    assert_eq!(h.store.mode(), ThemeMode::System);
    assert_eq!(h.store.colors(), ThemeColors::default());
    assert_eq!(h.storage.get(MODE_KEY).unwrap(), None);
    assert_eq!(h.storage.get(COLORS_KEY).unwrap(), None);
}

#[test]
fn set_colors_renames_from_presets() {
    let (client, _) = Fixed::new(Value::Null);
    let h = harness(client, ColorScheme::Light);

    let mut colors = ThemeColors::default();
    colors.primary_color = "#475569".parse().unwrap();
    colors.accent_color = "#64748b".parse().unwrap();
    colors.theme_name = "mine".into();

    let theme = h.store.set_colors(colors);
    assert_eq!(theme.theme_name(), "slate");
    assert_eq!(h.target.variable("--primary-hover").as_deref(), Some("#3d4b5f"));

    let stored: ThemeColors = serde_json::from_str(&h.storage.get(COLORS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored.theme_name, "slate");
}

#[test]
fn custom_mode_uses_companion_flag() {
    let (client, _) = Fixed::new(Value::Null);
    let h = harness(client, ColorScheme::Dark);

    let theme = h.store.set_mode(ThemeMode::Custom);
    assert!(!theme.is_dark());

    let theme = h.store.set_custom_dark(true);
    assert!(theme.is_dark());
    assert_eq!(h.store.cache().load().custom_dark, Some(true));
}

#[tokio::test]
async fn null_cosmetic_field_does_not_discard_remote_mode() {
    let storage = MemoryStorage::new();
    storage.set(MODE_KEY, "light").unwrap();
    let (client, _) = Fixed::new(json!({
        "theme": { "mode": "dark", "enableCustomFonts": null, "showLogo": null, "menuStyle": 2 }
    }));
    let h = harness_with_storage(client, ColorScheme::Light, storage);

    let theme = h.store.reconcile(true).await;

    assert_eq!(theme.mode(), ThemeMode::Dark);
    assert!(theme.is_dark());
    assert_eq!(h.storage.get(MODE_KEY).unwrap().as_deref(), Some("dark"));
}
