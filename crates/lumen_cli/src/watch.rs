//! Watch mode: keep the stylesheet in sync with settings and the OS

use anyhow::{Context, Result};
use lumen_theme::{
    detect_system_color_scheme, ColorScheme, SettingsClient, ThemeEvent, ThemeStore,
};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Whether a filesystem event touches the watched settings file
fn touches(event: &Event, file: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|path| path.file_name() == file.file_name())
}

fn settings_watcher(file: &Path, tx: mpsc::UnboundedSender<()>) -> Result<RecommendedWatcher> {
    let target = file.to_path_buf();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) if touches(&event, &target) => {
                // The receiver is gone only while shutting down
                let _ = tx.send(());
            }
            Ok(_) => {}
            Err(err) => tracing::error!(error = %err, "settings watch error"),
        },
        Config::default(),
    )
    .context("Failed to create settings watcher")?;

    // Editors replace files, so watch the directory rather than the inode
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;
    tracing::info!(path = %file.display(), "watching settings file");

    Ok(watcher)
}

/// Poll the OS color scheme off the event loop
///
/// Detection shells out to platform tools, so each check runs on the
/// blocking pool and only its result is sent back.
fn spawn_scheme_poller(poll: Duration) -> mpsc::UnboundedReceiver<ColorScheme> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll);
        loop {
            interval.tick().await;
            match tokio::task::spawn_blocking(detect_system_color_scheme).await {
                Ok(scheme) => {
                    if tx.send(scheme).is_err() {
                        break;
                    }
                }
                Err(err) => tracing::warn!(error = %err, "system color scheme detection failed"),
            }
        }
    });
    rx
}

/// Run until Ctrl-C
///
/// Changes to the settings file trigger a manual refresh; the OS color
/// scheme is polled every `poll` and fed into the preference signal.
pub async fn run<C: SettingsClient + 'static>(
    store: Rc<ThemeStore<C>>,
    settings_file: Option<&Path>,
    poll: Duration,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _watcher = settings_file
        .map(|file| settings_watcher(file, tx))
        .transpose()?;

    let mut schemes = spawn_scheme_poller(poll);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(()) = rx.recv() => {
                // Coalesce the burst of events a single save produces
                while rx.try_recv().is_ok() {}
                let theme = store.dispatch(ThemeEvent::ManualRefreshRequested).await;
                tracing::info!(
                    mode = %theme.mode(),
                    is_dark = theme.is_dark(),
                    runs = store.engine().completed_runs(),
                    "settings changed, theme refreshed"
                );
            }
            Some(scheme) = schemes.recv() => {
                store.signal().set(scheme);
            }
            result = &mut shutdown => {
                result.context("Failed to listen for Ctrl-C")?;
                tracing::info!("stopping watch");
                break;
            }
        }
    }

    store.dispose();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    #[test]
    fn test_touches_only_the_settings_file() {
        let file = Path::new("/tmp/conf/settings.json");

        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(file.to_path_buf());
        assert!(touches(&modify, file));

        let other = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/tmp/conf/other.json"));
        assert!(!touches(&other, file));

        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(file.to_path_buf());
        assert!(!touches(&access, file));
    }

    #[tokio::test]
    async fn test_scheme_poller_reports_off_the_event_loop() {
        let mut schemes = spawn_scheme_poller(Duration::from_millis(10));

        // The first tick fires immediately; later ticks keep reporting
        for _ in 0..2 {
            let scheme = tokio::time::timeout(Duration::from_secs(5), schemes.recv())
                .await
                .expect("poller should report a scheme");
            assert!(scheme.is_some());
        }

        // Dropping the receiver stops the poller on its next send
        drop(schemes);
    }
}
