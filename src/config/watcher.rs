//! Hot reload of the gateway configuration file.
//!
//! Editors usually emit several modify/create events for one save. Events
//! arriving within [`DEBOUNCE`] of each other are coalesced into a single
//! reload, so routes and instance pools are rebuilt once per save.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// Quiet period after the last file event before reloading.
pub const DEBOUNCE: Duration = Duration::from_millis(250);

/// Watches the configuration file and publishes validated reloads.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiver the server reads reloads from.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Must be called inside a tokio runtime; the returned
    /// handle must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<()>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        tokio::spawn(reload_loop(self.path, event_rx, self.update_tx, DEBOUNCE));
        Ok(watcher)
    }
}

/// Reload once per burst of file events until either channel closes.
async fn reload_loop(
    path: PathBuf,
    mut events: mpsc::UnboundedReceiver<()>,
    updates: mpsc::UnboundedSender<GatewayConfig>,
    debounce: Duration,
) {
    while events.recv().await.is_some() {
        let mut coalesced = 1usize;
        loop {
            match tokio::time::timeout(debounce, events.recv()).await {
                Ok(Some(())) => coalesced += 1,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        match load_config(&path) {
            Ok(config) => {
                tracing::info!(
                    path = ?path,
                    events = coalesced,
                    routes = ?config.routes.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                    backends = ?config.backends.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
                    openapi_rewrite = config.openapi.enabled,
                    "Config reloaded"
                );
                if updates.send(config).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::error!(path = ?path, error = %e, "Failed to reload config, keeping current configuration");
            }
        }
    }
}
