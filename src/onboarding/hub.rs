//! Progress change notification
//!
//! Writers call [`ProgressHub::notify`] after every mutation so subscribers see
//! the new snapshot immediately. The poller re-derives every subscribed
//! investor on an interval to pick up writes made by other processes.

use super::progress::{ProgressEngine, ProgressSnapshot};
use super::store::normalize_email;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Fan-out of per-investor progress snapshots
pub struct ProgressHub {
    engine: ProgressEngine,
    channels: DashMap<String, watch::Sender<ProgressSnapshot>>,
}

impl ProgressHub {
    pub fn new(engine: ProgressEngine) -> Self {
        Self {
            engine,
            channels: DashMap::new(),
        }
    }

    pub fn engine(&self) -> &ProgressEngine {
        &self.engine
    }

    /// Fresh snapshot, without publishing
    pub fn snapshot(&self, email: &str) -> ProgressSnapshot {
        self.engine.compute_progress(email)
    }

    /// Receiver seeded with the current snapshot. Sweeps channels whose
    /// subscribers are gone, so the map never outgrows live receivers.
    pub fn subscribe(&self, email: &str) -> watch::Receiver<ProgressSnapshot> {
        let key = normalize_email(email);
        self.prune_idle();
        self.channels
            .entry(key)
            .or_insert_with(|| watch::channel(self.engine.compute_progress(email)).0)
            .subscribe()
    }

    /// Recompute after a write and publish if anything changed
    pub fn notify(&self, email: &str) -> ProgressSnapshot {
        let key = normalize_email(email);
        let snapshot = self.engine.compute_progress(&key);
        self.prune_idle();

        if let Some(tx) = self.channels.get(&key) {
            if publish(&tx, &snapshot) {
                debug!("Progress for {} changed to {}%", key, snapshot.percent);
            }
        }

        snapshot
    }

    /// Drop every channel without receivers
    fn prune_idle(&self) {
        let before = self.channels.len();
        self.channels.retain(|_, tx| tx.receiver_count() > 0);
        let dropped = before.saturating_sub(self.channels.len());
        if dropped > 0 {
            debug!("Dropped {} idle progress channels", dropped);
        }
    }

    /// Recompute every subscribed investor. Channels without receivers are
    /// dropped. Returns the number of snapshots that changed.
    pub fn refresh_all(&self) -> usize {
        let keys: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        let mut changed = 0;

        for key in keys {
            if self
                .channels
                .remove_if(&key, |_, tx| tx.receiver_count() == 0)
                .is_some()
            {
                debug!("Dropped idle progress channel for {}", key);
                continue;
            }

            let snapshot = self.engine.compute_progress(&key);
            if let Some(tx) = self.channels.get(&key) {
                if publish(&tx, &snapshot) {
                    changed += 1;
                }
            }
        }

        changed
    }

    /// Number of investors with an open channel
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Start the polling fallback
    pub fn spawn_poller(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let hub = Arc::clone(self);

        tokio::spawn(async move {
            info!("Progress poller started ({}ms interval)", interval.as_millis());

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let hub = Arc::clone(&hub);
                match tokio::task::spawn_blocking(move || hub.refresh_all()).await {
                    Ok(0) => {}
                    Ok(changed) => debug!("Poller published {} progress updates", changed),
                    Err(e) => warn!("Progress refresh task failed: {}", e),
                }
            }
        })
    }
}

fn publish(tx: &watch::Sender<ProgressSnapshot>, snapshot: &ProgressSnapshot) -> bool {
    tx.send_if_modified(|current| {
        if current == snapshot {
            false
        } else {
            *current = snapshot.clone();
            true
        }
    })
}
