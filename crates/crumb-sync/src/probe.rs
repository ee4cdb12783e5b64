//! # Connectivity Probe
//!
//! Background task that periodically pings the store and announces
//! unreachable → reachable edges.
//!
//! ## Probe Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Connectivity Probe                                 │
//! │                                                                         │
//! │  every interval tick:                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.ping()                                                           │
//! │       │                                                                 │
//! │       ├── Ok + was unreachable ──► ProbeEvent::CameOnline ──► app       │
//! │       │                            (app reloads the snapshot)           │
//! │       ├── Ok + was reachable  ──► nothing to do                         │
//! │       │                                                                 │
//! │       └── Err ──► mark unreachable (writes start falling back)          │
//! │                                                                         │
//! │  shutdown channel ──► loop exits cleanly                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};
use crate::gateway::Gateway;
use crate::store::RemoteStore;

// =============================================================================
// Probe Events
// =============================================================================

/// Emitted when the store's reachability changes in an interesting way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeEvent {
    /// The store answered after being unreachable. Time to reload.
    CameOnline,
}

// =============================================================================
// Probe
// =============================================================================

/// Periodic reachability checker for a gateway's store.
pub struct ConnectivityProbe<S> {
    gateway: Arc<Gateway<S>>,
    interval: Duration,
    event_tx: mpsc::Sender<ProbeEvent>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling a running probe.
#[derive(Clone)]
pub struct ProbeHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl ProbeHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SyncError::Channel("probe shutdown channel closed".into()))
    }
}

impl<S: RemoteStore> ConnectivityProbe<S> {
    /// Creates a probe and its control handle.
    ///
    /// `event_tx` carries [`ProbeEvent`]s to whoever reloads state.
    pub fn new(
        gateway: Arc<Gateway<S>>,
        interval: Duration,
        event_tx: mpsc::Sender<ProbeEvent>,
    ) -> (Self, ProbeHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let probe = ConnectivityProbe {
            gateway,
            interval,
            event_tx,
            shutdown_rx,
        };

        (probe, ProbeHandle { shutdown_tx })
    }

    /// Runs the probe loop. Spawn this as a background task.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Connectivity probe started");

        let mut ticker = tokio::time::interval(self.interval);
        // The first tick fires immediately; that initial check is wanted.
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check().await;
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Connectivity probe shutting down");
                    break;
                }
            }
        }
    }

    /// One reachability check.
    async fn check(&self) {
        match self.gateway.store().ping().await {
            Ok(()) => {
                let came_online = self.gateway.mark_reachable();
                if came_online {
                    // Receiver gone means the app is shutting down; nothing
                    // useful left to announce.
                    let _ = self.event_tx.send(ProbeEvent::CameOnline).await;
                }
            }
            Err(e) => {
                debug!(error = %e, "Store ping failed");
                self.gateway.mark_unreachable();
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
