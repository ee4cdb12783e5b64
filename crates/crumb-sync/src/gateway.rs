//! # Persistence Gateway
//!
//! Write-through persistence with a loud local fallback.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gateway Write Path                               │
//! │                                                                         │
//! │  app mutates in-memory state (always succeeds)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  gateway.write(op, store.save_x(...))                                   │
//! │       │                                                                 │
//! │       ├── Ok  ──► mark reachable ──► WriteOutcome::Remote               │
//! │       │                                                                 │
//! │       └── Err ──► mark unreachable                                      │
//! │                   unsynced_writes += 1                                  │
//! │                   warn! with the operation name                         │
//! │                   ──► WriteOutcome::LocalFallback                       │
//! │                                                                         │
//! │  The in-memory write is kept either way: the shop keeps selling.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Reconciliation Gap
//! After reconnection, `load_all` replaces in-memory state with the durable
//! snapshot: "last load wins". Local writes made while unreachable are NOT
//! replayed; the unsynced counter exists precisely so that discard is loud
//! (a warn with the count) instead of silent. A durable outbox with replay
//! is the eventual fix.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::store::{RemoteStore, Snapshot};

// =============================================================================
// Write Outcome
// =============================================================================

/// Where a write actually landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The durable store accepted the write.
    Remote,
    /// The durable store was unreachable; only the in-memory copy holds it.
    LocalFallback,
}

// =============================================================================
// Gateway
// =============================================================================

/// Remote-then-local persistence decorator over a [`RemoteStore`].
#[derive(Debug)]
pub struct Gateway<S> {
    store: S,
    /// Last observed reachability of the store.
    reachable: AtomicBool,
    /// Writes that exist only in memory since the store went away.
    unsynced_writes: AtomicU64,
    /// Serializes snapshot loads; concurrent callers coalesce onto one.
    load_lock: Mutex<()>,
}

impl<S: RemoteStore> Gateway<S> {
    /// Wraps a store, assuming it reachable until proven otherwise.
    pub fn new(store: S) -> Self {
        Gateway {
            store,
            reachable: AtomicBool::new(true),
            unsynced_writes: AtomicU64::new(0),
            load_lock: Mutex::new(()),
        }
    }

    /// Direct access to the wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Last observed reachability.
    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::Acquire)
    }

    /// Number of writes held only in memory.
    pub fn unsynced_writes(&self) -> u64 {
        self.unsynced_writes.load(Ordering::Acquire)
    }

    /// Runs a store write, tracking reachability.
    ///
    /// Never fails: a store error downgrades the write to a local fallback
    /// and the caller's in-memory copy stands. `op` names the operation in
    /// the warn line.
    pub async fn write<F>(&self, op: &'static str, fut: F) -> WriteOutcome
    where
        F: Future<Output = SyncResult<()>>,
    {
        match fut.await {
            Ok(()) => {
                self.mark_reachable();
                WriteOutcome::Remote
            }
            Err(e) => {
                warn!(op, error = %e, "Store write failed, keeping local copy only");
                self.mark_unreachable();
                self.unsynced_writes.fetch_add(1, Ordering::AcqRel);
                WriteOutcome::LocalFallback
            }
        }
    }

    /// Loads the full snapshot, coalescing concurrent calls.
    ///
    /// Returns `Ok(None)` when another load is already in flight; the caller
    /// simply skips its reload and the in-flight one serves everybody.
    ///
    /// A successful load discards any unsynced local writes ("last load
    /// wins") and says so loudly.
    pub async fn load_all(&self) -> SyncResult<Option<Snapshot>> {
        let _guard = match self.load_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Snapshot load already in flight, coalescing");
                return Ok(None);
            }
        };

        match self.store.load_all().await {
            Ok(snapshot) => {
                self.mark_reachable();

                let discarded = self.unsynced_writes.swap(0, Ordering::AcqRel);
                if discarded > 0 {
                    warn!(
                        discarded,
                        "Snapshot load discarded unsynced local writes"
                    );
                }

                Ok(Some(snapshot))
            }
            Err(e) => {
                self.mark_unreachable();
                Err(SyncError::RemoteUnavailable(e.to_string()))
            }
        }
    }

    /// Records the store as reachable again.
    ///
    /// Returns true when this call flipped the edge (was unreachable).
    pub fn mark_reachable(&self) -> bool {
        let was_unreachable = !self.reachable.swap(true, Ordering::AcqRel);
        if was_unreachable {
            info!("Store reachable again");
        }
        was_unreachable
    }

    /// Records the store as unreachable.
    pub fn mark_unreachable(&self) {
        if self.reachable.swap(false, Ordering::AcqRel) {
            warn!("Store marked unreachable");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::ToggleStore;
    use crumb_core::types::Flavor;

    #[tokio::test]
    async fn test_write_through_when_up() {
        let gateway = Gateway::new(ToggleStore::default());
        let flavor = Flavor::new("Oreo");

        let outcome = gateway
            .write("save_flavor", gateway.store().save_flavor(&flavor))
            .await;

        assert_eq!(outcome, WriteOutcome::Remote);
        assert!(gateway.is_reachable());
        assert_eq!(gateway.unsynced_writes(), 0);
    }

    #[tokio::test]
    async fn test_fallback_counts_unsynced_writes() {
        let gateway = Gateway::new(ToggleStore::default());
        gateway.store().set_down(true);
        let flavor = Flavor::new("Oreo");

        for _ in 0..3 {
            let outcome = gateway
                .write("save_flavor", gateway.store().save_flavor(&flavor))
                .await;
            assert_eq!(outcome, WriteOutcome::LocalFallback);
        }

        assert!(!gateway.is_reachable());
        assert_eq!(gateway.unsynced_writes(), 3);
    }

    #[tokio::test]
    async fn test_load_resets_unsynced_counter() {
        let gateway = Gateway::new(ToggleStore::default());
        gateway.store().set_down(true);
        let flavor = Flavor::new("Oreo");
        gateway
            .write("save_flavor", gateway.store().save_flavor(&flavor))
            .await;
        assert_eq!(gateway.unsynced_writes(), 1);

        // Store comes back; the successful load discards (and reports).
        gateway.store().set_down(false);
        let snapshot = gateway.load_all().await.unwrap();
        assert!(snapshot.is_some());
        assert_eq!(gateway.unsynced_writes(), 0);
        assert!(gateway.is_reachable());
    }

    #[tokio::test]
    async fn test_load_failure_marks_unreachable() {
        let gateway = Gateway::new(ToggleStore::default());
        gateway.store().set_down(true);

        let err = gateway.load_all().await.unwrap_err();
        assert!(matches!(err, SyncError::RemoteUnavailable(_)));
        assert!(!gateway.is_reachable());
    }

    #[tokio::test]
    async fn test_reachable_edge_detection() {
        let gateway = Gateway::new(ToggleStore::default());
        assert!(!gateway.mark_reachable()); // already reachable, no edge

        gateway.mark_unreachable();
        assert!(gateway.mark_reachable()); // unreachable -> reachable edge
        assert!(!gateway.mark_reachable());
    }
}
