//! # crumb-sync: Persistence Gateway for Crumb
//!
//! The remote-then-local persistence layer: a write-through gateway over a
//! durable store, with a background probe that notices when the store comes
//! back.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Crumb Sync Layer                                 │
//! │                                                                         │
//! │  crumb-app (in-memory state, always authoritative for the session)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 ★ crumb-sync (THIS CRATE) ★                     │    │
//! │  │                                                                 │    │
//! │  │   Gateway ── write-through, falls back to memory-only with a    │    │
//! │  │   │          counted, logged unsynced write                     │    │
//! │  │   │                                                             │    │
//! │  │   ├── RemoteStore (trait) ── SqliteStore over crumb-db          │    │
//! │  │   │                                                             │    │
//! │  │   └── ConnectivityProbe ── pings on an interval, announces      │    │
//! │  │       CameOnline so the app can reload                          │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  crumb-db (SQLite, WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`gateway`] - Write-through gateway with local fallback
//! - [`store`] - RemoteStore trait, Snapshot, SqliteStore
//! - [`probe`] - Background connectivity probe
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Sync error types

pub mod config;
pub mod error;
pub mod gateway;
pub mod probe;
pub mod store;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use gateway::{Gateway, WriteOutcome};
pub use probe::{ConnectivityProbe, ProbeEvent, ProbeHandle};
pub use store::{RemoteStore, Snapshot, SqliteStore};
