//! # crumb-app: Application State & Order Lifecycle Service
//!
//! The top of the stack: one [`AppService`] per running shop session,
//! orchestrating the pure core logic and the persistence gateway.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Crumb Application Layer                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 ★ crumb-app (THIS CRATE) ★                      │    │
//! │  │                                                                 │    │
//! │  │   AppService ── every operation: core first, gateway second     │    │
//! │  │   │                                                             │    │
//! │  │   ├── AppState (customers, catalog, ledger, orders, records)    │    │
//! │  │   └── Session  (the cart being rung up + selected customer)     │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  crumb-core (pure logic)        crumb-sync (gateway + probe)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Typical Wiring
//! ```text
//! let db = Database::new(DbConfig::new(config.database.path)).await?;
//! let gateway = Arc::new(Gateway::new(SqliteStore::new(db)));
//! let service = AppService::new(gateway.clone());
//! service.reload().await?;
//!
//! let (probe, handle) = ConnectivityProbe::new(gateway, interval, event_tx);
//! tokio::spawn(probe.run());
//! // on ProbeEvent::CameOnline -> service.on_probe_event(event)
//! ```

pub mod error;
pub mod service;
pub mod session;
pub mod state;

pub use error::{AppError, AppResult};
pub use service::AppService;
pub use session::Session;
pub use state::AppState;
