//! # crumb-db: Database Layer for Crumb
//!
//! SQLite persistence: connection pool, embedded migrations, and one
//! repository per aggregate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Crumb Persistence                                 │
//! │                                                                         │
//! │  crumb-app ──► crumb-sync Gateway ──► ★ crumb-db (THIS CRATE) ★         │
//! │                                             │                           │
//! │                                             ▼                           │
//! │  ┌────────────┐  ┌──────────────┐  ┌──────────────────────────────┐     │
//! │  │  pool      │  │  migrations  │  │  repository/                 │     │
//! │  │  DbConfig  │  │  embedded    │  │  customer flavor stock sale  │     │
//! │  │  Database  │  │  SQL files   │  │  order finance               │     │
//! │  └────────────┘  └──────────────┘  └──────────────────────────────┘     │
//! │                                             │                           │
//! │                                             ▼                           │
//! │                                    SQLite file (WAL mode)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Repositories take and return crumb-core domain types
//! 2. Multi-row effects (sale + items, deduction + movement) are one
//!    transaction each
//! 3. Schema lives in embedded migrations, applied automatically on connect

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
