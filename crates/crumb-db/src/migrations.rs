//! # Database Migrations
//!
//! Embedded SQL migrations, compiled into the binary.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Migration System                                    │
//! │                                                                         │
//! │  migrations/sqlite/                                                     │
//! │  └── 001_initial_schema.sql  ──┐                                        │
//! │                                │  sqlx::migrate! embeds at COMPILE time │
//! │                                ▼                                        │
//! │  Binary contains all migrations ──► run() applies pending ones in      │
//! │  order, tracked in _sqlx_migrations, idempotent on restart             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Applies all pending migrations to the given pool.
pub async fn run(pool: &SqlitePool) -> DbResult<()> {
    debug!("Applying embedded migrations");
    sqlx::migrate!("../../migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| DbError::MigrationFailed(e.to_string()))?;
    Ok(())
}
