//! # Database Error Types
//!
//! Errors for connection, migration, and query failures.
//!
//! ## Design Principles
//! 1. `sqlx::Error` converts via `#[from]` so `?` just works in repositories
//! 2. Not-found carries the entity name and id for useful log lines
//! 3. Callers match on variants, never on message strings

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to open or connect to the database.
    #[error("database connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema migration failed.
    #[error("database migration failed: {0}")]
    MigrationFailed(String),

    /// A row expected to exist was not there.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Any other query failure.
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),
}

impl DbError {
    /// Builds a NotFound error for an entity/id pair.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convenience type alias for Results with DbError.
pub type DbResult<T> = Result<T, DbError>;
