//! # Sync Error Types
//!
//! Errors for the persistence gateway, connectivity probe, and config.

use thiserror::Error;

/// Sync layer errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote store could not be reached.
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// The underlying database failed.
    #[error("database error: {0}")]
    Db(#[from] crumb_db::DbError),

    /// A channel to a background task closed.
    #[error("channel error: {0}")]
    Channel(String),

    /// Config file I/O failed.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be serialized.
    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A config value is invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for Results with SyncError.
pub type SyncResult<T> = Result<T, SyncError>;
