//! Error type for `podium-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A validation or reference rule rejected the write.
  #[error(transparent)]
  Core(#[from] podium_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  /// Lost a race against a concurrent writer. Safe to retry.
  #[error("concurrent conflict: {0}")]
  ConcurrentConflict(String),
}

impl Error {
  pub fn is_retryable(&self) -> bool { matches!(self, Self::ConcurrentConflict(_)) }

  /// The domain error, if this is one.
  pub fn as_core(&self) -> Option<&podium_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }

  /// Reclassify busy/locked databases and unique-constraint violations as
  /// [`Error::ConcurrentConflict`]. Used on write paths whose uniqueness
  /// rules are already checked inside the transaction, so a storage-level
  /// violation can only come from a racing writer.
  pub(crate) fn from_write(e: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, msg)) = &e {
      let racing = matches!(f.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE;
      if racing {
        return Self::ConcurrentConflict(msg.clone().unwrap_or_else(|| f.to_string()));
      }
    }
    Self::Database(e)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
