//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("decode error: {0}")]
  Decode(String),

  /// A row the schema guarantees was not there. Settlement and credits
  /// reference profiles that cannot be deleted, so this is an invariant
  /// breach, not a user error.
  #[error("profile not found: {0}")]
  ProfileNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
