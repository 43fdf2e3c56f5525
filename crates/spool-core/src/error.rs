//! Error types for `spool-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("a user cannot follow themselves")]
  SelfFollow,

  #[error("rating {0} is out of range (1..=10)")]
  RatingOutOfRange(u8),

  #[error("entry title must not be blank")]
  BlankTitle,

  #[error("handle must not be blank")]
  BlankHandle,

  #[error("unknown counter name: {0:?}")]
  UnknownCounter(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
