//! Error types for `ranger-core`.

use thiserror::Error;

/// Failure to parse a raw token into one of the closed vocabularies.
#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown tenure type: {0:?}")]
  UnknownTenureType(String),

  #[error("unknown forest type: {0:?}")]
  UnknownForestType(String),

  #[error("unknown taxa: {0:?}")]
  UnknownTaxa(String),

  #[error("unknown observation method: {0:?}")]
  UnknownMethod(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
