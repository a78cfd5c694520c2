//! Error types for the import pipeline.
//!
//! Every failure that aborts a run carries the 1-based row index of the
//! offending source row and, where relevant, the phase in which it occurred,
//! so an operator can locate and fix the row before re-running.

use std::path::PathBuf;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The stage of per-row processing an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Site,
  Species,
  Observation,
}

impl std::fmt::Display for Phase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Self::Site => "site",
      Self::Species => "species",
      Self::Observation => "observation",
    })
  }
}

/// A field-level validation failure inside one row.
#[derive(Debug, Error)]
pub enum FieldError {
  #[error("invalid block value {0:?}")]
  InvalidBlock(String),

  #[error("invalid coordinates {lat:?}, {lon:?}")]
  InvalidCoordinates { lat: String, lon: String },

  /// Unknown tenure/forest/taxa/method token; the inner error names the set.
  #[error(transparent)]
  UnknownEnumToken(#[from] ranger_core::Error),

  #[error("missing or invalid timestamp {date:?} {time:?}")]
  MissingOrInvalidTimestamp { date: String, time: String },

  /// A field required for referential integrity (site code, scientific
  /// name) was blank.
  #[error("missing required field: {0}")]
  MissingKey(&'static str),
}

/// A fatal import failure. The whole run aborts on the first of these;
/// nothing is retried.
#[derive(Debug, Error)]
pub enum ImportError {
  #[error("failed to open {path}: {source}")]
  Open {
    path:   PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("row {row}: failed to read record: {source}")]
  Read {
    row:    u64,
    #[source]
    source: csv::Error,
  },

  #[error("row {row}: unexpected column count {got}, want >= {want}")]
  MalformedRow { row: u64, got: usize, want: usize },

  #[error("row {row}: invalid {phase} fields: {source}")]
  InvalidField {
    row:    u64,
    phase:  Phase,
    #[source]
    source: FieldError,
  },

  #[error("row {row}: {phase} lookup failed: {source}")]
  Lookup {
    row:    u64,
    phase:  Phase,
    #[source]
    source: BoxError,
  },

  #[error("row {row}: {phase} create failed: {source}")]
  Create {
    row:    u64,
    phase:  Phase,
    #[source]
    source: BoxError,
  },

  #[error("row {row}: failed to insert observation batch: {source}")]
  BatchInsert {
    row:    u64,
    #[source]
    source: BoxError,
  },
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;
