//! Site — a monitored location, identified by a unique human-readable code.
//!
//! Sites are created lazily by the import pipeline the first time a row
//! references an unseen code, and are never updated by it afterwards.

use serde::{Deserialize, Serialize};

use crate::enums::{Forest, Tenure};

/// A persisted site. `id` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
  pub id:       i64,
  /// Globally unique human-readable code, e.g. `"SITE01"`.
  pub code:     String,
  /// Display name; defaults to the code when the source has none.
  pub name:     Option<String>,
  pub block:    i32,
  pub tenure:   Tenure,
  pub forest:   Forest,
  /// Well-known-text point, `POINT(lon lat)`, when coordinates are known.
  pub location: Option<String>,
}

/// Input to [`crate::store::ObservationStore::create_site`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSite {
  pub code:     String,
  pub name:     Option<String>,
  pub block:    i32,
  pub tenure:   Tenure,
  pub forest:   Forest,
  pub location: Option<String>,
}
