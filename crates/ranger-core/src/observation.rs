//! Observation — one detection event of a species at a site and time.
//!
//! Observations are the fact records of the system: created once per valid
//! import row (or API create) and never mutated. Each references exactly one
//! site and one species, which are guaranteed to exist by the importer's
//! create-before-reference ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Method;

/// A persisted observation. `id` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
  pub id:               i64,
  pub site_id:          i64,
  pub species_id:       i64,
  /// Stored in UTC; parsed from the export's fixed local offset.
  pub timestamp:        DateTime<Utc>,
  pub method:           Method,
  /// Start of the appearance interval, seconds into the recording.
  /// Two independent nullable bounds; no ordering is enforced between them.
  pub appearance_start: Option<i32>,
  /// End of the appearance interval.
  pub appearance_end:   Option<i32>,
  /// Ambient temperature in °C at the time of detection.
  pub temperature:      Option<i32>,
  /// Free-text field notes. Empty strings are stored as absent.
  pub narrative:        Option<String>,
  /// Classifier confidence in `0.0..=1.0`, when the detection was automated.
  pub confidence:       Option<f32>,
}

/// Input to [`crate::store::ObservationStore::create_observation`] and the
/// batch variant.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
  pub site_id:          i64,
  pub species_id:       i64,
  pub timestamp:        DateTime<Utc>,
  pub method:           Method,
  pub appearance_start: Option<i32>,
  pub appearance_end:   Option<i32>,
  pub temperature:      Option<i32>,
  pub narrative:        Option<String>,
  pub confidence:       Option<f32>,
}
