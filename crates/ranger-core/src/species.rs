//! Species — a taxonomic entity identified by its scientific name.

use serde::{Deserialize, Serialize};

use crate::enums::Taxa;

/// A persisted species. `id` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
  pub id:              i64,
  /// Globally unique, e.g. `"Acacia dealbata"`.
  pub scientific_name: String,
  pub common_name:     String,
  pub native:          bool,
  pub taxa:            Taxa,
  /// Marked as an indicator species for monitoring purposes.
  pub indicator:       bool,
  /// Sightings must be reported to the local authority.
  pub reportable:      bool,
}

/// Input to [`crate::store::ObservationStore::create_species`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpecies {
  pub scientific_name: String,
  pub common_name:     String,
  pub native:          bool,
  pub taxa:            Taxa,
  pub indicator:       bool,
  pub reportable:      bool,
}
