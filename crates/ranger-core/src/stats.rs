//! Query-parameter and result-row types for the statistics layer.
//!
//! The aggregation itself is delegated to the store's query engine; these
//! types only carry parameters in and grouped counts out.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::enums::Taxa;

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Common filter accepted by every statistics operation. All fields are
/// independently optional and combined with logical AND when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsFilter {
  /// Inclusive lower bound on observation timestamps.
  pub from:        Option<DateTime<Utc>>,
  /// Exclusive upper bound on observation timestamps.
  pub to:          Option<DateTime<Utc>>,
  pub block:       Option<i32>,
  pub site_code:   Option<String>,
  pub taxa:        Option<Taxa>,
  /// Matched case-insensitively against `Species.common_name`.
  pub common_name: Option<String>,
}

// ─── Result rows ─────────────────────────────────────────────────────────────

/// Species and observation counts for one side of the native split.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeSplitRow {
  pub native:            bool,
  pub species_count:     i64,
  pub observation_count: i64,
}

/// Grouped counts for one taxonomic group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxaGroupRow {
  pub taxa:              Taxa,
  pub species_count:     i64,
  pub observation_count: i64,
}

/// Grouped counts for one site.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteGroupRow {
  pub site_code:         String,
  pub species_count:     i64,
  pub observation_count: i64,
}

/// Grouped counts for one block of sites.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockGroupRow {
  pub block:             i32,
  pub species_count:     i64,
  pub observation_count: i64,
}

/// One month of the time series, for one side of the native split.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesRow {
  /// Month bucket as `YYYY-MM`.
  pub bucket:            String,
  pub native:            bool,
  pub observation_count: i64,
}
