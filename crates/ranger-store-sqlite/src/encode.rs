//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 UTC strings, which order
//! lexicographically, so time-window filters compare strings directly.
//! Closed enums are stored as their lower-case tokens; decoding reuses the
//! same case-insensitive parsers as the import path.

use chrono::{DateTime, Utc};
use ranger_core::{
  enums::Method,
  observation::Observation,
  site::Site,
  species::Species,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `sites` row.
pub struct RawSite {
  pub site_id:  i64,
  pub code:     String,
  pub name:     Option<String>,
  pub block:    i32,
  pub tenure:   String,
  pub forest:   String,
  pub location: Option<String>,
}

impl RawSite {
  pub const COLUMNS: &'static str =
    "site_id, code, name, block, tenure, forest, location";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      site_id:  row.get(0)?,
      code:     row.get(1)?,
      name:     row.get(2)?,
      block:    row.get(3)?,
      tenure:   row.get(4)?,
      forest:   row.get(5)?,
      location: row.get(6)?,
    })
  }

  pub fn into_site(self) -> Result<Site> {
    Ok(Site {
      id:       self.site_id,
      code:     self.code,
      name:     self.name,
      block:    self.block,
      tenure:   ranger_core::enums::Tenure::parse(&self.tenure)?,
      forest:   ranger_core::enums::Forest::parse(&self.forest)?,
      location: self.location,
    })
  }
}

/// Raw values read directly from a `species` row.
pub struct RawSpecies {
  pub species_id:      i64,
  pub scientific_name: String,
  pub common_name:     String,
  pub native:          bool,
  pub taxa:            String,
  pub indicator:       bool,
  pub reportable:      bool,
}

impl RawSpecies {
  pub const COLUMNS: &'static str =
    "species_id, scientific_name, common_name, native, taxa, indicator, \
     reportable";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      species_id:      row.get(0)?,
      scientific_name: row.get(1)?,
      common_name:     row.get(2)?,
      native:          row.get(3)?,
      taxa:            row.get(4)?,
      indicator:       row.get(5)?,
      reportable:      row.get(6)?,
    })
  }

  pub fn into_species(self) -> Result<Species> {
    Ok(Species {
      id:              self.species_id,
      scientific_name: self.scientific_name,
      common_name:     self.common_name,
      native:          self.native,
      taxa:            ranger_core::enums::Taxa::parse(&self.taxa)?,
      indicator:       self.indicator,
      reportable:      self.reportable,
    })
  }
}

/// Raw values read directly from an `observations` row.
pub struct RawObservation {
  pub observation_id:   i64,
  pub site_id:          i64,
  pub species_id:       i64,
  pub timestamp:        String,
  pub method:           String,
  pub appearance_start: Option<i32>,
  pub appearance_end:   Option<i32>,
  pub temperature:      Option<i32>,
  pub narrative:        Option<String>,
  pub confidence:       Option<f32>,
}

impl RawObservation {
  pub const COLUMNS: &'static str =
    "observation_id, site_id, species_id, timestamp, method, \
     appearance_start, appearance_end, temperature, narrative, confidence";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      observation_id:   row.get(0)?,
      site_id:          row.get(1)?,
      species_id:       row.get(2)?,
      timestamp:        row.get(3)?,
      method:           row.get(4)?,
      appearance_start: row.get(5)?,
      appearance_end:   row.get(6)?,
      temperature:      row.get(7)?,
      narrative:        row.get(8)?,
      confidence:       row.get(9)?,
    })
  }

  pub fn into_observation(self) -> Result<Observation> {
    Ok(Observation {
      id:               self.observation_id,
      site_id:          self.site_id,
      species_id:       self.species_id,
      timestamp:        decode_dt(&self.timestamp)?,
      method:           Method::parse(&self.method)?,
      appearance_start: self.appearance_start,
      appearance_end:   self.appearance_end,
      temperature:      self.temperature,
      narrative:        self.narrative,
      confidence:       self.confidence,
    })
  }
}
