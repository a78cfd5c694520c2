//! Pure row-level parsers: one raw delimited-text record in, one typed
//! candidate record out.
//!
//! These functions never touch the store; given the same record they always
//! produce the same value. Lenient optional fields (appearance bounds,
//! temperature, confidence) silently become absent on a parse failure, by
//! policy — the [`CoercionLog`] counts such coercions so the orchestrator can
//! surface them at the end of a run instead of hiding data-entry bugs.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use csv::StringRecord;
use ranger_core::{
  enums::{Forest, Method, Taxa, Tenure},
  observation::NewObservation,
  site::NewSite,
  species::NewSpecies,
};

use crate::error::FieldError;

/// Rows narrower than this abort the whole import.
pub const MIN_COLUMNS: usize = 23;

/// 0-based column indices of the spreadsheet export.
pub mod col {
  pub const SITE_CODE: usize = 1;
  pub const LATITUDE: usize = 2;
  pub const LONGITUDE: usize = 3;
  pub const DATE: usize = 4;
  pub const TIME: usize = 5;
  pub const METHOD: usize = 6;
  pub const APPEARANCE_START: usize = 8;
  pub const APPEARANCE_END: usize = 9;
  pub const TEMPERATURE: usize = 10;
  pub const NARRATIVE: usize = 11;
  pub const CONFIDENCE: usize = 13;
  pub const SCIENTIFIC_NAME: usize = 14;
  pub const COMMON_NAME: usize = 15;
  pub const FOREST: usize = 16;
  pub const INDICATOR: usize = 17;
  pub const NATIVE: usize = 18;
  pub const TENURE: usize = 19;
  pub const REPORTABLE: usize = 20;
  pub const BLOCK: usize = 21;
  pub const TAXA: usize = 22;
}

/// Placeholder the export writes for unknown coordinates.
const COORD_SENTINEL: &str = "####";

/// Date + time format of the export, e.g. `5-Mar-24 8:30 AM`.
const TIMESTAMP_FORMAT: &str = "%d-%b-%y %I:%M %p";

fn field(record: &StringRecord, index: usize) -> &str {
  record.get(index).unwrap_or("")
}

// ─── Lenient optional fields ─────────────────────────────────────────────────

/// Counts non-empty optional fields that failed to parse and were silently
/// treated as absent.
#[derive(Debug, Default)]
pub struct CoercionLog {
  pub count: u64,
}

impl CoercionLog {
  fn note(&mut self) {
    self.count += 1;
  }
}

/// Absent or unparsable ⇒ `None`, never an error.
pub fn parse_optional_int(raw: &str, log: &mut CoercionLog) -> Option<i32> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  match trimmed.parse() {
    Ok(v) => Some(v),
    Err(_) => {
      log.note();
      None
    }
  }
}

/// Absent or unparsable ⇒ `None`, never an error.
pub fn parse_optional_float(raw: &str, log: &mut CoercionLog) -> Option<f32> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  match trimmed.parse() {
    Ok(v) => Some(v),
    Err(_) => {
      log.note();
      None
    }
  }
}

// ─── Site ────────────────────────────────────────────────────────────────────

/// Parse the site columns of one record into a creatable site.
pub fn parse_site(record: &StringRecord) -> Result<NewSite, FieldError> {
  let code = field(record, col::SITE_CODE).trim().to_string();
  if code.is_empty() {
    return Err(FieldError::MissingKey("site code"));
  }

  let block_raw = field(record, col::BLOCK).trim();
  let block: i32 = block_raw
    .parse()
    .map_err(|_| FieldError::InvalidBlock(block_raw.to_string()))?;

  let tenure = Tenure::parse(field(record, col::TENURE))?;
  let forest = Forest::parse(field(record, col::FOREST))?;

  let lat = field(record, col::LATITUDE).trim();
  let lon = field(record, col::LONGITUDE).trim();
  let location = if !lat.is_empty()
    && !lon.is_empty()
    && lat != COORD_SENTINEL
    && lon != COORD_SENTINEL
  {
    let (lat_f, lon_f): (f64, f64) = match (lat.parse(), lon.parse()) {
      (Ok(lat_f), Ok(lon_f)) => (lat_f, lon_f),
      _ => {
        return Err(FieldError::InvalidCoordinates {
          lat: lat.to_string(),
          lon: lon.to_string(),
        });
      }
    };
    // WKT convention: longitude first.
    Some(format!("POINT({lon_f} {lat_f})"))
  } else {
    None
  };

  Ok(NewSite {
    name: Some(code.clone()),
    code,
    block,
    tenure,
    forest,
    location,
  })
}

// ─── Species ─────────────────────────────────────────────────────────────────

/// Parse the species columns of one record into a creatable species.
pub fn parse_species(record: &StringRecord) -> Result<NewSpecies, FieldError> {
  let scientific_name = field(record, col::SCIENTIFIC_NAME).to_string();
  if scientific_name.trim().is_empty() {
    return Err(FieldError::MissingKey("scientific name"));
  }

  let common_name = field(record, col::COMMON_NAME).to_string();
  let native = field(record, col::NATIVE).eq_ignore_ascii_case("native");
  let taxa = Taxa::parse(field(record, col::TAXA))?;
  let indicator = field(record, col::INDICATOR)
    .trim()
    .eq_ignore_ascii_case("y");
  let reportable = field(record, col::REPORTABLE)
    .trim()
    .eq_ignore_ascii_case("y");

  Ok(NewSpecies {
    scientific_name,
    common_name,
    native,
    taxa,
    indicator,
    reportable,
  })
}

// ─── Observation ─────────────────────────────────────────────────────────────

/// Parse the observation columns of one record, using the already-resolved
/// site/species ids. `offset` is the export's fixed local time zone.
pub fn parse_observation(
  record: &StringRecord,
  site_id: i64,
  species_id: i64,
  offset: FixedOffset,
  log: &mut CoercionLog,
) -> Result<NewObservation, FieldError> {
  let timestamp =
    parse_timestamp(field(record, col::DATE), field(record, col::TIME), offset)?;

  let method = Method::parse(field(record, col::METHOD))?;

  let appearance_start = parse_optional_int(field(record, col::APPEARANCE_START), log);
  let appearance_end = parse_optional_int(field(record, col::APPEARANCE_END), log);
  let temperature = parse_optional_int(field(record, col::TEMPERATURE), log);
  let confidence = parse_optional_float(field(record, col::CONFIDENCE), log);

  let narrative = match field(record, col::NARRATIVE) {
    "" => None,
    text => Some(text.to_string()),
  };

  Ok(NewObservation {
    site_id,
    species_id,
    timestamp,
    method,
    appearance_start,
    appearance_end,
    temperature,
    narrative,
    confidence,
  })
}

/// Combine the separate date and time fields and convert from the fixed
/// local offset to UTC. Blank or unparsable fields are a hard failure — the
/// timestamp is mandatory on every fact row.
fn parse_timestamp(
  date: &str,
  time: &str,
  offset: FixedOffset,
) -> Result<DateTime<Utc>, FieldError> {
  let invalid = || FieldError::MissingOrInvalidTimestamp {
    date: date.to_string(),
    time: time.to_string(),
  };

  if date.trim().is_empty() || time.trim().is_empty() {
    return Err(invalid());
  }

  let combined = format!("{} {}", date.trim(), time.trim());
  let naive = NaiveDateTime::parse_from_str(&combined, TIMESTAMP_FORMAT)
    .map_err(|_| invalid())?;

  naive
    .and_local_timezone(offset)
    .single()
    .map(|dt| dt.with_timezone(&Utc))
    .ok_or_else(invalid)
}
