//! The import orchestrator: drives the read → parse → resolve-or-create →
//! batch-insert loop over a whole file.
//!
//! Single-threaded and strictly sequential: one file, one cache, one batch
//! buffer. Order matters only for error-row reporting, not correctness.

use std::{io, path::Path};

use chrono::FixedOffset;
use csv::{ReaderBuilder, Trim};
use ranger_core::{observation::NewObservation, store::ObservationStore};

use crate::{
  cache::ReferenceCache,
  error::{FieldError, ImportError, Phase, Result},
  row::{self, CoercionLog, MIN_COLUMNS},
};

/// Pending observations are flushed to the store once this many accumulate.
pub const BATCH_SIZE: usize = 1000;

/// Tunables for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
  /// The fixed local time zone the export's timestamps are written in.
  pub utc_offset: FixedOffset,
}

impl Default for ImportOptions {
  fn default() -> Self {
    // The monitoring program's sites share one standard offset (UTC+10).
    Self {
      utc_offset: FixedOffset::east_opt(10 * 3600).expect("valid offset"),
    }
  }
}

/// Import a delimited-text export from `path`, returning the number of
/// observations inserted. Fail-fast: the first error aborts the run; batches
/// flushed before the failure stay committed.
pub async fn import_file<S>(
  store: &S,
  path: impl AsRef<Path>,
  options: &ImportOptions,
) -> Result<u64>
where
  S: ObservationStore,
{
  let path = path.as_ref();
  let reader = ReaderBuilder::new()
    .has_headers(false)
    .flexible(true)
    .trim(Trim::Fields)
    .from_path(path)
    .map_err(|e| ImportError::Open { path: path.to_path_buf(), source: e })?;

  import_records(store, reader, options).await
}

/// Like [`import_file`] but over any reader — used by tests and callers that
/// already hold the bytes.
pub async fn import_reader<S, R>(
  store: &S,
  input: R,
  options: &ImportOptions,
) -> Result<u64>
where
  S: ObservationStore,
  R: io::Read,
{
  let reader = ReaderBuilder::new()
    .has_headers(false)
    .flexible(true)
    .trim(Trim::Fields)
    .from_reader(input);

  import_records(store, reader, options).await
}

async fn import_records<S, R>(
  store: &S,
  mut reader: csv::Reader<R>,
  options: &ImportOptions,
) -> Result<u64>
where
  S: ObservationStore,
  R: io::Read,
{
  let mut cache = ReferenceCache::new(store);
  let mut batch: Vec<NewObservation> = Vec::with_capacity(BATCH_SIZE);
  let mut coercions = CoercionLog::default();
  let mut inserted: u64 = 0;
  let mut row: u64 = 0;

  for result in reader.records() {
    row += 1;
    let record = result.map_err(|e| ImportError::Read { row, source: e })?;

    // Row 1 is the header.
    if row == 1 {
      continue;
    }

    if record.len() < MIN_COLUMNS {
      return Err(ImportError::MalformedRow {
        row,
        got: record.len(),
        want: MIN_COLUMNS,
      });
    }

    // ── Resolve site ──────────────────────────────────────────────────
    let code = record.get(row::col::SITE_CODE).unwrap_or("").trim();
    if code.is_empty() {
      return Err(ImportError::InvalidField {
        row,
        phase: Phase::Site,
        source: FieldError::MissingKey("site code"),
      });
    }
    let site = match cache.site(code).await.map_err(|e| ImportError::Lookup {
      row,
      phase: Phase::Site,
      source: Box::new(e),
    })? {
      Some(site) => site,
      None => {
        let input = row::parse_site(&record).map_err(|e| {
          ImportError::InvalidField { row, phase: Phase::Site, source: e }
        })?;
        let site =
          store.create_site(input).await.map_err(|e| ImportError::Create {
            row,
            phase: Phase::Site,
            source: Box::new(e),
          })?;
        cache.insert_site(site.clone());
        site
      }
    };

    // ── Resolve species ───────────────────────────────────────────────
    let scientific = record.get(row::col::SCIENTIFIC_NAME).unwrap_or("");
    if scientific.trim().is_empty() {
      return Err(ImportError::InvalidField {
        row,
        phase: Phase::Species,
        source: FieldError::MissingKey("scientific name"),
      });
    }
    let species = match cache.species(scientific).await.map_err(|e| {
      ImportError::Lookup { row, phase: Phase::Species, source: Box::new(e) }
    })? {
      Some(species) => species,
      None => {
        let input = row::parse_species(&record).map_err(|e| {
          ImportError::InvalidField { row, phase: Phase::Species, source: e }
        })?;
        let species =
          store
            .create_species(input)
            .await
            .map_err(|e| ImportError::Create {
              row,
              phase: Phase::Species,
              source: Box::new(e),
            })?;
        cache.insert_species(species.clone());
        species
      }
    };

    // ── Parse and batch the observation ───────────────────────────────
    let observation = row::parse_observation(
      &record,
      site.id,
      species.id,
      options.utc_offset,
      &mut coercions,
    )
    .map_err(|e| ImportError::InvalidField {
      row,
      phase: Phase::Observation,
      source: e,
    })?;

    batch.push(observation);

    if batch.len() == BATCH_SIZE {
      inserted += flush(store, &mut batch, row).await?;
    }
  }

  if !batch.is_empty() {
    inserted += flush(store, &mut batch, row).await?;
  }

  if coercions.count > 0 {
    tracing::warn!(
      count = coercions.count,
      "optional fields silently treated as absent due to parse failures"
    );
  }

  Ok(inserted)
}

async fn flush<S>(
  store: &S,
  batch: &mut Vec<NewObservation>,
  row: u64,
) -> Result<u64>
where
  S: ObservationStore,
{
  let pending = std::mem::replace(batch, Vec::with_capacity(BATCH_SIZE));
  let count = store
    .create_observations(pending)
    .await
    .map_err(|e| ImportError::BatchInsert { row, source: Box::new(e) })?;
  tracing::info!(count, through_row = row, "inserted observation batch");
  Ok(count)
}
