//! Tests for the row parsers, reference cache, and import orchestrator,
//! against a call-counting in-memory mock store.

use std::{collections::HashMap, convert::Infallible, sync::Mutex};

use chrono::{FixedOffset, TimeZone, Utc};
use csv::StringRecord;
use ranger_core::{
  enums::{Forest, Method, Taxa, Tenure},
  observation::{NewObservation, Observation},
  site::{NewSite, Site},
  species::{NewSpecies, Species},
  stats::{
    BlockGroupRow, NativeSplitRow, SiteGroupRow, StatsFilter, TaxaGroupRow,
    TimeSeriesRow,
  },
  store::ObservationStore,
};

use crate::{
  cache::ReferenceCache,
  error::{FieldError, ImportError, Phase},
  importer::{import_reader, ImportOptions},
  row::{self, CoercionLog},
};

// ─── Counting mock store ─────────────────────────────────────────────────────

#[derive(Default)]
struct State {
  sites:           HashMap<String, Site>,
  species:         HashMap<String, Species>,
  next_id:         i64,
  site_lookups:    u64,
  site_creates:    u64,
  species_lookups: u64,
  species_creates: u64,
  batch_sizes:     Vec<usize>,
}

/// In-memory store that records how often each operation is invoked.
#[derive(Default)]
struct CountingStore {
  state: Mutex<State>,
}

impl CountingStore {
  fn snapshot<T>(&self, f: impl FnOnce(&State) -> T) -> T {
    f(&self.state.lock().unwrap())
  }
}

impl ObservationStore for CountingStore {
  type Error = Infallible;

  async fn site_by_code(&self, code: &str) -> Result<Option<Site>, Infallible> {
    let mut state = self.state.lock().unwrap();
    state.site_lookups += 1;
    Ok(state.sites.get(code).cloned())
  }

  async fn list_sites(&self) -> Result<Vec<Site>, Infallible> {
    Ok(self.state.lock().unwrap().sites.values().cloned().collect())
  }

  async fn create_site(&self, input: NewSite) -> Result<Site, Infallible> {
    let mut state = self.state.lock().unwrap();
    state.next_id += 1;
    state.site_creates += 1;
    let site = Site {
      id:       state.next_id,
      code:     input.code.clone(),
      name:     input.name,
      block:    input.block,
      tenure:   input.tenure,
      forest:   input.forest,
      location: input.location,
    };
    state.sites.insert(input.code, site.clone());
    Ok(site)
  }

  async fn species_by_scientific_name(
    &self,
    scientific_name: &str,
  ) -> Result<Option<Species>, Infallible> {
    let mut state = self.state.lock().unwrap();
    state.species_lookups += 1;
    Ok(state.species.get(scientific_name).cloned())
  }

  async fn species_by_id(&self, id: i64) -> Result<Option<Species>, Infallible> {
    Ok(
      self
        .state
        .lock()
        .unwrap()
        .species
        .values()
        .find(|sp| sp.id == id)
        .cloned(),
    )
  }

  async fn species_by_common_name(
    &self,
    common_name: &str,
  ) -> Result<Option<Species>, Infallible> {
    Ok(
      self
        .state
        .lock()
        .unwrap()
        .species
        .values()
        .find(|sp| sp.common_name.eq_ignore_ascii_case(common_name))
        .cloned(),
    )
  }

  async fn list_species(&self) -> Result<Vec<Species>, Infallible> {
    Ok(
      self
        .state
        .lock()
        .unwrap()
        .species
        .values()
        .cloned()
        .collect(),
    )
  }

  async fn create_species(
    &self,
    input: NewSpecies,
  ) -> Result<Species, Infallible> {
    let mut state = self.state.lock().unwrap();
    state.next_id += 1;
    state.species_creates += 1;
    let species = Species {
      id:              state.next_id,
      scientific_name: input.scientific_name.clone(),
      common_name:     input.common_name,
      native:          input.native,
      taxa:            input.taxa,
      indicator:       input.indicator,
      reportable:      input.reportable,
    };
    state.species.insert(input.scientific_name, species.clone());
    Ok(species)
  }

  async fn observation_by_id(
    &self,
    _id: i64,
  ) -> Result<Option<Observation>, Infallible> {
    Ok(None)
  }

  async fn list_observations(
    &self,
    _limit: i64,
    _offset: i64,
  ) -> Result<Vec<Observation>, Infallible> {
    Ok(Vec::new())
  }

  async fn create_observation(
    &self,
    input: NewObservation,
  ) -> Result<Observation, Infallible> {
    let mut state = self.state.lock().unwrap();
    state.next_id += 1;
    Ok(Observation {
      id:               state.next_id,
      site_id:          input.site_id,
      species_id:       input.species_id,
      timestamp:        input.timestamp,
      method:           input.method,
      appearance_start: input.appearance_start,
      appearance_end:   input.appearance_end,
      temperature:      input.temperature,
      narrative:        input.narrative,
      confidence:       input.confidence,
    })
  }

  async fn create_observations(
    &self,
    batch: Vec<NewObservation>,
  ) -> Result<u64, Infallible> {
    let mut state = self.state.lock().unwrap();
    state.batch_sizes.push(batch.len());
    Ok(batch.len() as u64)
  }

  async fn count_species_by_native(
    &self,
    _filter: &StatsFilter,
  ) -> Result<Vec<NativeSplitRow>, Infallible> {
    Ok(Vec::new())
  }

  async fn count_active_sites(
    &self,
    _filter: &StatsFilter,
  ) -> Result<i64, Infallible> {
    Ok(0)
  }

  async fn observations_by_taxa(
    &self,
    _filter: &StatsFilter,
  ) -> Result<Vec<TaxaGroupRow>, Infallible> {
    Ok(Vec::new())
  }

  async fn observations_by_site(
    &self,
    _filter: &StatsFilter,
  ) -> Result<Vec<SiteGroupRow>, Infallible> {
    Ok(Vec::new())
  }

  async fn observations_by_block(
    &self,
    _filter: &StatsFilter,
  ) -> Result<Vec<BlockGroupRow>, Infallible> {
    Ok(Vec::new())
  }

  async fn observation_time_series(
    &self,
    _filter: &StatsFilter,
  ) -> Result<Vec<TimeSeriesRow>, Infallible> {
    Ok(Vec::new())
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

const HEADER: &str = "c0,site,lat,lon,date,time,method,c7,start,end,temp,\
                      narrative,c12,confidence,scientific,common,forest,\
                      indicator,native,tenure,reportable,block,taxa";

/// One valid 23-column data row for `code`/`scientific`, matching the
/// documented column layout.
fn data_row(code: &str, scientific: &str) -> String {
  format!(
    ",{code},-37.7,145.1,5-Mar-24,8:30 AM,camera,,10,20,22,,,0.9,\
     {scientific},Silver Wattle,wet,Y,native,private,N,3,mammal"
  )
}

fn record(fields: &[&str]) -> StringRecord {
  StringRecord::from(fields.to_vec())
}

fn example_record() -> StringRecord {
  record(&[
    "", "SITE01", "-37.7", "145.1", "5-Mar-24", "8:30 AM", "camera", "",
    "10", "20", "22", "", "", "0.9", "Acacia dealbata", "Silver Wattle",
    "wet", "Y", "native", "private", "N", "3", "mammal",
  ])
}

fn offset() -> FixedOffset {
  FixedOffset::east_opt(10 * 3600).unwrap()
}

// ─── Row parser ──────────────────────────────────────────────────────────────

#[test]
fn parse_site_from_example_row() {
  let site = row::parse_site(&example_record()).unwrap();
  assert_eq!(site.code, "SITE01");
  assert_eq!(site.name.as_deref(), Some("SITE01"));
  assert_eq!(site.block, 3);
  assert_eq!(site.tenure, Tenure::Private);
  assert_eq!(site.forest, Forest::Wet);
  assert_eq!(site.location.as_deref(), Some("POINT(145.1 -37.7)"));
}

#[test]
fn parse_site_mixed_case_enums() {
  let mut raw: Vec<String> =
    example_record().iter().map(str::to_string).collect();
  raw[row::col::TENURE] = "Private".to_string();
  raw[row::col::FOREST] = "Wet".to_string();

  let site = row::parse_site(&StringRecord::from(raw)).unwrap();
  assert_eq!(site.tenure, Tenure::Private);
  assert_eq!(site.forest, Forest::Wet);
}

#[test]
fn parse_site_unknown_tenure_fails() {
  let mut raw: Vec<String> =
    example_record().iter().map(str::to_string).collect();
  raw[row::col::TENURE] = "leasehold".to_string();
  let err = row::parse_site(&StringRecord::from(raw)).unwrap_err();
  assert!(matches!(
    err,
    FieldError::UnknownEnumToken(ranger_core::Error::UnknownTenureType(_))
  ));
}

#[test]
fn parse_site_non_numeric_block_fails() {
  let mut raw: Vec<String> =
    example_record().iter().map(str::to_string).collect();
  raw[row::col::BLOCK] = "three".to_string();
  let err = row::parse_site(&StringRecord::from(raw)).unwrap_err();
  assert!(matches!(err, FieldError::InvalidBlock(_)));
}

#[test]
fn parse_site_sentinel_coords_mean_no_location() {
  let mut raw: Vec<String> =
    example_record().iter().map(str::to_string).collect();
  raw[row::col::LATITUDE] = "####".to_string();
  raw[row::col::LONGITUDE] = "####".to_string();
  let site = row::parse_site(&StringRecord::from(raw)).unwrap();
  assert!(site.location.is_none());
}

#[test]
fn parse_site_unparsable_coords_fail() {
  let mut raw: Vec<String> =
    example_record().iter().map(str::to_string).collect();
  raw[row::col::LATITUDE] = "south".to_string();
  let err = row::parse_site(&StringRecord::from(raw)).unwrap_err();
  assert!(matches!(err, FieldError::InvalidCoordinates { .. }));
}

#[test]
fn parse_species_from_example_row() {
  let species = row::parse_species(&example_record()).unwrap();
  assert_eq!(species.scientific_name, "Acacia dealbata");
  assert_eq!(species.common_name, "Silver Wattle");
  assert!(species.native);
  assert_eq!(species.taxa, Taxa::Mammal);
  assert!(species.indicator);
  assert!(!species.reportable);
}

#[test]
fn parse_observation_from_example_row() {
  let mut log = CoercionLog::default();
  let obs =
    row::parse_observation(&example_record(), 7, 9, offset(), &mut log)
      .unwrap();

  assert_eq!(obs.site_id, 7);
  assert_eq!(obs.species_id, 9);
  // 2024-03-05 08:30 at UTC+10 is 2024-03-04 22:30 UTC.
  assert_eq!(
    obs.timestamp,
    Utc.with_ymd_and_hms(2024, 3, 4, 22, 30, 0).unwrap()
  );
  assert_eq!(obs.method, Method::Camera);
  assert_eq!(obs.appearance_start, Some(10));
  assert_eq!(obs.appearance_end, Some(20));
  assert_eq!(obs.temperature, Some(22));
  assert_eq!(obs.narrative, None);
  assert_eq!(obs.confidence, Some(0.9));
  assert_eq!(log.count, 0);
}

#[test]
fn row_parsing_is_deterministic() {
  let record = example_record();
  assert_eq!(
    row::parse_site(&record).unwrap(),
    row::parse_site(&record).unwrap()
  );
  assert_eq!(
    row::parse_species(&record).unwrap(),
    row::parse_species(&record).unwrap()
  );

  let mut log = CoercionLog::default();
  assert_eq!(
    row::parse_observation(&record, 1, 2, offset(), &mut log).unwrap(),
    row::parse_observation(&record, 1, 2, offset(), &mut log).unwrap()
  );
}

#[test]
fn blank_timestamp_is_a_hard_failure() {
  let mut raw: Vec<String> =
    example_record().iter().map(str::to_string).collect();
  raw[row::col::TIME] = String::new();
  let mut log = CoercionLog::default();
  let err =
    row::parse_observation(&StringRecord::from(raw), 1, 2, offset(), &mut log)
      .unwrap_err();
  assert!(matches!(err, FieldError::MissingOrInvalidTimestamp { .. }));
}

#[test]
fn unknown_method_fails() {
  let mut raw: Vec<String> =
    example_record().iter().map(str::to_string).collect();
  raw[row::col::METHOD] = "trap".to_string();
  let mut log = CoercionLog::default();
  let err =
    row::parse_observation(&StringRecord::from(raw), 1, 2, offset(), &mut log)
      .unwrap_err();
  assert!(matches!(
    err,
    FieldError::UnknownEnumToken(ranger_core::Error::UnknownMethod(_))
  ));
}

#[test]
fn unparsable_optional_fields_coerce_to_absent_and_are_counted() {
  let mut raw: Vec<String> =
    example_record().iter().map(str::to_string).collect();
  raw[row::col::TEMPERATURE] = "warm".to_string();
  raw[row::col::CONFIDENCE] = "high".to_string();
  let mut log = CoercionLog::default();
  let obs =
    row::parse_observation(&StringRecord::from(raw), 1, 2, offset(), &mut log)
      .unwrap();
  assert_eq!(obs.temperature, None);
  assert_eq!(obs.confidence, None);
  assert_eq!(log.count, 2);
}

// ─── Reference cache ─────────────────────────────────────────────────────────

#[tokio::test]
async fn cache_hit_after_insert_issues_no_store_call() {
  let store = CountingStore::default();
  let site = store
    .create_site(row::parse_site(&example_record()).unwrap())
    .await
    .unwrap();

  let mut cache = ReferenceCache::new(&store);
  cache.insert_site(site.clone());

  let resolved = cache.site("SITE01").await.unwrap().unwrap();
  assert_eq!(resolved.id, site.id);
  assert_eq!(store.snapshot(|s| s.site_lookups), 0);
}

#[tokio::test]
async fn cache_miss_queries_store_once_and_propagates_not_found() {
  let store = CountingStore::default();
  let mut cache = ReferenceCache::new(&store);

  assert!(cache.site("UNSEEN").await.unwrap().is_none());
  assert_eq!(store.snapshot(|s| s.site_lookups), 1);
}

#[tokio::test]
async fn cache_memoizes_store_hits() {
  let store = CountingStore::default();
  store
    .create_site(row::parse_site(&example_record()).unwrap())
    .await
    .unwrap();

  let mut cache = ReferenceCache::new(&store);
  cache.site("SITE01").await.unwrap().unwrap();
  cache.site("SITE01").await.unwrap().unwrap();
  assert_eq!(store.snapshot(|s| s.site_lookups), 1);
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

#[tokio::test]
async fn import_happy_path_counts_rows() {
  let store = CountingStore::default();
  let mut file = String::from(HEADER);
  for _ in 0..3 {
    file.push('\n');
    file.push_str(&data_row("SITE01", "Acacia dealbata"));
  }

  let inserted =
    import_reader(&store, file.as_bytes(), &ImportOptions::default())
      .await
      .unwrap();
  assert_eq!(inserted, 3);
  assert_eq!(store.snapshot(|s| s.site_creates), 1);
  assert_eq!(store.snapshot(|s| s.species_creates), 1);
}

#[tokio::test]
async fn import_creates_each_reference_entity_at_most_once() {
  let store = CountingStore::default();
  let mut file = String::from(HEADER);
  for i in 0..10_000 {
    file.push('\n');
    file.push_str(&data_row(&format!("SITE{:02}", i % 5), "Acacia dealbata"));
  }

  import_reader(&store, file.as_bytes(), &ImportOptions::default())
    .await
    .unwrap();

  assert_eq!(store.snapshot(|s| s.site_creates), 5);
  assert_eq!(store.snapshot(|s| s.species_creates), 1);
  // One store miss per distinct code; every other row is served from memory.
  assert_eq!(store.snapshot(|s| s.site_lookups), 5);
}

#[tokio::test]
async fn batches_flush_at_the_size_threshold() {
  let store = CountingStore::default();
  let mut file = String::from(HEADER);
  for _ in 0..2500 {
    file.push('\n');
    file.push_str(&data_row("SITE01", "Acacia dealbata"));
  }

  let inserted =
    import_reader(&store, file.as_bytes(), &ImportOptions::default())
      .await
      .unwrap();
  assert_eq!(inserted, 2500);
  assert_eq!(store.snapshot(|s| s.batch_sizes.clone()), vec![1000, 1000, 500]);
}

#[tokio::test]
async fn malformed_row_aborts_with_row_index_and_inserts_nothing() {
  let store = CountingStore::default();
  let file = format!(
    "{HEADER}\n{}\nonly,ten,fields,in,this,row,a,b,c,d\n{}",
    data_row("SITE01", "Acacia dealbata"),
    data_row("SITE02", "Acacia dealbata"),
  );

  let err = import_reader(&store, file.as_bytes(), &ImportOptions::default())
    .await
    .unwrap_err();
  match err {
    ImportError::MalformedRow { row, got, want } => {
      assert_eq!(row, 3);
      assert_eq!(got, 10);
      assert_eq!(want, 23);
    }
    other => panic!("expected MalformedRow, got {other:?}"),
  }
  // The failure hit before any batch flush; nothing was inserted.
  assert!(store.snapshot(|s| s.batch_sizes.is_empty()));
}

#[tokio::test]
async fn unknown_tenure_aborts_before_any_insert() {
  let store = CountingStore::default();
  let bad = data_row("SITE01", "Acacia dealbata").replace("private", "leasehold");
  let file = format!("{HEADER}\n{bad}");

  let err = import_reader(&store, file.as_bytes(), &ImportOptions::default())
    .await
    .unwrap_err();
  match err {
    ImportError::InvalidField { row, phase, source } => {
      assert_eq!(row, 2);
      assert_eq!(phase, Phase::Site);
      assert!(matches!(
        source,
        FieldError::UnknownEnumToken(ranger_core::Error::UnknownTenureType(_))
      ));
    }
    other => panic!("expected InvalidField, got {other:?}"),
  }
  assert_eq!(store.snapshot(|s| s.site_creates), 0);
  assert!(store.snapshot(|s| s.batch_sizes.is_empty()));
}

#[tokio::test]
async fn blank_site_code_is_rejected_explicitly() {
  let store = CountingStore::default();
  let bad = data_row("", "Acacia dealbata");
  let file = format!("{HEADER}\n{bad}");

  let err = import_reader(&store, file.as_bytes(), &ImportOptions::default())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    ImportError::InvalidField {
      row: 2,
      phase: Phase::Site,
      source: FieldError::MissingKey("site code"),
    }
  ));
}

#[tokio::test]
async fn blank_scientific_name_is_rejected_explicitly() {
  let store = CountingStore::default();
  let bad = data_row("SITE01", "");
  let file = format!("{HEADER}\n{bad}");

  let err = import_reader(&store, file.as_bytes(), &ImportOptions::default())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    ImportError::InvalidField {
      row: 2,
      phase: Phase::Species,
      source: FieldError::MissingKey("scientific name"),
    }
  ));
  assert_eq!(store.snapshot(|s| s.species_creates), 0);
}

#[tokio::test]
async fn lookup_phase_is_reported_for_store_failures() {
  // Infallible store errors can't occur; this exercises the phase display
  // used in operator-facing messages instead.
  assert_eq!(Phase::Site.to_string(), "site");
  assert_eq!(Phase::Species.to_string(), "species");
  assert_eq!(Phase::Observation.to_string(), "observation");
}
