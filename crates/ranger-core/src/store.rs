//! The `ObservationStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `ranger-store-sqlite`).
//! Higher layers (`ranger-api`, `ranger-import`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::{
  observation::{NewObservation, Observation},
  site::{NewSite, Site},
  species::{NewSpecies, Species},
  stats::{
    BlockGroupRow, NativeSplitRow, SiteGroupRow, StatsFilter, TaxaGroupRow,
    TimeSeriesRow,
  },
};

/// Abstraction over a Ranger storage backend.
///
/// Sites and species are created once and never updated; observations are
/// append-only. Point lookups return `Ok(None)` for a missing row rather than
/// an error — only the caller can decide whether a miss is a failure or a
/// cue to create the entity (the import pipeline relies on this).
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ObservationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sites ─────────────────────────────────────────────────────────────

  /// Look up a site by its unique code. `Ok(None)` when unknown.
  fn site_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Site>, Self::Error>> + Send + 'a;

  /// List all sites.
  fn list_sites(
    &self,
  ) -> impl Future<Output = Result<Vec<Site>, Self::Error>> + Send + '_;

  /// Persist a new site. Fails if the code is already taken.
  fn create_site(
    &self,
    input: NewSite,
  ) -> impl Future<Output = Result<Site, Self::Error>> + Send + '_;

  // ── Species ───────────────────────────────────────────────────────────

  /// Look up a species by its unique scientific name. `Ok(None)` when
  /// unknown.
  fn species_by_scientific_name<'a>(
    &'a self,
    scientific_name: &'a str,
  ) -> impl Future<Output = Result<Option<Species>, Self::Error>> + Send + 'a;

  /// Look up a species by id.
  fn species_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Species>, Self::Error>> + Send + '_;

  /// Look up a species by common name, case-insensitively.
  fn species_by_common_name<'a>(
    &'a self,
    common_name: &'a str,
  ) -> impl Future<Output = Result<Option<Species>, Self::Error>> + Send + 'a;

  /// List all species.
  fn list_species(
    &self,
  ) -> impl Future<Output = Result<Vec<Species>, Self::Error>> + Send + '_;

  /// Persist a new species. Fails if the scientific name is already taken.
  fn create_species(
    &self,
    input: NewSpecies,
  ) -> impl Future<Output = Result<Species, Self::Error>> + Send + '_;

  // ── Observations ──────────────────────────────────────────────────────

  /// Look up an observation by id.
  fn observation_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Observation>, Self::Error>> + Send + '_;

  /// List observations with `LIMIT`/`OFFSET` pagination, newest first.
  fn list_observations(
    &self,
    limit: i64,
    offset: i64,
  ) -> impl Future<Output = Result<Vec<Observation>, Self::Error>> + Send + '_;

  /// Persist a single observation.
  fn create_observation(
    &self,
    input: NewObservation,
  ) -> impl Future<Output = Result<Observation, Self::Error>> + Send + '_;

  /// Persist a batch of observations in one store call, returning the
  /// inserted count. The batch is atomic: either all rows land or none do.
  fn create_observations(
    &self,
    batch: Vec<NewObservation>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Statistics ────────────────────────────────────────────────────────

  /// Species/observation counts split by the native flag.
  fn count_species_by_native<'a>(
    &'a self,
    filter: &'a StatsFilter,
  ) -> impl Future<Output = Result<Vec<NativeSplitRow>, Self::Error>> + Send + 'a;

  /// Number of distinct sites with at least one observation in the window.
  fn count_active_sites<'a>(
    &'a self,
    filter: &'a StatsFilter,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  /// Observation/species counts grouped by taxa.
  fn observations_by_taxa<'a>(
    &'a self,
    filter: &'a StatsFilter,
  ) -> impl Future<Output = Result<Vec<TaxaGroupRow>, Self::Error>> + Send + 'a;

  /// Observation/species counts grouped by site.
  fn observations_by_site<'a>(
    &'a self,
    filter: &'a StatsFilter,
  ) -> impl Future<Output = Result<Vec<SiteGroupRow>, Self::Error>> + Send + 'a;

  /// Observation/species counts grouped by block.
  fn observations_by_block<'a>(
    &'a self,
    filter: &'a StatsFilter,
  ) -> impl Future<Output = Result<Vec<BlockGroupRow>, Self::Error>> + Send + 'a;

  /// Monthly observation counts, split by the native flag.
  fn observation_time_series<'a>(
    &'a self,
    filter: &'a StatsFilter,
  ) -> impl Future<Output = Result<Vec<TimeSeriesRow>, Self::Error>> + Send + 'a;
}
