//! Handlers for `/stats` endpoints.
//!
//! These do no aggregation of their own: they marshal query parameters into a
//! [`StatsFilter`], delegate to the store, and reshape the returned rows into
//! response-friendly groupings.
//!
//! | Method | Path |
//! |--------|------|
//! | `GET`  | `/stats/dashboard` |
//! | `GET`  | `/stats/observations/taxa` |
//! | `GET`  | `/stats/observations/sites` |
//! | `GET`  | `/stats/observations/blocks` |
//! | `GET`  | `/stats/observations/timeseries` |

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  Json,
};
use chrono::NaiveDate;
use ranger_core::{
  enums::Taxa,
  stats::{BlockGroupRow, SiteGroupRow, StatsFilter, TaxaGroupRow},
  store::ObservationStore,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, species::clean_name};

// ─── Query parameters ────────────────────────────────────────────────────────

/// Query parameters shared by every statistics endpoint. All optional,
/// AND-combined. Dates are `YYYY-MM-DD`; `from` is the start of that UTC day
/// and `to` is exclusive of it.
#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
  pub from:        Option<NaiveDate>,
  pub to:          Option<NaiveDate>,
  pub block:       Option<i32>,
  pub site_code:   Option<String>,
  pub taxa:        Option<Taxa>,
  pub common_name: Option<String>,
}

impl StatsParams {
  fn into_filter(self) -> StatsFilter {
    StatsFilter {
      from:        self
        .from
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc()),
      // The filter's upper bound is exclusive; include the whole named day.
      to:          self
        .to
        .and_then(|d| d.succ_opt())
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc()),
      block:       self.block,
      site_code:   self.site_code,
      taxa:        self.taxa,
      common_name: self.common_name.as_deref().map(clean_name),
    }
  }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
  pub observation_count:    i64,
  pub species_count:        i64,
  pub native_species_count: i64,
  pub sites_count:          i64,
}

/// `GET /stats/dashboard?from=&to=`
pub async fn dashboard<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<StatsParams>,
) -> Result<Json<DashboardResponse>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let filter = params.into_filter();

  let split = store
    .count_species_by_native(&filter)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let mut resp = DashboardResponse {
    observation_count:    0,
    species_count:        0,
    native_species_count: 0,
    sites_count:          0,
  };
  for group in &split {
    resp.observation_count += group.observation_count;
    resp.species_count += group.species_count;
    if group.native {
      resp.native_species_count = group.species_count;
    }
  }

  resp.sites_count = store
    .count_active_sites(&filter)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(resp))
}

// ─── Grouped counts ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TaxaResponse {
  pub taxa: Vec<TaxaGroupRow>,
}

/// `GET /stats/observations/taxa`
pub async fn by_taxa<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<StatsParams>,
) -> Result<Json<TaxaResponse>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rows = store
    .observations_by_taxa(&params.into_filter())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(TaxaResponse { taxa: rows }))
}

#[derive(Debug, Serialize)]
pub struct SitesResponse {
  pub sites: Vec<SiteGroupRow>,
}

/// `GET /stats/observations/sites`
pub async fn by_site<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<StatsParams>,
) -> Result<Json<SitesResponse>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rows = store
    .observations_by_site(&params.into_filter())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(SitesResponse { sites: rows }))
}

#[derive(Debug, Serialize)]
pub struct BlocksResponse {
  pub blocks: Vec<BlockGroupRow>,
}

/// `GET /stats/observations/blocks`
pub async fn by_block<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<StatsParams>,
) -> Result<Json<BlocksResponse>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rows = store
    .observations_by_block(&params.into_filter())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(BlocksResponse { blocks: rows }))
}

// ─── Time series ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketCount {
  pub bucket:            String,
  pub observation_count: i64,
}

/// Monthly buckets reshaped into one series per side of the native split.
#[derive(Debug, Serialize)]
pub struct TimeSeriesResponse {
  pub native:     Vec<BucketCount>,
  pub introduced: Vec<BucketCount>,
}

/// `GET /stats/observations/timeseries`
pub async fn time_series<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<StatsParams>,
) -> Result<Json<TimeSeriesResponse>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rows = store
    .observation_time_series(&params.into_filter())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let mut resp = TimeSeriesResponse { native: Vec::new(), introduced: Vec::new() };
  for row in rows {
    let bucket = BucketCount {
      bucket:            row.bucket,
      observation_count: row.observation_count,
    };
    if row.native {
      resp.native.push(bucket);
    } else {
      resp.introduced.push(bucket);
    }
  }

  Ok(Json(resp))
}
