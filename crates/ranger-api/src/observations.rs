//! Handlers for `/observations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/observations` | `?limit=` (1..=1000, default 100), `?offset=` |
//! | `GET`  | `/observations/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  Json,
};
use ranger_core::{observation::Observation, store::ObservationStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit:  Option<i64>,
  pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub count:        usize,
  pub observations: Vec<Observation>,
}

/// `GET /observations?limit=&offset=`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
  if !(1..=MAX_LIMIT).contains(&limit) {
    return Err(ApiError::BadRequest(format!(
      "limit must be between 1 and {MAX_LIMIT}, got {limit}"
    )));
  }
  let offset = params.offset.unwrap_or(0);
  if offset < 0 {
    return Err(ApiError::BadRequest(format!(
      "offset must not be negative, got {offset}"
    )));
  }

  let observations = store
    .list_observations(limit, offset)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(ListResponse { count: observations.len(), observations }))
}

/// `GET /observations/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Observation>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let observation = store
    .observation_by_id(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("observation {id} not found")))?;
  Ok(Json(observation))
}
