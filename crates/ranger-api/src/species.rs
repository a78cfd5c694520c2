//! Handlers for `/species` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/species` | All species, ordered by scientific name |
//! | `GET`  | `/species/:id` | 404 if not found |
//! | `GET`  | `/species/by-common-name/:name` | Case-insensitive; `_` reads as space |

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  Json,
};
use ranger_core::{species::Species, store::ObservationStore};

use crate::error::ApiError;

/// Common names arrive URL-friendly: underscores stand in for spaces.
pub(crate) fn clean_name(name: &str) -> String {
  name.replace('_', " ")
}

/// `GET /species`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Species>>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let species = store
    .list_species()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(species))
}

/// `GET /species/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Species>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let species = store
    .species_by_id(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("species {id} not found")))?;
  Ok(Json(species))
}

/// `GET /species/by-common-name/:name`
pub async fn get_by_common_name<S>(
  State(store): State<Arc<S>>,
  Path(name): Path<String>,
) -> Result<Json<Species>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let cleaned = clean_name(&name);
  let species = store
    .species_by_common_name(&cleaned)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("species {cleaned:?} not found")))?;
  Ok(Json(species))
}
