//! Handlers for `/sites` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sites` | All sites, ordered by code |
//! | `GET`  | `/sites/:code` | 404 if the code is unknown |

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  Json,
};
use ranger_core::{site::Site, store::ObservationStore};

use crate::error::ApiError;

/// `GET /sites`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Site>>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let sites = store
    .list_sites()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(sites))
}

/// `GET /sites/:code`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<Site>, ApiError>
where
  S: ObservationStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let site = store
    .site_by_code(&code)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("site {code} not found")))?;
  Ok(Json(site))
}
