//! JSON REST API for Ranger.
//!
//! Exposes an axum [`Router`] backed by any
//! [`ranger_core::store::ObservationStore`]. Transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", ranger_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod observations;
pub mod sites;
pub mod species;
pub mod stats;

use std::sync::Arc;

use axum::{routing::get, Router};
use ranger_core::store::ObservationStore;

pub use error::ApiError;


/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ObservationStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Sites
    .route("/sites", get(sites::list::<S>))
    .route("/sites/{code}", get(sites::get_one::<S>))
    // Species
    .route("/species", get(species::list::<S>))
    .route("/species/{id}", get(species::get_one::<S>))
    .route(
      "/species/by-common-name/{name}",
      get(species::get_by_common_name::<S>),
    )
    // Observations
    .route("/observations", get(observations::list::<S>))
    .route("/observations/{id}", get(observations::get_one::<S>))
    // Statistics
    .route("/stats/dashboard", get(stats::dashboard::<S>))
    .route("/stats/observations/taxa", get(stats::by_taxa::<S>))
    .route("/stats/observations/sites", get(stats::by_site::<S>))
    .route("/stats/observations/blocks", get(stats::by_block::<S>))
    .route(
      "/stats/observations/timeseries",
      get(stats::time_series::<S>),
    )
    .with_state(store)
}
