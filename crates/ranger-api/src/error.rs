//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        // Store failures are never the client's fault; keep the detail out
        // of the response body.
        tracing::error!(error = %e, "store error while handling request");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_string(),
        )
      }
    };
    (status, Json(json!({ "message": message }))).into_response()
  }
}
