//! API error types.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Every variant renders as `{ "error": <message> }` with the matching
/// status code; [`ApiError::Internal`] hides its source behind a generic
/// message and logs it instead.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The resource does not exist, or the caller may not see it.
  #[error("{0}")]
  NotFound(String),
  /// The caller is known but not allowed to do this.
  #[error("{0}")]
  Forbidden(String),
  /// The request itself is unacceptable.
  #[error("{0}")]
  BadRequest(String),
  /// Something went wrong in the backend.
  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// The uniform "no profile resolved" response. A missing header, a
  /// malformed id and an unknown id all produce this same error, so
  /// callers cannot probe which profiles exist.
  pub fn profile_not_found() -> Self {
    Self::NotFound("profile not found".into())
  }
}

impl From<tally_core::Error> for ApiError {
  fn from(error: tally_core::Error) -> Self {
    use tally_core::Error as E;

    match error {
      E::NotFound(what) => Self::NotFound(format!("{what} not found")),
      E::Forbidden(message) => Self::Forbidden(message),
      E::InvalidArgument(message) | E::PolicyViolation(message) => {
        Self::BadRequest(message)
      }
      error @ E::InsufficientFunds { .. } => Self::BadRequest(error.to_string()),
      E::Internal(source) => Self::Internal(source),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
      ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
      ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
      ApiError::Internal(source) => {
        tracing::error!(error = %source, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
      }
    };

    (status, Json(json!({ "error": message }))).into_response()
  }
}
