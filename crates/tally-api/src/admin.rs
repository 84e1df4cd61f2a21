//! Reporting endpoints.
//!
//! | Method | Path                     | Description                       |
//! |--------|--------------------------|-----------------------------------|
//! | `GET`  | `/admin/best-profession` | Top-earning profession in a range |
//! | `GET`  | `/admin/best-clients`    | Top-paying clients in a range     |
//!
//! These are operator queries and take no `profile_id` header. Both
//! require `start` and `end` dates (ISO `YYYY-MM-DD`, inclusive).

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::store::Reporting;

use crate::{AppState, error::ApiError};

/// Query parameters shared by the reporting endpoints.
#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub start: Option<NaiveDate>,
  pub end:   Option<NaiveDate>,
  pub limit: Option<u32>,
}

impl RangeParams {
  fn range(&self) -> Result<(NaiveDate, NaiveDate), ApiError> {
    match (self.start, self.end) {
      (Some(start), Some(end)) => Ok((start, end)),
      _ => Err(ApiError::BadRequest("start and end dates are required".into())),
    }
  }
}

/// `GET /admin/best-profession?start=…&end=…`
pub async fn best_profession<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Value>, ApiError>
where
  S: Reporting,
{
  let (start, end) = params.range()?;
  let best = state
    .store
    .best_profession(start, end)
    .await
    .map_err(|e| ApiError::Internal(Box::new(e)))?;

  Ok(Json(match best {
    Some(total) => json!(total),
    None => json!({ "message": "no paid jobs in range" }),
  }))
}

/// `GET /admin/best-clients?start=…&end=…&limit=…`
///
/// `limit` defaults to 2.
pub async fn best_clients<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Value>, ApiError>
where
  S: Reporting,
{
  let (start, end) = params.range()?;
  let limit = params.limit.unwrap_or(2);
  let clients = state
    .store
    .best_clients(start, end, limit)
    .await
    .map_err(|e| ApiError::Internal(Box::new(e)))?;

  if clients.is_empty() {
    return Ok(Json(json!({ "message": "no paid jobs in range" })));
  }
  Ok(Json(json!(clients)))
}
