//! Job endpoints.
//!
//! | Method | Path             | Description                            |
//! |--------|------------------|----------------------------------------|
//! | `GET`  | `/jobs/unpaid`   | Unpaid jobs under the caller's active contracts |
//! | `POST` | `/jobs/{id}/pay` | Pays a job from the caller's balance   |

use axum::{
  Json,
  extract::{Path, State},
};
use serde_json::{Value, json};
use tally_core::store::{ContractStore, JobStore, ProfileStore};

use crate::{AppState, auth::Requester, error::ApiError};

/// `GET /jobs/unpaid`
pub async fn unpaid<S>(
  State(state): State<AppState<S>>,
  Requester(profile): Requester,
) -> Result<Json<Value>, ApiError>
where
  S: ProfileStore + ContractStore + JobStore,
{
  let jobs = state.billing.unpaid_jobs(&profile).await?;
  if jobs.is_empty() {
    return Ok(Json(json!({ "message": "no unpaid jobs found" })));
  }
  Ok(Json(json!(jobs)))
}

/// `POST /jobs/{id}/pay`
///
/// Only the contract's client can pay, and only while the job is unpaid
/// and the client's balance covers the price. Succeeds at most once per
/// job; a repeat attempt gets the same 404 as a job that never existed.
pub async fn pay<S>(
  State(state): State<AppState<S>>,
  Requester(profile): Requester,
  Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  S: ProfileStore + ContractStore + JobStore,
{
  let receipt = state.billing.pay_job(&profile, id).await?;
  Ok(Json(json!({
    "message": "job paid",
    "job_id": receipt.job_id,
    "price": receipt.price,
    "payment_date": receipt.paid_at,
  })))
}
