//! Contract endpoints.
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | `GET`  | `/contracts/{id}` | One contract the caller is party to  |
//! | `GET`  | `/contracts`      | The caller's non-terminated contracts |

use axum::{
  Json,
  extract::{Path, State},
};
use serde_json::{Value, json};
use tally_core::{
  contract::Contract,
  store::{ContractStore, JobStore, ProfileStore},
};

use crate::{AppState, auth::Requester, error::ApiError};

/// `GET /contracts/{id}`
///
/// 404 unless the caller is the contract's client or contractor; an
/// existing contract belonging to someone else is indistinguishable
/// from one that does not exist.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Requester(profile): Requester,
  Path(id): Path<i64>,
) -> Result<Json<Contract>, ApiError>
where
  S: ProfileStore + ContractStore + JobStore,
{
  let contract = state.billing.contract(&profile, id).await?;
  Ok(Json(contract))
}

/// `GET /contracts`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Requester(profile): Requester,
) -> Result<Json<Value>, ApiError>
where
  S: ProfileStore + ContractStore + JobStore,
{
  let contracts = state.billing.contracts(&profile).await?;
  if contracts.is_empty() {
    return Ok(Json(json!({ "message": "no contracts found" })));
  }
  Ok(Json(json!(contracts)))
}
