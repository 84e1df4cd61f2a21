//! Balance endpoints.
//!
//! | Method | Path                          | Description                |
//! |--------|-------------------------------|----------------------------|
//! | `POST` | `/balances/deposit/{user_id}` | Deposits into a client balance |

use axum::{
  Json,
  body::Bytes,
  extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::store::{ContractStore, JobStore, ProfileStore};

use crate::{AppState, auth::Requester, error::ApiError};

/// Body of a deposit request: `{ "amount": 25.00 }`.
#[derive(Debug, Deserialize)]
struct DepositBody {
  amount: Option<Decimal>,
}

/// `POST /balances/deposit/{user_id}`
///
/// The caller can only deposit into their own balance, and only while
/// they have unpaid jobs; the deposit may not push the balance past 125%
/// of the unpaid total. An absent or malformed body counts as a missing
/// amount.
pub async fn deposit<S>(
  State(state): State<AppState<S>>,
  Requester(profile): Requester,
  Path(user_id): Path<i64>,
  body: Bytes,
) -> Result<Json<Value>, ApiError>
where
  S: ProfileStore + ContractStore + JobStore,
{
  let amount = serde_json::from_slice::<DepositBody>(&body)
    .map(|body| body.amount)
    .unwrap_or(None);

  let balance = state.billing.deposit(&profile, user_id, amount).await?;
  Ok(Json(json!({ "message": "deposit accepted", "balance": balance })))
}
