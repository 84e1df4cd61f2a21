//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any store implementing the
//! [`tally_core::store`] traits. Profile-scoped routes resolve the caller
//! from the `profile_id` header; the `/admin` routes take no header and
//! are meant to sit behind an operator-only mount. TLS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! axum::Router::new().merge(tally_api::api_router(store.clone()))
//! ```

pub mod admin;
pub mod auth;
pub mod balances;
pub mod contracts;
pub mod error;
pub mod jobs;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tally_core::{
  billing::Billing,
  store::{ContractStore, JobStore, ProfileStore, Reporting},
};

pub use error::ApiError;

/// State shared by every handler: the raw store for lookups and the
/// billing engine wrapped around it.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:   Arc<S>,
  pub billing: Billing<S>,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ProfileStore + ContractStore + JobStore + Reporting + Clone + Send + Sync + 'static,
{
  let state = AppState { billing: Billing::new(store.clone()), store };

  Router::new()
    // Contracts
    .route("/contracts", get(contracts::list::<S>))
    .route("/contracts/{id}", get(contracts::get_one::<S>))
    // Jobs
    .route("/jobs/unpaid", get(jobs::unpaid::<S>))
    .route("/jobs/{id}/pay", post(jobs::pay::<S>))
    // Balances
    .route("/balances/deposit/{user_id}", post(balances::deposit::<S>))
    // Reporting
    .route("/admin/best-profession", get(admin::best_profession::<S>))
    .route("/admin/best-clients", get(admin::best_clients::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use rust_decimal::Decimal;
  use rust_decimal_macros::dec;
  use serde_json::{Value, json};
  use tally_core::{
    contract::{ContractStatus, NewContract},
    job::NewJob,
    money::Money,
    profile::{NewProfile, ProfileRole},
    store::{JobStore as _, ProfileStore as _},
  };
  use tally_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  fn money(value: Decimal) -> Money {
    Money::new(value).unwrap()
  }

  fn new_client(first_name: &str, balance: Money) -> NewProfile {
    NewProfile {
      first_name: first_name.into(),
      last_name:  "Harland".into(),
      profession: "shipwright".into(),
      balance,
      role:       ProfileRole::Client,
    }
  }

  fn new_contractor(first_name: &str, profession: &str) -> NewProfile {
    NewProfile {
      first_name: first_name.into(),
      last_name:  "Snow".into(),
      profession: profession.into(),
      balance:    Money::ZERO,
      role:       ProfileRole::Contractor,
    }
  }

  struct Rig {
    store:         Arc<SqliteStore>,
    client_id:     i64,
    contractor_id: i64,
    contract_id:   i64,
    job_id:        i64,
  }

  /// One in-progress contract: a client with balance 100.00 owes a
  /// single unpaid 60.00 job to a plumber.
  async fn rig() -> Rig {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let client = store
      .add_profile(new_client("Greta", money(dec!(100.00))))
      .await
      .unwrap();
    let contractor = store
      .add_profile(new_contractor("Jack", "plumber"))
      .await
      .unwrap();
    let contract = store
      .add_contract(NewContract {
        terms:         "net 30".into(),
        status:        ContractStatus::InProgress,
        client_id:     client.profile_id,
        contractor_id: contractor.profile_id,
      })
      .await
      .unwrap();
    let job = store
      .add_job(NewJob {
        description: "hull inspection".into(),
        price:       money(dec!(60.00)),
        contract_id: contract.contract_id,
      })
      .await
      .unwrap();

    Rig {
      store,
      client_id: client.profile_id,
      contractor_id: contractor.profile_id,
      contract_id: contract.contract_id,
      job_id: job.job_id,
    }
  }

  async fn oneshot_json(
    store: Arc<SqliteStore>,
    method: &str,
    uri: &str,
    profile: Option<i64>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = profile {
      builder = builder.header(auth::PROFILE_HEADER, id.to_string());
    }
    let request = match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let response = api_router(store).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  // ── Caller resolution ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_bad_and_unknown_profiles_get_the_same_404() {
    let rig = rig().await;

    for profile in [None, Some(9999)] {
      let (status, body) =
        oneshot_json(rig.store.clone(), "GET", "/contracts", profile, None).await;
      assert_eq!(status, StatusCode::NOT_FOUND);
      assert_eq!(body["error"], "profile not found");
    }

    // An unparseable id behaves exactly like a missing one.
    let request = Request::builder()
      .method("GET")
      .uri("/contracts")
      .header(auth::PROFILE_HEADER, "not-a-number")
      .body(Body::empty())
      .unwrap();
    let response = api_router(rig.store.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }

  // ── Contracts ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn contract_is_visible_only_to_its_parties() {
    let rig = rig().await;
    let uri = format!("/contracts/{}", rig.contract_id);

    let (status, body) =
      oneshot_json(rig.store.clone(), "GET", &uri, Some(rig.client_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["terms"], "net 30");
    assert_eq!(body["status"], "in_progress");

    let (status, body) =
      oneshot_json(rig.store.clone(), "GET", &uri, Some(rig.contractor_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contract_id"], rig.contract_id);

    // A third profile sees the same 404 as for a contract that never
    // existed.
    let stranger = rig
      .store
      .add_profile(new_client("Ada", Money::ZERO))
      .await
      .unwrap();
    let (status, body) =
      oneshot_json(rig.store.clone(), "GET", &uri, Some(stranger.profile_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "contract not found");
  }

  #[tokio::test]
  async fn contract_listing_reports_when_empty() {
    let rig = rig().await;

    let (status, body) =
      oneshot_json(rig.store.clone(), "GET", "/contracts", Some(rig.client_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let idle = rig
      .store
      .add_profile(new_client("Ada", Money::ZERO))
      .await
      .unwrap();
    let (status, body) =
      oneshot_json(rig.store.clone(), "GET", "/contracts", Some(idle.profile_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "no contracts found");
  }

  // ── Jobs ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unpaid_listing_then_payment_clears_it() {
    let rig = rig().await;

    let (status, body) =
      oneshot_json(rig.store.clone(), "GET", "/jobs/unpaid", Some(rig.client_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["description"], "hull inspection");
    assert_eq!(body[0]["price"], "60.00");

    let uri = format!("/jobs/{}/pay", rig.job_id);
    let (status, body) =
      oneshot_json(rig.store.clone(), "POST", &uri, Some(rig.client_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "job paid");
    assert_eq!(body["price"], "60.00");
    assert!(body["payment_date"].is_string());

    let (status, body) =
      oneshot_json(rig.store.clone(), "GET", "/jobs/unpaid", Some(rig.client_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "no unpaid jobs found");
  }

  #[tokio::test]
  async fn payment_moves_the_price_once() {
    let rig = rig().await;
    let uri = format!("/jobs/{}/pay", rig.job_id);

    // The contractor side cannot pay.
    let (status, _) =
      oneshot_json(rig.store.clone(), "POST", &uri, Some(rig.contractor_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
      oneshot_json(rig.store.clone(), "POST", &uri, Some(rig.client_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let client = rig.store.profile(rig.client_id).await.unwrap().unwrap();
    let contractor = rig.store.profile(rig.contractor_id).await.unwrap().unwrap();
    assert_eq!(client.balance, money(dec!(40.00)));
    assert_eq!(contractor.balance, money(dec!(60.00)));

    // Paying again hits the uniform 404.
    let (status, body) =
      oneshot_json(rig.store.clone(), "POST", &uri, Some(rig.client_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "job not found");
  }

  #[tokio::test]
  async fn payment_needs_a_covering_balance() {
    let rig = rig().await;
    let poor = rig
      .store
      .add_profile(new_client("Ada", money(dec!(10.00))))
      .await
      .unwrap();
    let contract = rig
      .store
      .add_contract(NewContract {
        terms:         "net 15".into(),
        status:        ContractStatus::InProgress,
        client_id:     poor.profile_id,
        contractor_id: rig.contractor_id,
      })
      .await
      .unwrap();
    let job = rig
      .store
      .add_job(NewJob {
        description: "rig survey".into(),
        price:       money(dec!(80.00)),
        contract_id: contract.contract_id,
      })
      .await
      .unwrap();

    let uri = format!("/jobs/{}/pay", job.job_id);
    let (status, body) =
      oneshot_json(rig.store.clone(), "POST", &uri, Some(poor.profile_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
      body["error"],
      "insufficient funds: balance 10.00 does not cover price 80.00"
    );
  }

  // ── Deposits ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn deposit_accepts_up_to_the_cap_and_rejects_past_it() {
    let rig = rig().await;
    let saver = rig
      .store
      .add_profile(new_client("Ada", Money::ZERO))
      .await
      .unwrap();
    let contract = rig
      .store
      .add_contract(NewContract {
        terms:         "net 15".into(),
        status:        ContractStatus::InProgress,
        client_id:     saver.profile_id,
        contractor_id: rig.contractor_id,
      })
      .await
      .unwrap();
    rig
      .store
      .add_job(NewJob {
        description: "mast refit".into(),
        price:       money(dec!(100.00)),
        contract_id: contract.contract_id,
      })
      .await
      .unwrap();

    // Unpaid total 100.00, so deposits may take the balance to 125.00.
    let uri = format!("/balances/deposit/{}", saver.profile_id);
    let (status, body) = oneshot_json(
      rig.store.clone(),
      "POST",
      &uri,
      Some(saver.profile_id),
      Some(json!({ "amount": 125.00 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "deposit accepted");
    assert_eq!(body["balance"], "125.00");

    let (status, body) = oneshot_json(
      rig.store.clone(),
      "POST",
      &uri,
      Some(saver.profile_id),
      Some(json!({ "amount": 0.01 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
      body["error"],
      "deposit would exceed the allowed limit: max deposit 125.00, \
       current balance 125.00, headroom 0.00"
    );
  }

  #[tokio::test]
  async fn deposit_into_another_profile_is_forbidden() {
    let rig = rig().await;
    let uri = format!("/balances/deposit/{}", rig.client_id);
    let (status, body) = oneshot_json(
      rig.store.clone(),
      "POST",
      &uri,
      Some(rig.contractor_id),
      Some(json!({ "amount": 10.00 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "cannot deposit into another profile's balance");
  }

  #[tokio::test]
  async fn deposit_requires_a_positive_amount() {
    let rig = rig().await;
    let uri = format!("/balances/deposit/{}", rig.client_id);

    // No body at all.
    let (status, body) =
      oneshot_json(rig.store.clone(), "POST", &uri, Some(rig.client_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "amount is required");

    // A body without an amount.
    let (status, body) = oneshot_json(
      rig.store.clone(),
      "POST",
      &uri,
      Some(rig.client_id),
      Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "amount is required");

    let (status, body) = oneshot_json(
      rig.store.clone(),
      "POST",
      &uri,
      Some(rig.client_id),
      Some(json!({ "amount": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "amount must be positive");
  }

  #[tokio::test]
  async fn deposit_needs_outstanding_unpaid_work() {
    let rig = rig().await;
    let idle = rig
      .store
      .add_profile(new_client("Ada", Money::ZERO))
      .await
      .unwrap();
    let uri = format!("/balances/deposit/{}", idle.profile_id);
    let (status, body) = oneshot_json(
      rig.store.clone(),
      "POST",
      &uri,
      Some(idle.profile_id),
      Some(json!({ "amount": 10.00 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no unpaid jobs to deposit against");
  }

  // ── Reporting ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn reporting_requires_both_dates() {
    let rig = rig().await;
    let (status, body) = oneshot_json(
      rig.store.clone(),
      "GET",
      "/admin/best-profession?start=2026-01-01",
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "start and end dates are required");
  }

  #[tokio::test]
  async fn reporting_is_empty_before_any_payment() {
    let rig = rig().await;
    let range = "start=2000-01-01&end=2100-01-01";

    let (status, body) = oneshot_json(
      rig.store.clone(),
      "GET",
      &format!("/admin/best-profession?{range}"),
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "no paid jobs in range");

    let (status, body) = oneshot_json(
      rig.store.clone(),
      "GET",
      &format!("/admin/best-clients?{range}"),
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "no paid jobs in range");
  }

  #[tokio::test]
  async fn best_profession_and_clients_reflect_settled_payments() {
    let rig = rig().await;
    let uri = format!("/jobs/{}/pay", rig.job_id);
    let (status, _) =
      oneshot_json(rig.store.clone(), "POST", &uri, Some(rig.client_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let range = "start=2000-01-01&end=2100-01-01";
    let (status, body) = oneshot_json(
      rig.store.clone(),
      "GET",
      &format!("/admin/best-profession?{range}"),
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profession"], "plumber");
    assert_eq!(body["earned"], "60.00");

    let (status, body) = oneshot_json(
      rig.store.clone(),
      "GET",
      &format!("/admin/best-clients?{range}&limit=1"),
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["full_name"], "Greta Harland");
    assert_eq!(body[0]["paid"], "60.00");
  }

  #[tokio::test]
  async fn best_clients_defaults_to_two_rows() {
    let rig = rig().await;

    // Two more clients pay smaller totals; the default limit keeps two
    // of the three payers.
    for (name, price) in [("Bea", dec!(20.00)), ("Cleo", dec!(10.00))] {
      let payer = rig
        .store
        .add_profile(new_client(name, money(price)))
        .await
        .unwrap();
      let contract = rig
        .store
        .add_contract(NewContract {
          terms:         "net 15".into(),
          status:        ContractStatus::InProgress,
          client_id:     payer.profile_id,
          contractor_id: rig.contractor_id,
        })
        .await
        .unwrap();
      let job = rig
        .store
        .add_job(NewJob {
          description: "odd job".into(),
          price:       money(price),
          contract_id: contract.contract_id,
        })
        .await
        .unwrap();
      rig
        .store
        .settle(job.job_id, payer.profile_id, rig.contractor_id, money(price))
        .await
        .unwrap();
    }

    let uri = format!("/jobs/{}/pay", rig.job_id);
    let (status, _) =
      oneshot_json(rig.store.clone(), "POST", &uri, Some(rig.client_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = oneshot_json(
      rig.store.clone(),
      "GET",
      "/admin/best-clients?start=2000-01-01&end=2100-01-01",
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[0]["full_name"], "Greta Harland");
    assert_eq!(body[1]["full_name"], "Bea Harland");
  }
}
