//! Seed loading.
//!
//! A seed file is a JSON document with three optional arrays:
//!
//! ```json
//! {
//!   "profiles": [
//!     { "profile_id": 1, "first_name": "Greta", "last_name": "Harland",
//!       "profession": "shipwright", "balance": 1150, "role": "client" }
//!   ],
//!   "contracts": [
//!     { "contract_id": 1, "terms": "net 30", "status": "in_progress",
//!       "client_id": 1, "contractor_id": 2 }
//!   ],
//!   "jobs": [
//!     { "description": "hull inspection", "price": 200.10, "contract_id": 1 }
//!   ]
//! }
//! ```
//!
//! Profiles and contracts carry explicit ids so contracts can name their
//! parties; jobs are inserted in file order and get assigned ids. Seeding
//! into a store that already holds one of the ids fails.

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;
use tally_core::{contract::NewContract, job::NewJob, profile::NewProfile};
use tally_store_sqlite::SqliteStore;

#[derive(Debug, Deserialize)]
struct SeedDoc {
  #[serde(default)]
  profiles:  Vec<SeedProfile>,
  #[serde(default)]
  contracts: Vec<SeedContract>,
  #[serde(default)]
  jobs:      Vec<NewJob>,
}

#[derive(Debug, Deserialize)]
struct SeedProfile {
  profile_id: i64,
  #[serde(flatten)]
  profile:    NewProfile,
}

#[derive(Debug, Deserialize)]
struct SeedContract {
  contract_id: i64,
  #[serde(flatten)]
  contract:    NewContract,
}

/// Read the seed file at `path` and insert its contents into `store`.
pub async fn apply(store: &SqliteStore, path: &Path) -> anyhow::Result<()> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read seed file {path:?}"))?;
  let doc: SeedDoc =
    serde_json::from_str(&raw).context("failed to parse seed file")?;
  insert(store, doc).await
}

async fn insert(store: &SqliteStore, doc: SeedDoc) -> anyhow::Result<()> {
  let (profiles, contracts, jobs) =
    (doc.profiles.len(), doc.contracts.len(), doc.jobs.len());

  // Profiles first, then contracts, then jobs, so the schema's foreign
  // keys always see their referents.
  for SeedProfile { profile_id, profile } in doc.profiles {
    store
      .add_profile_with_id(profile_id, profile)
      .await
      .with_context(|| format!("failed to seed profile {profile_id}"))?;
  }
  for SeedContract { contract_id, contract } in doc.contracts {
    store
      .add_contract_with_id(contract_id, contract)
      .await
      .with_context(|| format!("failed to seed contract {contract_id}"))?;
  }
  for job in doc.jobs {
    let contract_id = job.contract_id;
    store
      .add_job(job)
      .await
      .with_context(|| format!("failed to seed job under contract {contract_id}"))?;
  }

  tracing::info!(profiles, contracts, jobs, "seeded store");
  Ok(())
}
