//! Contracts — agreements binding one client to one contractor.

use serde::{Deserialize, Serialize};

/// Contract lifecycle status. Only `InProgress` contracts carry payable
/// work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
  New,
  InProgress,
  Terminated,
}

/// A stored contract. The client and contractor are always distinct
/// profiles; the schema enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
  pub contract_id:   i64,
  pub terms:         String,
  pub status:        ContractStatus,
  pub client_id:     i64,
  pub contractor_id: i64,
}

/// Input for creating a contract, used by seeding and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContract {
  pub terms:         String,
  pub status:        ContractStatus,
  pub client_id:     i64,
  pub contractor_id: i64,
}
