//! Profiles — the accounts that hold balances and stand on contracts.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Which side of a contract a profile stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileRole {
  Client,
  Contractor,
}

/// A stored profile.
///
/// Balances are always present here; the storage layer owns the
/// "missing balance reads as zero" normalisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id: i64,
  pub first_name: String,
  pub last_name:  String,
  pub profession: String,
  pub balance:    Money,
  pub role:       ProfileRole,
}

impl Profile {
  /// "First Last", as the reporting queries present clients.
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Input for creating a profile, used by seeding and tests. Requests
/// never create profiles.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
  pub first_name: String,
  pub last_name:  String,
  pub profession: String,
  #[serde(default)]
  pub balance:    Money,
  pub role:       ProfileRole,
}
