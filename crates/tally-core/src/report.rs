//! Read models for the admin aggregation queries.

use serde::Serialize;

use crate::money::Money;

/// The profession whose contractors earned the most in a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessionTotal {
  pub profession: String,
  pub earned:     Money,
}

/// A client ranked by how much they paid in a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientTotal {
  pub profile_id: i64,
  pub full_name:  String,
  pub paid:       Money,
}
