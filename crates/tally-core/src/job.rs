//! Jobs — units of billable work under a contract, paid at most once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A stored job.
///
/// A paid job always carries a payment date, and its price never changes
/// afterwards. The settlement transaction is the only mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
  pub job_id:       i64,
  pub description:  String,
  pub price:        Money,
  pub paid:         bool,
  pub payment_date: Option<DateTime<Utc>>,
  pub contract_id:  i64,
}

/// Input for creating a job, used by seeding and tests. Jobs start
/// unpaid.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
  pub description: String,
  pub price:       Money,
  pub contract_id: i64,
}

/// An unpaid job a specific client may pay, joined with the contract's
/// contractor. Produced by the job store's payment lookup.
#[derive(Debug, Clone)]
pub struct PayableJob {
  pub job:           Job,
  pub contractor_id: i64,
}
