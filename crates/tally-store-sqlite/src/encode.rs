//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, money as integer minor
//! units, and the role/status enums as lowercase strings.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use tally_core::{
  contract::{Contract, ContractStatus},
  job::Job,
  money::Money,
  profile::{Profile, ProfileRole},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

/// Bounds of the inclusive UTC date range `[start, end]` as RFC 3339
/// strings, with the upper bound exclusive (midnight after `end`).
/// Stored stamps all carry the `+00:00` offset, so plain string
/// comparison against these bounds is a correct timestamp comparison.
pub fn encode_date_range(start: NaiveDate, end: NaiveDate) -> (String, String) {
  let lo = start.and_time(NaiveTime::MIN).and_utc();
  let hi = end
    .checked_add_days(Days::new(1))
    .unwrap_or(NaiveDate::MAX)
    .and_time(NaiveTime::MIN)
    .and_utc();
  (encode_dt(lo), encode_dt(hi))
}

// ─── ProfileRole ─────────────────────────────────────────────────────────────

pub fn encode_role(r: ProfileRole) -> &'static str {
  match r {
    ProfileRole::Client => "client",
    ProfileRole::Contractor => "contractor",
  }
}

pub fn decode_role(s: &str) -> Result<ProfileRole> {
  match s {
    "client" => Ok(ProfileRole::Client),
    "contractor" => Ok(ProfileRole::Contractor),
    other => Err(Error::Decode(format!("unknown profile role: {other:?}"))),
  }
}

// ─── ContractStatus ──────────────────────────────────────────────────────────

pub fn encode_status(s: ContractStatus) -> &'static str {
  match s {
    ContractStatus::New => "new",
    ContractStatus::InProgress => "in_progress",
    ContractStatus::Terminated => "terminated",
  }
}

pub fn decode_status(s: &str) -> Result<ContractStatus> {
  match s {
    "new" => Ok(ContractStatus::New),
    "in_progress" => Ok(ContractStatus::InProgress),
    "terminated" => Ok(ContractStatus::Terminated),
    other => Err(Error::Decode(format!("unknown contract status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id: i64,
  pub first_name: String,
  pub last_name:  String,
  pub profession: String,
  pub balance:    i64,
  pub role:       String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id: self.profile_id,
      first_name: self.first_name,
      last_name:  self.last_name,
      profession: self.profession,
      balance:    Money::from_minor(self.balance),
      role:       decode_role(&self.role)?,
    })
  }
}

/// Raw values read directly from a `contracts` row.
pub struct RawContract {
  pub contract_id:   i64,
  pub terms:         String,
  pub status:        String,
  pub client_id:     i64,
  pub contractor_id: i64,
}

impl RawContract {
  pub fn into_contract(self) -> Result<Contract> {
    Ok(Contract {
      contract_id:   self.contract_id,
      terms:         self.terms,
      status:        decode_status(&self.status)?,
      client_id:     self.client_id,
      contractor_id: self.contractor_id,
    })
  }
}

/// Raw values read directly from a `jobs` row.
pub struct RawJob {
  pub job_id:       i64,
  pub description:  String,
  pub price:        i64,
  pub paid:         bool,
  pub payment_date: Option<String>,
  pub contract_id:  i64,
}

impl RawJob {
  pub fn into_job(self) -> Result<Job> {
    let payment_date = self.payment_date.as_deref().map(decode_dt).transpose()?;
    Ok(Job {
      job_id:      self.job_id,
      description: self.description,
      price:       Money::from_minor(self.price),
      paid:        self.paid,
      payment_date,
      contract_id: self.contract_id,
    })
  }
}
