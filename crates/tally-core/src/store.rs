//! Traits a storage backend implements.
//!
//! The billing engine receives [`ProfileStore`], [`ContractStore`], and
//! [`JobStore`] by injection and never touches storage directly.
//! [`Reporting`] backs the admin aggregation endpoints and plays no part
//! in payments or deposits.
//!
//! Methods return `Send` futures so the traits work across a
//! multi-threaded async runtime.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
  contract::Contract,
  job::{Job, PayableJob},
  money::Money,
  profile::Profile,
  report::{ClientTotal, ProfessionTotal},
};

// ─── Backend ─────────────────────────────────────────────────────────────────

/// Shared surface of a storage backend: one error type across every
/// store trait, so a backend implementing several stays usable behind a
/// single generic parameter.
pub trait StoreBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Conditional-write outcomes ──────────────────────────────────────────────

/// What the settlement transaction did. Its conditional updates re-check
/// what the engine validated, so a concurrent winner turns the loser
/// into `AlreadyPaid` instead of a double pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
  /// The transfer committed; the job is paid as of `paid_at`.
  Settled { paid_at: DateTime<Utc> },
  /// The job was no longer unpaid when the transaction ran.
  AlreadyPaid,
  /// The client's balance no longer covered the price when the
  /// transaction ran. Carries the balance the transaction observed.
  InsufficientFunds { balance: Money },
}

/// What the capped conditional credit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
  /// The balance increased; carries the new balance.
  Credited { balance: Money },
  /// Crediting would push the balance past the cap; nothing changed.
  /// Carries the unchanged balance.
  CapExceeded { balance: Money },
}

// ─── Profiles ────────────────────────────────────────────────────────────────

pub trait ProfileStore: StoreBackend {
  /// Retrieves a profile by id, or `None` if it does not exist.
  fn profile(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Adds `amount` to a profile's balance only if the result stays
  /// within `cap`. The check and the write are a single atomic
  /// statement.
  fn credit_capped(
    &self,
    id: i64,
    amount: Money,
    cap: Money,
  ) -> impl Future<Output = Result<CreditOutcome, Self::Error>> + Send + '_;
}

// ─── Contracts ───────────────────────────────────────────────────────────────

pub trait ContractStore: StoreBackend {
  /// Retrieves a contract by id, visible only if `profile_id` is its
  /// client or contractor. `None` covers both "absent" and "not yours".
  fn contract_for(
    &self,
    id: i64,
    profile_id: i64,
  ) -> impl Future<Output = Result<Option<Contract>, Self::Error>> + Send + '_;

  /// All non-terminated contracts where `profile_id` is client or
  /// contractor.
  fn contracts_for(
    &self,
    profile_id: i64,
  ) -> impl Future<Output = Result<Vec<Contract>, Self::Error>> + Send + '_;
}

// ─── Jobs ────────────────────────────────────────────────────────────────────

pub trait JobStore: StoreBackend {
  /// Unpaid jobs under in-progress contracts where `profile_id` is
  /// client or contractor.
  fn unpaid_jobs_for(
    &self,
    profile_id: i64,
  ) -> impl Future<Output = Result<Vec<Job>, Self::Error>> + Send + '_;

  /// The unpaid job `job_id` joined to its contract, provided the
  /// contract is in progress and `client_id` is its client. `None` if
  /// any of that fails, without saying which part.
  fn find_payable(
    &self,
    job_id: i64,
    client_id: i64,
  ) -> impl Future<Output = Result<Option<PayableJob>, Self::Error>> + Send + '_;

  /// Sum of unpaid job prices across `client_id`'s in-progress
  /// contracts. Zero when there are none.
  fn unpaid_total_for_client(
    &self,
    client_id: i64,
  ) -> impl Future<Output = Result<Money, Self::Error>> + Send + '_;

  /// The settlement transaction: stamp the job paid, debit the client,
  /// credit the contractor. All three steps commit together or not at
  /// all, and each step is conditional on the state it assumes.
  fn settle(
    &self,
    job_id: i64,
    client_id: i64,
    contractor_id: i64,
    price: Money,
  ) -> impl Future<Output = Result<SettleOutcome, Self::Error>> + Send + '_;
}

// ─── Reporting ───────────────────────────────────────────────────────────────

pub trait Reporting: StoreBackend {
  /// The profession whose contractors earned the most from jobs paid
  /// within the inclusive UTC date range, or `None` if nothing was paid
  /// in it.
  fn best_profession(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Option<ProfessionTotal>, Self::Error>> + Send + '_;

  /// Clients ranked by what they paid within the inclusive UTC date
  /// range, biggest spender first, at most `limit` rows.
  fn best_clients(
    &self,
    start: NaiveDate,
    end: NaiveDate,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<ClientTotal>, Self::Error>> + Send + '_;
}
