//! The billing engine: payment, deposits, and the thin query helpers.
//!
//! [`Billing`] owns an [`Arc`] to any backend implementing the store
//! traits. Every business rule lives here; the store contributes the
//! filtered lookups and the two atomic conditional writes (settlement
//! and capped credit).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
  contract::Contract,
  error::{Error, Result},
  job::Job,
  money::Money,
  profile::Profile,
  store::{ContractStore, CreditOutcome, JobStore, ProfileStore, SettleOutcome},
};

// ─── Deposit cap ─────────────────────────────────────────────────────────────

/// The most a client's balance may reach through deposits: 125% of the
/// total price of their unpaid jobs under in-progress contracts.
pub fn deposit_limit(total_unpaid: Money) -> Money {
  // Flooring to the cent is exact: balance and amount are whole cents,
  // so `balance + amount <= cap` and `<= floor_cent(cap)` agree.
  Money::floor_cent(total_unpaid.as_decimal() * dec!(1.25))
}

// ─── Receipts ────────────────────────────────────────────────────────────────

/// Outcome of a successful payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
  pub job_id:  i64,
  pub price:   Money,
  pub paid_at: DateTime<Utc>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The payment engine and deposit policy over an injected store backend.
#[derive(Clone)]
pub struct Billing<S> {
  store: Arc<S>,
}

impl<S> Billing<S>
where
  S: ProfileStore + ContractStore + JobStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  // ─── Payment engine ────────────────────────────────────────────────────────

  /// Pays the unpaid job `job_id` as `requester`, who must be the client
  /// on its in-progress contract.
  ///
  /// A missing job, an already-paid job, another client's job, and a job
  /// on a contract that is not in progress all report `NotFound`; the
  /// caller cannot tell which.
  pub async fn pay_job(&self, requester: &Profile, job_id: i64) -> Result<Receipt> {
    let payable = self
      .store
      .find_payable(job_id, requester.profile_id)
      .await
      .map_err(internal)?
      .ok_or(Error::NotFound("job"))?;

    let price = payable.job.price;
    if requester.balance < price {
      return Err(Error::InsufficientFunds { balance: requester.balance, price });
    }

    match self
      .store
      .settle(job_id, requester.profile_id, payable.contractor_id, price)
      .await
      .map_err(internal)?
    {
      SettleOutcome::Settled { paid_at } => Ok(Receipt { job_id, price, paid_at }),
      // A concurrent payment won the race after our lookup.
      SettleOutcome::AlreadyPaid => Err(Error::NotFound("job")),
      SettleOutcome::InsufficientFunds { balance } => {
        Err(Error::InsufficientFunds { balance, price })
      }
    }
  }

  // ─── Deposit policy ────────────────────────────────────────────────────────

  /// Deposits `amount` into `target_id`'s balance on behalf of
  /// `requester`, returning the new balance.
  ///
  /// The amount arrives as a raw optional decimal so that "missing" and
  /// "unrepresentable" are judged here, in rule order: ownership first,
  /// then validity, then the cap.
  pub async fn deposit(
    &self,
    requester: &Profile,
    target_id: i64,
    amount: Option<Decimal>,
  ) -> Result<Money> {
    if requester.profile_id != target_id {
      return Err(Error::Forbidden(
        "cannot deposit into another profile's balance".into(),
      ));
    }

    let amount = match amount {
      None => return Err(Error::InvalidArgument("amount is required".into())),
      Some(a) if a <= Decimal::ZERO => {
        return Err(Error::InvalidArgument("amount must be positive".into()));
      }
      Some(a) => Money::new(a)?,
    };

    let total_unpaid = self
      .store
      .unpaid_total_for_client(target_id)
      .await
      .map_err(internal)?;
    if total_unpaid.is_zero() {
      return Err(Error::PolicyViolation(
        "no unpaid jobs to deposit against".into(),
      ));
    }

    let cap = deposit_limit(total_unpaid);
    match self
      .store
      .credit_capped(target_id, amount, cap)
      .await
      .map_err(internal)?
    {
      CreditOutcome::Credited { balance } => Ok(balance),
      CreditOutcome::CapExceeded { balance } => {
        let headroom = (cap.as_decimal() - balance.as_decimal()).round_dp(2);
        Err(Error::PolicyViolation(format!(
          "deposit would exceed the allowed limit: max deposit {cap}, \
           current balance {balance}, headroom {headroom}"
        )))
      }
    }
  }

  // ─── Query helpers ─────────────────────────────────────────────────────────

  /// A contract by id, visible only to its client or contractor.
  pub async fn contract(&self, requester: &Profile, id: i64) -> Result<Contract> {
    self
      .store
      .contract_for(id, requester.profile_id)
      .await
      .map_err(internal)?
      .ok_or(Error::NotFound("contract"))
  }

  /// The requester's non-terminated contracts.
  pub async fn contracts(&self, requester: &Profile) -> Result<Vec<Contract>> {
    self
      .store
      .contracts_for(requester.profile_id)
      .await
      .map_err(internal)
  }

  /// The requester's unpaid jobs under in-progress contracts.
  pub async fn unpaid_jobs(&self, requester: &Profile) -> Result<Vec<Job>> {
    self
      .store
      .unpaid_jobs_for(requester.profile_id)
      .await
      .map_err(internal)
  }
}

/// Boxes an unexpected store failure into the `Internal` taxonomy slot.
fn internal<E>(error: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Internal(Box::new(error))
}
