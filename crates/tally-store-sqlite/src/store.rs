//! [`SqliteStore`] — the SQLite implementation of the Tally store traits.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use tally_core::{
  contract::{Contract, NewContract},
  job::{Job, NewJob, PayableJob},
  money::Money,
  profile::{NewProfile, Profile},
  report::{ClientTotal, ProfessionTotal},
  store::{
    ContractStore, CreditOutcome, JobStore, ProfileStore, Reporting,
    SettleOutcome, StoreBackend,
  },
};

use crate::{
  encode::{
    encode_date_range, encode_dt, encode_role, encode_status, RawContract,
    RawJob, RawProfile,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally billing store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// clones funnel onto the same background thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Creation — the seed/test path ─────────────────────────────────────────
  //
  // Requests never create rows; seed files and tests do. Referential
  // integrity is the schema's foreign keys.

  /// Insert a profile, letting SQLite assign the id.
  pub async fn add_profile(&self, new: NewProfile) -> Result<Profile> {
    let first_name    = new.first_name.clone();
    let last_name     = new.last_name.clone();
    let profession    = new.profession.clone();
    let balance_minor = new.balance.minor();
    let role_str      = encode_role(new.role).to_owned();

    let profile_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (first_name, last_name, profession, balance, role)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![first_name, last_name, profession, balance_minor, role_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Profile {
      profile_id,
      first_name: new.first_name,
      last_name:  new.last_name,
      profession: new.profession,
      balance:    new.balance,
      role:       new.role,
    })
  }

  /// Insert a profile under an explicit id, the way seed files refer to
  /// profiles from contracts.
  pub async fn add_profile_with_id(
    &self,
    profile_id: i64,
    new: NewProfile,
  ) -> Result<Profile> {
    let first_name    = new.first_name.clone();
    let last_name     = new.last_name.clone();
    let profession    = new.profession.clone();
    let balance_minor = new.balance.minor();
    let role_str      = encode_role(new.role).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (profile_id, first_name, last_name, profession, balance, role)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            profile_id,
            first_name,
            last_name,
            profession,
            balance_minor,
            role_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(Profile {
      profile_id,
      first_name: new.first_name,
      last_name:  new.last_name,
      profession: new.profession,
      balance:    new.balance,
      role:       new.role,
    })
  }

  /// Insert a contract, letting SQLite assign the id.
  pub async fn add_contract(&self, new: NewContract) -> Result<Contract> {
    let terms         = new.terms.clone();
    let status_str    = encode_status(new.status).to_owned();
    let client_id     = new.client_id;
    let contractor_id = new.contractor_id;

    let contract_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contracts (terms, status, client_id, contractor_id)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![terms, status_str, client_id, contractor_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Contract {
      contract_id,
      terms: new.terms,
      status: new.status,
      client_id: new.client_id,
      contractor_id: new.contractor_id,
    })
  }

  /// Insert a contract under an explicit id.
  pub async fn add_contract_with_id(
    &self,
    contract_id: i64,
    new: NewContract,
  ) -> Result<Contract> {
    let terms         = new.terms.clone();
    let status_str    = encode_status(new.status).to_owned();
    let client_id     = new.client_id;
    let contractor_id = new.contractor_id;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contracts (contract_id, terms, status, client_id, contractor_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![contract_id, terms, status_str, client_id, contractor_id],
        )?;
        Ok(())
      })
      .await?;

    Ok(Contract {
      contract_id,
      terms: new.terms,
      status: new.status,
      client_id: new.client_id,
      contractor_id: new.contractor_id,
    })
  }

  /// Insert an unpaid job, letting SQLite assign the id.
  pub async fn add_job(&self, new: NewJob) -> Result<Job> {
    let description = new.description.clone();
    let price_minor = new.price.minor();
    let contract_id = new.contract_id;

    let job_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO jobs (description, price, contract_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![description, price_minor, contract_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Job {
      job_id,
      description: new.description,
      price: new.price,
      paid: false,
      payment_date: None,
      contract_id: new.contract_id,
    })
  }

  /// Fetch a job by id, unfiltered. Tests read through this; request
  /// paths go through the [`JobStore`] lookups.
  pub async fn job(&self, id: i64) -> Result<Option<Job>> {
    let raw: Option<RawJob> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT job_id, description, price, paid, payment_date, contract_id
               FROM jobs WHERE job_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawJob {
                  job_id:       row.get(0)?,
                  description:  row.get(1)?,
                  price:        row.get(2)?,
                  paid:         row.get(3)?,
                  payment_date: row.get(4)?,
                  contract_id:  row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawJob::into_job).transpose()
  }
}

// ─── StoreBackend impl ───────────────────────────────────────────────────────

impl StoreBackend for SqliteStore {
  type Error = Error;
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  async fn profile(&self, id: i64) -> Result<Option<Profile>> {
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT profile_id, first_name, last_name, profession, balance, role
               FROM profiles WHERE profile_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawProfile {
                  profile_id: row.get(0)?,
                  first_name: row.get(1)?,
                  last_name:  row.get(2)?,
                  profession: row.get(3)?,
                  balance:    row.get(4)?,
                  role:       row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn credit_capped(
    &self,
    id: i64,
    amount: Money,
    cap: Money,
  ) -> Result<CreditOutcome> {
    let amount_minor = amount.minor();
    let cap_minor    = cap.minor();

    // The UPDATE re-checks the cap against the live balance in the same
    // statement, then the SELECT reads the post-update balance. Both run
    // inside one serialised call, so no other write interleaves.
    let (updated, balance): (usize, Option<i64>) = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE profiles SET balance = balance + ?2
           WHERE profile_id = ?1 AND balance + ?2 <= ?3",
          rusqlite::params![id, amount_minor, cap_minor],
        )?;

        let balance: Option<i64> = conn
          .query_row(
            "SELECT balance FROM profiles WHERE profile_id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
          )
          .optional()?;

        Ok((updated, balance))
      })
      .await?;

    let balance = Money::from_minor(balance.ok_or(Error::ProfileNotFound(id))?);
    if updated == 1 {
      Ok(CreditOutcome::Credited { balance })
    } else {
      Ok(CreditOutcome::CapExceeded { balance })
    }
  }
}

// ─── ContractStore impl ──────────────────────────────────────────────────────

impl ContractStore for SqliteStore {
  async fn contract_for(&self, id: i64, profile_id: i64) -> Result<Option<Contract>> {
    let raw: Option<RawContract> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT contract_id, terms, status, client_id, contractor_id
               FROM contracts
               WHERE contract_id = ?1 AND (client_id = ?2 OR contractor_id = ?2)",
              rusqlite::params![id, profile_id],
              |row| {
                Ok(RawContract {
                  contract_id:   row.get(0)?,
                  terms:         row.get(1)?,
                  status:        row.get(2)?,
                  client_id:     row.get(3)?,
                  contractor_id: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContract::into_contract).transpose()
  }

  async fn contracts_for(&self, profile_id: i64) -> Result<Vec<Contract>> {
    let raws: Vec<RawContract> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT contract_id, terms, status, client_id, contractor_id
           FROM contracts
           WHERE (client_id = ?1 OR contractor_id = ?1)
             AND status != 'terminated'
           ORDER BY contract_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![profile_id], |row| {
            Ok(RawContract {
              contract_id:   row.get(0)?,
              terms:         row.get(1)?,
              status:        row.get(2)?,
              client_id:     row.get(3)?,
              contractor_id: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContract::into_contract).collect()
  }
}

// ─── JobStore impl ───────────────────────────────────────────────────────────

/// What happened inside the settlement transaction, before mapping onto
/// [`SettleOutcome`] or a store error.
enum SettleTx {
  Settled,
  AlreadyPaid,
  /// The conditional debit matched nothing; `balance` is the client's
  /// current balance, `None` if the row is gone.
  ClientShort { balance: Option<i64> },
  /// The credit matched nothing: the contractor row is gone.
  NoContractor,
}

impl JobStore for SqliteStore {
  async fn unpaid_jobs_for(&self, profile_id: i64) -> Result<Vec<Job>> {
    let raws: Vec<RawJob> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT j.job_id, j.description, j.price, j.paid, j.payment_date, j.contract_id
           FROM jobs j
           JOIN contracts c ON c.contract_id = j.contract_id
           WHERE (c.client_id = ?1 OR c.contractor_id = ?1)
             AND c.status = 'in_progress'
             AND j.paid = 0
           ORDER BY j.job_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![profile_id], |row| {
            Ok(RawJob {
              job_id:       row.get(0)?,
              description:  row.get(1)?,
              price:        row.get(2)?,
              paid:         row.get(3)?,
              payment_date: row.get(4)?,
              contract_id:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawJob::into_job).collect()
  }

  async fn find_payable(
    &self,
    job_id: i64,
    client_id: i64,
  ) -> Result<Option<PayableJob>> {
    let raw: Option<(RawJob, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT j.job_id, j.description, j.price, j.paid, j.payment_date,
                      j.contract_id, c.contractor_id
               FROM jobs j
               JOIN contracts c ON c.contract_id = j.contract_id
               WHERE j.job_id = ?1
                 AND j.paid = 0
                 AND c.client_id = ?2
                 AND c.status = 'in_progress'",
              rusqlite::params![job_id, client_id],
              |row| {
                Ok((
                  RawJob {
                    job_id:       row.get(0)?,
                    description:  row.get(1)?,
                    price:        row.get(2)?,
                    paid:         row.get(3)?,
                    payment_date: row.get(4)?,
                    contract_id:  row.get(5)?,
                  },
                  row.get(6)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(raw, contractor_id)| {
        Ok(PayableJob { job: raw.into_job()?, contractor_id })
      })
      .transpose()
  }

  async fn unpaid_total_for_client(&self, client_id: i64) -> Result<Money> {
    let total: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(j.price), 0)
           FROM jobs j
           JOIN contracts c ON c.contract_id = j.contract_id
           WHERE c.client_id = ?1 AND c.status = 'in_progress' AND j.paid = 0",
          rusqlite::params![client_id],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(Money::from_minor(total))
  }

  async fn settle(
    &self,
    job_id: i64,
    client_id: i64,
    contractor_id: i64,
    price: Money,
  ) -> Result<SettleOutcome> {
    let price_minor = price.minor();
    let paid_at     = Utc::now();
    let paid_at_str = encode_dt(paid_at);

    let tx_result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Dropping `tx` without committing rolls back, so every early
        // return below undoes the preceding steps.
        let marked = tx.execute(
          "UPDATE jobs SET paid = 1, payment_date = ?2
           WHERE job_id = ?1 AND paid = 0",
          rusqlite::params![job_id, paid_at_str],
        )?;
        if marked == 0 {
          return Ok(SettleTx::AlreadyPaid);
        }

        let debited = tx.execute(
          "UPDATE profiles SET balance = balance - ?2
           WHERE profile_id = ?1 AND balance >= ?2",
          rusqlite::params![client_id, price_minor],
        )?;
        if debited == 0 {
          let balance: Option<i64> = tx
            .query_row(
              "SELECT balance FROM profiles WHERE profile_id = ?1",
              rusqlite::params![client_id],
              |row| row.get(0),
            )
            .optional()?;
          return Ok(SettleTx::ClientShort { balance });
        }

        let credited = tx.execute(
          "UPDATE profiles SET balance = balance + ?2 WHERE profile_id = ?1",
          rusqlite::params![contractor_id, price_minor],
        )?;
        if credited == 0 {
          return Ok(SettleTx::NoContractor);
        }

        tx.commit()?;
        Ok(SettleTx::Settled)
      })
      .await?;

    match tx_result {
      SettleTx::Settled => Ok(SettleOutcome::Settled { paid_at }),
      SettleTx::AlreadyPaid => Ok(SettleOutcome::AlreadyPaid),
      SettleTx::ClientShort { balance: Some(b) } => {
        Ok(SettleOutcome::InsufficientFunds { balance: Money::from_minor(b) })
      }
      SettleTx::ClientShort { balance: None } => {
        Err(Error::ProfileNotFound(client_id))
      }
      SettleTx::NoContractor => Err(Error::ProfileNotFound(contractor_id)),
    }
  }
}

// ─── Reporting impl ──────────────────────────────────────────────────────────

impl Reporting for SqliteStore {
  async fn best_profession(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Option<ProfessionTotal>> {
    let (lo, hi) = encode_date_range(start, end);

    let row: Option<(String, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT p.profession, SUM(j.price) AS earned
               FROM jobs j
               JOIN contracts c ON c.contract_id = j.contract_id
               JOIN profiles p  ON p.profile_id  = c.contractor_id
               WHERE j.paid = 1 AND j.payment_date >= ?1 AND j.payment_date < ?2
               GROUP BY p.profession
               ORDER BY earned DESC
               LIMIT 1",
              rusqlite::params![lo, hi],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(row.map(|(profession, earned)| ProfessionTotal {
      profession,
      earned: Money::from_minor(earned),
    }))
  }

  async fn best_clients(
    &self,
    start: NaiveDate,
    end: NaiveDate,
    limit: u32,
  ) -> Result<Vec<ClientTotal>> {
    let (lo, hi) = encode_date_range(start, end);
    let limit = i64::from(limit);

    let rows: Vec<(i64, String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.profile_id,
                  p.first_name || ' ' || p.last_name AS full_name,
                  SUM(j.price) AS total_paid
           FROM jobs j
           JOIN contracts c ON c.contract_id = j.contract_id
           JOIN profiles p  ON p.profile_id  = c.client_id
           WHERE j.paid = 1 AND j.payment_date >= ?1 AND j.payment_date < ?2
           GROUP BY p.profile_id
           ORDER BY total_paid DESC
           LIMIT ?3",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![lo, hi, limit], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(profile_id, full_name, paid)| ClientTotal {
          profile_id,
          full_name,
          paid: Money::from_minor(paid),
        })
        .collect(),
    )
  }
}
