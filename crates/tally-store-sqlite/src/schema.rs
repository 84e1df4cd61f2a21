//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.
//!
//! Money columns hold integer minor units (cents) so balance comparisons
//! and price sums stay exact inside SQL.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS profiles (
    profile_id  INTEGER PRIMARY KEY,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    profession  TEXT NOT NULL,
    balance     INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0),
    role        TEXT NOT NULL    -- 'client' | 'contractor'
);

CREATE TABLE IF NOT EXISTS contracts (
    contract_id   INTEGER PRIMARY KEY,
    terms         TEXT NOT NULL,
    status        TEXT NOT NULL,  -- 'new' | 'in_progress' | 'terminated'
    client_id     INTEGER NOT NULL REFERENCES profiles(profile_id),
    contractor_id INTEGER NOT NULL REFERENCES profiles(profile_id),
    CHECK (client_id != contractor_id)
);

-- Jobs are mutated only by the settlement transaction, which sets paid
-- and stamps payment_date together. Prices never change.
CREATE TABLE IF NOT EXISTS jobs (
    job_id       INTEGER PRIMARY KEY,
    description  TEXT NOT NULL,
    price        INTEGER NOT NULL CHECK (price > 0),
    paid         INTEGER NOT NULL DEFAULT 0,
    payment_date TEXT,            -- RFC 3339 UTC; set only on payment
    contract_id  INTEGER NOT NULL REFERENCES contracts(contract_id)
);

CREATE INDEX IF NOT EXISTS contracts_client_idx     ON contracts(client_id);
CREATE INDEX IF NOT EXISTS contracts_contractor_idx ON contracts(contractor_id);
CREATE INDEX IF NOT EXISTS jobs_contract_idx        ON jobs(contract_id);
CREATE INDEX IF NOT EXISTS jobs_paid_idx            ON jobs(paid, payment_date);

PRAGMA user_version = 1;
";
