//! Core domain types, store traits, and the billing engine for Tally.
//!
//! | Module     | Description                                          |
//! |------------|------------------------------------------------------|
//! | `billing`  | Payment engine, deposit policy, and query helpers.   |
//! | `contract` | Contract type and its lifecycle status.              |
//! | `error`    | The error taxonomy shared by every layer.            |
//! | `job`      | Job type and the payable-job read model.             |
//! | `money`    | Exact two-decimal monetary values.                   |
//! | `profile`  | Profile type and the client/contractor role.         |
//! | `report`   | Read models for the admin aggregation queries.       |
//! | `store`    | Traits a storage backend implements.                 |
//!
//! This crate has no HTTP or database dependencies. Backends implement
//! the [`store`] traits; [`billing::Billing`] holds the business rules
//! and is generic over any such backend.

pub mod billing;
pub mod contract;
pub mod error;
pub mod job;
pub mod money;
pub mod profile;
pub mod report;
pub mod store;

pub use error::{Error, Result};
