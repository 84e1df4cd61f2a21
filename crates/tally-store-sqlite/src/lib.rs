//! SQLite backend for the Tally billing store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Because every call is serialised onto
//! that thread, each store method is a critical section; the settlement
//! additionally runs inside a SQL transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
