//! The error taxonomy shared by every layer of the workspace.

use thiserror::Error;

use crate::money::Money;

/// A business-rule or infrastructure failure.
///
/// Business failures are detected without mutating anything. `Internal`
/// is the only variant a failed store call produces, and always means
/// no partial write survived.
#[derive(Debug, Error)]
pub enum Error {
  /// The resource is absent or not visible to the requesting profile.
  /// The two cases are deliberately indistinguishable to the caller.
  #[error("{0} not found")]
  NotFound(&'static str),

  /// The requester is known but not allowed to perform this operation.
  #[error("{0}")]
  Forbidden(String),

  /// The request is malformed: missing, non-positive, or unrepresentable
  /// values.
  #[error("{0}")]
  InvalidArgument(String),

  /// A payment was attempted with a balance below the job's price.
  #[error("insufficient funds: balance {balance} does not cover price {price}")]
  InsufficientFunds { balance: Money, price: Money },

  /// A well-formed request that a business rule rejects, e.g. a deposit
  /// past the allowed limit.
  #[error("{0}")]
  PolicyViolation(String),

  /// The storage backend failed.
  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
