//! Exact two-decimal monetary values.
//!
//! [`Money`] wraps [`rust_decimal::Decimal`] and enforces the rules all
//! balances and prices obey: non-negative, at most two decimal places,
//! and inside the schema's `DECIMAL(12,2)` range. The storage layer
//! persists money as integer minor units (cents); [`Money::minor`] and
//! [`Money::from_minor`] are the boundary conversions.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Upper bound of the `DECIMAL(12,2)` range, in whole cents.
const MAX_MINOR: i64 = 999_999_999_999;

/// A non-negative monetary value, canonically at scale two.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
  pub const ZERO: Self = Self(dec!(0.00));

  /// Validates and canonicalises a decimal as money.
  ///
  /// Rejects negative values, values with more than two decimal places
  /// (after stripping trailing zeros), and values past the
  /// `DECIMAL(12,2)` range.
  pub fn new(value: Decimal) -> Result<Self, Error> {
    if value < Decimal::ZERO {
      return Err(Error::InvalidArgument(format!(
        "amount {value} must not be negative"
      )));
    }
    let mut v = value.normalize();
    if v.scale() > 2 {
      return Err(Error::InvalidArgument(format!(
        "amount {value} has more than two decimal places"
      )));
    }
    if v > dec!(9_999_999_999.99) {
      return Err(Error::InvalidArgument(format!(
        "amount {value} is out of range"
      )));
    }
    v.rescale(2);
    Ok(Self(v))
  }

  /// Builds money from whole cents. Total for any `i64` cent count the
  /// storage layer can hold.
  pub fn from_minor(minor: i64) -> Self { Self(Decimal::new(minor, 2)) }

  /// The value in whole cents.
  pub fn minor(self) -> i64 {
    // The mantissa at scale two is the cent count, and every
    // constructor keeps it within `i64`.
    i64::try_from(self.0.mantissa()).unwrap_or(MAX_MINOR)
  }

  /// Rounds a non-negative decimal down to the cent.
  pub(crate) fn floor_cent(value: Decimal) -> Self {
    let mut v = value.trunc_with_scale(2);
    v.rescale(2);
    Self(v)
  }

  pub fn as_decimal(self) -> Decimal { self.0 }

  pub fn is_zero(self) -> bool { self.0.is_zero() }
}

impl Default for Money {
  fn default() -> Self { Self::ZERO }
}

impl TryFrom<Decimal> for Money {
  type Error = Error;

  fn try_from(value: Decimal) -> Result<Self, Error> { Self::new(value) }
}

impl From<Money> for Decimal {
  fn from(money: Money) -> Decimal { money.0 }
}

impl fmt::Display for Money {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}
