// bazaar/src/model/status.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown {kind} status '{value}'")]
pub struct UnknownStatus {
  pub kind: &'static str,
  pub value: String,
}

/// Mutability state of a cart. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
  Open,
  Closed,
}

impl CartStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      CartStatus::Open => "open",
      CartStatus::Closed => "closed",
    }
  }
}

impl fmt::Display for CartStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CartStatus {
  type Err = UnknownStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "open" => Ok(CartStatus::Open),
      "closed" => Ok(CartStatus::Closed),
      other => Err(UnknownStatus {
        kind: "cart",
        value: other.to_string(),
      }),
    }
  }
}

/// Fulfilment state of an order. Orders are created `Pending`; the remaining
/// transitions belong to an external fulfilment process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Shipped,
  Delivered,
  Canceled,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Canceled => "canceled",
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
  }

  /// Whether `next` is a legal successor of `self`.
  pub fn can_advance_to(&self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
      (*self, next),
      (Pending, Confirmed) | (Confirmed, Shipped) | (Shipped, Delivered) | (Pending | Confirmed | Shipped, Canceled)
    )
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = UnknownStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(OrderStatus::Pending),
      "confirmed" => Ok(OrderStatus::Confirmed),
      "shipped" => Ok(OrderStatus::Shipped),
      "delivered" => Ok(OrderStatus::Delivered),
      "canceled" => Ok(OrderStatus::Canceled),
      other => Err(UnknownStatus {
        kind: "order",
        value: other.to_string(),
      }),
    }
  }
}
