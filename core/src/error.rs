// bazaar/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::model::ResourceKind;

/// Business-rule breaches. These are client mistakes about lifecycle state or
/// field values, never storage defects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomainViolation {
  #[error("User already has an open cart for this store")]
  CartAlreadyOpen,

  #[error("Cart is not open")]
  CartNotOpen,

  #[error("Quantity must be greater than 0")]
  NonPositiveQuantity,

  #[error("Discount must be between 0 and 100")]
  DiscountOutOfRange,

  #[error("Price must not be negative")]
  NegativePrice,

  #[error("Delivery days must not be negative")]
  NegativeDeliveryDays,

  #[error("{0} is still referenced and cannot be deleted")]
  StillReferenced(ResourceKind),
}

#[derive(Debug, Error)]
pub enum BazaarError {
  #[error("{kind} not found: {id}")]
  NotFound { kind: ResourceKind, id: String },

  #[error("Access to {kind} {id} is forbidden")]
  Forbidden { kind: ResourceKind, id: String },

  #[error("Authentication required")]
  Unauthorized,

  #[error(transparent)]
  DomainState(#[from] DomainViolation),

  /// A lookup by a unique filter matched several rows. Signals a storage-layer defect.
  #[error("More than one {kind} found, expected only one (matched {matches})")]
  InvariantViolation { kind: ResourceKind, matches: usize },

  #[error("Storage backend failure. Source: {source}")]
  Storage {
    #[source]
    source: AnyhowError,
  },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Configuration error for '{step_name}': {message}")]
  Configuration { step_name: String, message: String },

  #[error("Internal bazaar error: {0}")]
  Internal(String),
}

impl BazaarError {
  pub fn not_found(kind: ResourceKind, id: impl ToString) -> Self {
    BazaarError::NotFound {
      kind,
      id: id.to_string(),
    }
  }

  pub fn forbidden(kind: ResourceKind, id: impl ToString) -> Self {
    BazaarError::Forbidden {
      kind,
      id: id.to_string(),
    }
  }

  /// Whether the failure is the caller's fault (maps to a 4xx status).
  pub fn is_client_error(&self) -> bool {
    matches!(
      self,
      BazaarError::NotFound { .. }
        | BazaarError::Forbidden { .. }
        | BazaarError::Unauthorized
        | BazaarError::DomainState(_)
    )
  }
}

// Backends report their own failures through anyhow. An anyhow error that
// already carries a BazaarError is unwrapped instead of being nested.
impl From<AnyhowError> for BazaarError {
  fn from(err: AnyhowError) -> Self {
    match err.downcast::<BazaarError>() {
      Ok(bazaar_err) => bazaar_err,
      Err(source) => BazaarError::Storage { source },
    }
  }
}

pub type BazaarResult<T, E = BazaarError> = std::result::Result<T, E>;
