// bazaar/src/access/context.rs

use super::{AccessRequest, Identity};
use crate::error::{BazaarError, BazaarResult};
use crate::model::{Cart, Entity, Resource, Store};

/// Typed per-request facts, threaded by value through the access pipeline.
#[derive(Debug, Clone)]
pub struct AccessContext {
  pub request: AccessRequest,
  /// The entity named by the path id.
  pub resource: Option<Resource>,
  /// The entity named by the nested path id, bound to `resource`.
  pub nested: Option<Resource>,
  /// Owning store, when ownership runs through a store.
  pub store: Option<Store>,
  /// Anchoring cart, when ownership runs through a cart.
  pub cart: Option<Cart>,
  /// `None` when nothing was resolved or the caller is anonymous.
  pub is_owner: Option<bool>,
  /// Set once the authorize step has let the request through.
  pub authorized: bool,
}

impl AccessContext {
  pub fn new(request: AccessRequest) -> Self {
    Self {
      request,
      resource: None,
      nested: None,
      store: None,
      cart: None,
      is_owner: None,
      authorized: false,
    }
  }

  pub fn identity(&self) -> Option<&Identity> {
    self.request.identity.as_ref()
  }

  pub fn require_identity(&self) -> BazaarResult<&Identity> {
    self.identity().ok_or(BazaarError::Unauthorized)
  }

  pub fn is_owner(&self) -> bool {
    self.is_owner.unwrap_or(false)
  }

  pub fn entity<E: Entity>(&self) -> Option<&E> {
    self.resource.as_ref().and_then(E::from_resource)
  }

  pub fn nested_entity<E: Entity>(&self) -> Option<&E> {
    self.nested.as_ref().and_then(E::from_resource)
  }

  /// The resolved entity as `E`. Asking for one the pipeline did not resolve
  /// is a wiring mistake in the caller.
  pub fn require<E: Entity>(&self) -> BazaarResult<&E> {
    self
      .entity::<E>()
      .ok_or_else(|| BazaarError::Internal(format!("no {} resolved for this request", E::KIND)))
  }

  pub fn require_nested<E: Entity>(&self) -> BazaarResult<&E> {
    self
      .nested_entity::<E>()
      .ok_or_else(|| BazaarError::Internal(format!("no nested {} resolved for this request", E::KIND)))
  }
}
