// bazaar/src/access/mod.rs

//! Ownership-gated access to marketplace resources.
//!
//! Every resource kind gets one pipeline of the same shape:
//!
//! 1. `authenticate` demands an identity when the route marker asks for one.
//! 2. `resolve` loads the entity named by the path id and works out who owns it.
//! 3. `resolve_nested` (carts only) loads a line of the resolved cart.
//! 4. `authorize` applies [`policy::evaluate`] to the facts gathered so far.
//!
//! The outcome is an [`AccessContext`] the caller hands on to the business
//! operation. See [`crate::registry::Gatekeeper`] for the per-kind registry.

pub mod context;
pub mod policy;
pub mod resolver;

pub use context::AccessContext;
pub use policy::{evaluate, AccessRule, Decision};

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Path id meaning "the caller's own singleton". Resolution is skipped for it.
pub const ME: &str = "me";

/// HTTP method, reduced to what the policy cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Head,
  Options,
  Post,
  Put,
  Patch,
  Delete,
  Other,
}

impl Method {
  /// Read-only methods. Everything else is treated as mutating.
  pub fn is_safe(&self) -> bool {
    matches!(self, Method::Get | Method::Head | Method::Options)
  }
}

impl From<&str> for Method {
  fn from(name: &str) -> Self {
    match name.to_ascii_uppercase().as_str() {
      "GET" => Method::Get,
      "HEAD" => Method::Head,
      "OPTIONS" => Method::Options,
      "POST" => Method::Post,
      "PUT" => Method::Put,
      "PATCH" => Method::Patch,
      "DELETE" => Method::Delete,
      _ => Method::Other,
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Method::Get => "GET",
      Method::Head => "HEAD",
      Method::Options => "OPTIONS",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Patch => "PATCH",
      Method::Delete => "DELETE",
      Method::Other => "OTHER",
    };
    f.write_str(name)
  }
}

/// The authenticated caller. Establishing it (tokens, headers) is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
  pub id: Uuid,
  pub email: String,
}

/// Declarative per-route requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMarker {
  pub requires_identity: bool,
  /// Ownership is required for every method, reads included.
  pub requires_owner: bool,
}

impl RouteMarker {
  pub const fn public() -> Self {
    Self {
      requires_identity: false,
      requires_owner: false,
    }
  }

  pub const fn authenticated() -> Self {
    Self {
      requires_identity: true,
      requires_owner: false,
    }
  }

  pub const fn owner_only() -> Self {
    Self {
      requires_identity: true,
      requires_owner: true,
    }
  }
}

/// Everything the access pipeline knows about an inbound request.
#[derive(Debug, Clone)]
pub struct AccessRequest {
  pub method: Method,
  pub identity: Option<Identity>,
  pub id: Option<String>,
  pub nested_id: Option<String>,
  pub marker: RouteMarker,
}

impl AccessRequest {
  pub fn new(method: Method) -> Self {
    Self {
      method,
      identity: None,
      id: None,
      nested_id: None,
      marker: RouteMarker::public(),
    }
  }

  pub fn by(mut self, identity: Option<Identity>) -> Self {
    self.identity = identity;
    self
  }

  pub fn on(mut self, id: impl Into<String>) -> Self {
    self.id = Some(id.into());
    self
  }

  pub fn nested(mut self, nested_id: impl Into<String>) -> Self {
    self.nested_id = Some(nested_id.into());
    self
  }

  pub fn marked(mut self, marker: RouteMarker) -> Self {
    self.marker = marker;
    self
  }

  /// The id to resolve, or `None` for list/create routes and the `me` sentinel.
  pub fn target_id(&self) -> Option<&str> {
    self.id.as_deref().filter(|id| *id != ME)
  }
}
