// bazaar/src/access/policy.rs

//! The allow/deny decision. Pure: the outcome depends only on the arguments.

use super::{Method, RouteMarker};
use crate::model::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Allow,
  Deny,
}

/// Default rule of a resource kind, applied unless the route marker is stricter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
  /// Anyone may read; only the owner may mutate.
  OwnerForMutations,
  /// Any caller may act; ownership is enforced only by `RouteMarker::requires_owner`.
  MarkedRoutesOnly,
}

impl AccessRule {
  pub fn for_kind(kind: ResourceKind) -> Self {
    match kind {
      ResourceKind::Order | ResourceKind::Notification => AccessRule::MarkedRoutesOnly,
      _ => AccessRule::OwnerForMutations,
    }
  }
}

/// Decides whether a request may proceed.
///
/// `resolved` is whether the pipeline attached an entity. Undetermined
/// ownership (`None`) counts as not owning.
pub fn evaluate(method: Method, rule: AccessRule, marker: RouteMarker, resolved: bool, is_owner: Option<bool>) -> Decision {
  if !resolved {
    return Decision::Allow;
  }
  let owner = is_owner.unwrap_or(false);
  let allowed = if marker.requires_owner {
    owner
  } else {
    match rule {
      AccessRule::OwnerForMutations => method.is_safe() || owner,
      AccessRule::MarkedRoutesOnly => true,
    }
  };
  if allowed {
    Decision::Allow
  } else {
    Decision::Deny
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MUTATING: [Method; 4] = [Method::Post, Method::Put, Method::Patch, Method::Delete];
  const SAFE: [Method; 3] = [Method::Get, Method::Head, Method::Options];

  #[test]
  fn nothing_resolved_is_allowed() {
    for method in MUTATING {
      assert_eq!(
        evaluate(method, AccessRule::OwnerForMutations, RouteMarker::owner_only(), false, None),
        Decision::Allow
      );
    }
  }

  #[test]
  fn reads_are_open_without_a_marker() {
    for method in SAFE {
      for is_owner in [None, Some(false), Some(true)] {
        assert_eq!(
          evaluate(method, AccessRule::OwnerForMutations, RouteMarker::public(), true, is_owner),
          Decision::Allow
        );
      }
    }
  }

  #[test]
  fn mutations_require_the_owner() {
    for method in MUTATING {
      let rule = AccessRule::OwnerForMutations;
      assert_eq!(evaluate(method, rule, RouteMarker::authenticated(), true, Some(true)), Decision::Allow);
      assert_eq!(evaluate(method, rule, RouteMarker::authenticated(), true, Some(false)), Decision::Deny);
      assert_eq!(evaluate(method, rule, RouteMarker::public(), true, None), Decision::Deny);
    }
  }

  #[test]
  fn marked_routes_only_defers_to_the_marker() {
    let rule = AccessRule::MarkedRoutesOnly;
    assert_eq!(evaluate(Method::Put, rule, RouteMarker::authenticated(), true, Some(false)), Decision::Allow);
    assert_eq!(evaluate(Method::Get, rule, RouteMarker::owner_only(), true, Some(false)), Decision::Deny);
    assert_eq!(evaluate(Method::Get, rule, RouteMarker::owner_only(), true, Some(true)), Decision::Allow);
  }

  #[test]
  fn owner_marker_gates_reads_too() {
    assert_eq!(
      evaluate(Method::Get, AccessRule::OwnerForMutations, RouteMarker::owner_only(), true, Some(false)),
      Decision::Deny
    );
  }

  #[test]
  fn rules_per_kind() {
    assert_eq!(AccessRule::for_kind(ResourceKind::Category), AccessRule::OwnerForMutations);
    assert_eq!(AccessRule::for_kind(ResourceKind::Cart), AccessRule::OwnerForMutations);
    assert_eq!(AccessRule::for_kind(ResourceKind::Order), AccessRule::MarkedRoutesOnly);
    assert_eq!(AccessRule::for_kind(ResourceKind::Notification), AccessRule::MarkedRoutesOnly);
  }
}
