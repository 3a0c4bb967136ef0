// bazaar/src/access/resolver.rs

//! Builds the access pipeline for one resource kind.

use super::policy::{self, AccessRule, Decision};
use super::{AccessContext, AccessRequest};
use crate::core::control::PipelineControl;
use crate::core::step::SkipCondition;
use crate::error::{BazaarError, BazaarResult};
use crate::model::{Cart, Entity, OwnerRef, Resource, ResourceKind, Store};
use crate::pipeline::Pipeline;
use crate::repository::{Repositories, Stored};
use std::sync::Arc;
use tracing::{event, Level};
use uuid::Uuid;

pub const AUTHENTICATE: &str = "authenticate";
pub const RESOLVE: &str = "resolve";
pub const RESOLVE_NESTED: &str = "resolve_nested";
pub const AUTHORIZE: &str = "authorize";

pub type AccessPipeline = Pipeline<AccessContext, BazaarError>;

/// Facts gathered while following an `OwnerRef` to a user.
struct Ownership {
  user_id: Uuid,
  store: Option<Store>,
  cart: Option<Cart>,
}

fn skip_unless_identity_required() -> SkipCondition<AccessContext> {
  Arc::new(|ctx: &AccessContext| !ctx.request.marker.requires_identity)
}

fn skip_without_target() -> SkipCondition<AccessContext> {
  Arc::new(|ctx: &AccessContext| ctx.request.target_id().is_none())
}

fn skip_without_nested_target() -> SkipCondition<AccessContext> {
  Arc::new(|ctx: &AccessContext| ctx.resource.is_none() || ctx.request.nested_id.is_none())
}

/// The `authenticate -> resolve -> authorize` pipeline for entity type `E`.
pub fn access_pipeline<E: Stored>(repos: &Repositories) -> AccessPipeline {
  let mut pipeline = Pipeline::new(&[
    (AUTHENTICATE, false, Some(skip_unless_identity_required())),
    (RESOLVE, false, Some(skip_without_target())),
    (AUTHORIZE, false, None),
  ]);

  pipeline.on_root(AUTHENTICATE, |ctx: AccessContext| async move { authenticate(ctx) });

  let resolve_repos = repos.clone();
  pipeline.on_root(RESOLVE, move |ctx: AccessContext| {
    let repos = resolve_repos.clone();
    async move { resolve::<E>(&repos, ctx).await }
  });

  pipeline.on_root(AUTHORIZE, |ctx: AccessContext| async move { authorize(E::KIND, ctx) });

  pipeline
}

/// Adds a `resolve_nested` step that loads an `N` bound to the resolved parent.
pub fn bind_nested<N: Stored>(pipeline: &mut AccessPipeline, repos: &Repositories) {
  pipeline.insert_after_step(RESOLVE, RESOLVE_NESTED, false, Some(skip_without_nested_target()));

  let nested_repos = repos.clone();
  pipeline.on_root(RESOLVE_NESTED, move |ctx: AccessContext| {
    let repos = nested_repos.clone();
    async move { resolve_nested::<N>(&repos, ctx).await }
  });
}

fn authenticate(ctx: AccessContext) -> BazaarResult<PipelineControl<AccessContext>> {
  if ctx.request.identity.is_none() {
    event!(Level::DEBUG, method = %ctx.request.method, "Anonymous caller on a route requiring identity.");
    return Err(BazaarError::Unauthorized);
  }
  Ok(PipelineControl::Continue(ctx))
}

/// Loads an `E` by its raw path id. An id that is not a UUID cannot name
/// anything, so it is `NotFound` like any other unknown id.
async fn load<E: Stored>(repos: &Repositories, raw_id: &str) -> BazaarResult<E> {
  let id = Uuid::parse_str(raw_id).map_err(|_| BazaarError::not_found(E::KIND, raw_id))?;
  repos.of::<E>().get_by_id(id).await
}

async fn settle_owner(repos: &Repositories, owner_ref: OwnerRef) -> BazaarResult<Ownership> {
  match owner_ref {
    OwnerRef::User(user_id) => Ok(Ownership {
      user_id,
      store: None,
      cart: None,
    }),
    OwnerRef::Store(store_id) => {
      let store = repos.stores.get_by_id(store_id).await?;
      Ok(Ownership {
        user_id: store.owner_user_id,
        store: Some(store),
        cart: None,
      })
    }
    OwnerRef::Cart(cart_id) => {
      let cart = repos.carts.get_by_id(cart_id).await?;
      Ok(Ownership {
        user_id: cart.user_id,
        store: None,
        cart: Some(cart),
      })
    }
  }
}

async fn resolve<E: Stored>(repos: &Repositories, mut ctx: AccessContext) -> BazaarResult<PipelineControl<AccessContext>> {
  let Some(raw_id) = ctx.request.target_id().map(str::to_owned) else {
    return Ok(PipelineControl::Continue(ctx));
  };

  let entity = load::<E>(repos, &raw_id).await?;
  let ownership = settle_owner(repos, entity.owner_ref()).await?;

  ctx.is_owner = ctx.request.identity.as_ref().map(|caller| caller.id == ownership.user_id);
  ctx.store = ownership.store;
  ctx.cart = ownership.cart;
  ctx.resource = Some(entity.into_resource());

  event!(Level::DEBUG, kind = %E::KIND, id = %raw_id, is_owner = ?ctx.is_owner, "Resource resolved.");
  Ok(PipelineControl::Continue(ctx))
}

fn refers_to(owner_ref: OwnerRef, parent_kind: ResourceKind, parent_id: Uuid) -> bool {
  match owner_ref {
    OwnerRef::User(id) => parent_kind == ResourceKind::User && id == parent_id,
    OwnerRef::Store(id) => parent_kind == ResourceKind::Store && id == parent_id,
    OwnerRef::Cart(id) => parent_kind == ResourceKind::Cart && id == parent_id,
  }
}

async fn resolve_nested<N: Stored>(
  repos: &Repositories,
  mut ctx: AccessContext,
) -> BazaarResult<PipelineControl<AccessContext>> {
  let Some(raw_id) = ctx.request.nested_id.clone() else {
    return Ok(PipelineControl::Continue(ctx));
  };
  let Some((parent_kind, parent_id)) = ctx.resource.as_ref().map(|p| (p.kind(), p.id())) else {
    return Ok(PipelineControl::Continue(ctx));
  };

  let nested = load::<N>(repos, &raw_id).await?;
  if !refers_to(nested.owner_ref(), parent_kind, parent_id) {
    event!(
      Level::DEBUG,
      kind = %N::KIND,
      id = %raw_id,
      parent_kind = %parent_kind,
      parent_id = %parent_id,
      "Nested resource belongs to a different parent."
    );
    return Err(BazaarError::not_found(N::KIND, raw_id));
  }

  ctx.nested = Some(nested.into_resource());
  Ok(PipelineControl::Continue(ctx))
}

fn authorize(kind: ResourceKind, mut ctx: AccessContext) -> BazaarResult<PipelineControl<AccessContext>> {
  let resolved_id = ctx.resource.as_ref().map(Resource::id);
  let request: &AccessRequest = &ctx.request;
  let decision = policy::evaluate(
    request.method,
    AccessRule::for_kind(kind),
    request.marker,
    resolved_id.is_some(),
    ctx.is_owner,
  );

  match (decision, resolved_id) {
    (Decision::Deny, Some(id)) => {
      event!(
        Level::WARN,
        kind = %kind,
        id = %id,
        method = %request.method,
        caller = ?request.identity.as_ref().map(|i| i.id),
        "Access denied."
      );
      Err(BazaarError::forbidden(kind, id))
    }
    _ => {
      ctx.authorized = true;
      Ok(PipelineControl::Continue(ctx))
    }
  }
}
