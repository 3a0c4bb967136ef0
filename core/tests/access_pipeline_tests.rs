// tests/access_pipeline_tests.rs
mod common;

use bazaar::access::resolver::{access_pipeline, AUTHORIZE};
use bazaar::model::{Cart, CartLine, Category, Coupon, CouponDraft, Notification, Order, ResourceKind, Store};
use bazaar::{AccessRequest, BazaarError, Gatekeeper, Method, PipelineControl, Repository, RouteMarker};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_read_on_owned_resource_is_open_to_anyone() {
  setup_tracing();
  let market = Market::new().await;

  for caller in [None, Some(market.stranger.clone()), Some(market.owner.clone())] {
    let ctx = market
      .gatekeeper
      .check(
        ResourceKind::Category,
        AccessRequest::new(Method::Get).by(caller.clone()).on(market.category.id.to_string()),
      )
      .await
      .unwrap();
    assert_eq!(ctx.require::<Category>().unwrap().id, market.category.id);
    assert_eq!(ctx.store.as_ref().map(|s| s.id), Some(market.store.id));
    assert_eq!(ctx.is_owner, caller.map(|c| c.id == market.owner.id));
  }
}

#[tokio::test]
#[serial]
async fn test_mutation_requires_store_owner() {
  setup_tracing();
  let market = Market::new().await;
  let request = |caller| {
    AccessRequest::new(Method::Put)
      .by(caller)
      .on(market.product.id.to_string())
      .marked(RouteMarker::authenticated())
  };

  let ctx = market
    .gatekeeper
    .check(ResourceKind::Product, request(Some(market.owner.clone())))
    .await
    .unwrap();
  assert!(ctx.is_owner());

  let err = market
    .gatekeeper
    .check(ResourceKind::Product, request(Some(market.stranger.clone())))
    .await
    .unwrap_err();
  assert!(matches!(err, BazaarError::Forbidden { kind: ResourceKind::Product, .. }));
}

#[tokio::test]
#[serial]
async fn test_anonymous_mutation_is_denied_or_unauthorized() {
  setup_tracing();
  let market = Market::new().await;

  // Public marker: ownership undetermined, treated as not owning.
  let err = market
    .gatekeeper
    .check(
      ResourceKind::Store,
      AccessRequest::new(Method::Delete).on(market.store.id.to_string()),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, BazaarError::Forbidden { .. }));

  // Authenticated marker: rejected before anything is loaded.
  let err = market
    .gatekeeper
    .check(
      ResourceKind::Store,
      AccessRequest::new(Method::Delete)
        .on(uuid::Uuid::new_v4().to_string())
        .marked(RouteMarker::authenticated()),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, BazaarError::Unauthorized));
}

#[tokio::test]
#[serial]
async fn test_unknown_or_malformed_id_is_not_found() {
  setup_tracing();
  let market = Market::new().await;

  for raw in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
    let err = market
      .gatekeeper
      .check(ResourceKind::Coupon, AccessRequest::new(Method::Get).on(raw.clone()))
      .await
      .unwrap_err();
    match err {
      BazaarError::NotFound { kind, id } => {
        assert_eq!(kind, ResourceKind::Coupon);
        assert_eq!(id, raw);
      }
      other => panic!("Expected NotFound, got {:?}", other),
    }
  }
}

#[tokio::test]
#[serial]
async fn test_list_and_me_routes_skip_resolution() {
  setup_tracing();
  let market = Market::new().await;

  let ctx = market
    .gatekeeper
    .check(
      ResourceKind::Coupon,
      AccessRequest::new(Method::Post).by(Some(market.stranger.clone())),
    )
    .await
    .unwrap();
  assert!(ctx.resource.is_none());
  assert_eq!(ctx.is_owner, None);

  let ctx = market
    .gatekeeper
    .check(
      ResourceKind::Cart,
      AccessRequest::new(Method::Get)
        .by(Some(market.buyer.clone()))
        .on("me")
        .marked(RouteMarker::authenticated()),
    )
    .await
    .unwrap();
  assert!(ctx.resource.is_none());
}

#[tokio::test]
#[serial]
async fn test_cart_is_owned_by_its_buyer() {
  setup_tracing();
  let market = Market::new().await;
  let cart = market.carts.create(market.buyer.id, market.store.id).await.unwrap();

  let mutate = |caller| {
    AccessRequest::new(Method::Post)
      .by(caller)
      .on(cart.id.to_string())
      .marked(RouteMarker::authenticated())
  };

  let ctx = market
    .gatekeeper
    .check(ResourceKind::Cart, mutate(Some(market.buyer.clone())))
    .await
    .unwrap();
  assert_eq!(ctx.require::<Cart>().unwrap().id, cart.id);

  // The store owner does not own other people's carts.
  let err = market
    .gatekeeper
    .check(ResourceKind::Cart, mutate(Some(market.owner.clone())))
    .await
    .unwrap_err();
  assert!(matches!(err, BazaarError::Forbidden { kind: ResourceKind::Cart, .. }));
}

#[tokio::test]
#[serial]
async fn test_nested_line_must_belong_to_the_cart() {
  setup_tracing();
  let market = Market::new().await;
  let cart = market.carts.create(market.buyer.id, market.store.id).await.unwrap();
  let line = market.carts.add_line(&cart, market.product.id, 1).await.unwrap();

  let other_cart = market.carts.create(market.stranger.id, market.store.id).await.unwrap();
  let foreign_line = market.carts.add_line(&other_cart, market.product.id, 1).await.unwrap();

  let request = |line_id: uuid::Uuid| {
    AccessRequest::new(Method::Put)
      .by(Some(market.buyer.clone()))
      .on(cart.id.to_string())
      .nested(line_id.to_string())
      .marked(RouteMarker::authenticated())
  };

  let ctx = market.gatekeeper.check(ResourceKind::Cart, request(line.id)).await.unwrap();
  assert_eq!(ctx.require_nested::<CartLine>().unwrap().id, line.id);

  let err = market
    .gatekeeper
    .check(ResourceKind::Cart, request(foreign_line.id))
    .await
    .unwrap_err();
  assert!(matches!(err, BazaarError::NotFound { kind: ResourceKind::CartLine, .. }));
}

#[tokio::test]
#[serial]
async fn test_cart_line_resolves_its_cart() {
  setup_tracing();
  let market = Market::new().await;
  let cart = market.carts.create(market.buyer.id, market.store.id).await.unwrap();
  let line = market.carts.add_line(&cart, market.product.id, 3).await.unwrap();

  let ctx = market
    .gatekeeper
    .check(
      ResourceKind::CartLine,
      AccessRequest::new(Method::Delete)
        .by(Some(market.buyer.clone()))
        .on(line.id.to_string()),
    )
    .await
    .unwrap();
  assert_eq!(ctx.cart.as_ref().map(|c| c.id), Some(cart.id));
  assert!(ctx.is_owner());
}

#[tokio::test]
#[serial]
async fn test_order_and_notification_follow_route_marker() {
  setup_tracing();
  let market = Market::new().await;
  let cart = market.carts.create(market.buyer.id, market.store.id).await.unwrap();
  let order = market.orders.create_from_cart(cart.id).await.unwrap();
  let note = market
    .repos
    .notifications
    .create(Notification::new(market.buyer.id, "Hi", "Welcome", serde_json::json!({})))
    .await
    .unwrap();

  // Without the strict marker, any authenticated caller may act.
  let ctx = market
    .gatekeeper
    .check(
      ResourceKind::Order,
      AccessRequest::new(Method::Get)
        .by(Some(market.stranger.clone()))
        .on(order.id.to_string())
        .marked(RouteMarker::authenticated()),
    )
    .await
    .unwrap();
  assert_eq!(ctx.require::<Order>().unwrap().cart_id, cart.id);
  assert_eq!(ctx.is_owner, Some(false));

  // With it, only the holder.
  for (kind, id) in [(ResourceKind::Order, order.id), (ResourceKind::Notification, note.id)] {
    let strict = |caller| {
      AccessRequest::new(Method::Get)
        .by(Some(caller))
        .on(id.to_string())
        .marked(RouteMarker::owner_only())
    };
    market.gatekeeper.check(kind, strict(market.buyer.clone())).await.unwrap();
    let err = market.gatekeeper.check(kind, strict(market.stranger.clone())).await.unwrap_err();
    assert!(matches!(err, BazaarError::Forbidden { .. }), "{kind} should be owner-only");
  }
}

#[tokio::test]
#[serial]
async fn test_unregistered_kind_is_a_configuration_error() {
  setup_tracing();
  let gatekeeper = Gatekeeper::new();
  assert!(!gatekeeper.is_registered(ResourceKind::Store));

  let err = gatekeeper
    .check(ResourceKind::Store, AccessRequest::new(Method::Get))
    .await
    .unwrap_err();
  assert!(matches!(err, BazaarError::Configuration { .. }));
}

#[tokio::test]
#[serial]
async fn test_custom_pipeline_can_extend_authorization() {
  setup_tracing();
  let market = Market::new().await;
  let coupon = market
    .catalog
    .create::<Coupon>(
      market.store.id,
      CouponDraft {
        code: "SPRING".to_string(),
        discount: 10,
      },
    )
    .await
    .unwrap();

  // Owners may not read their own coupons on this route.
  let mut pipeline = access_pipeline::<Coupon>(&market.repos);
  pipeline.after_root(AUTHORIZE, |ctx: bazaar::AccessContext| async move {
    if ctx.is_owner() {
      return Err(BazaarError::forbidden(ResourceKind::Coupon, "self-read"));
    }
    Ok(PipelineControl::Continue(ctx))
  });
  let mut gatekeeper = Gatekeeper::new();
  gatekeeper.register(ResourceKind::Coupon, pipeline);

  let read = |caller| AccessRequest::new(Method::Get).by(Some(caller)).on(coupon.id.to_string());
  gatekeeper.check(ResourceKind::Coupon, read(market.stranger.clone())).await.unwrap();
  let err = gatekeeper.check(ResourceKind::Coupon, read(market.owner.clone())).await.unwrap_err();
  assert!(matches!(err, BazaarError::Forbidden { .. }));

  let store_ctx = market
    .gatekeeper
    .check(ResourceKind::Store, AccessRequest::new(Method::Get).on(market.store.id.to_string()))
    .await
    .unwrap();
  assert_eq!(store_ctx.require::<Store>().unwrap().owner_user_id, market.owner.id);
}

#[tokio::test]
#[serial]
async fn test_stopping_before_authorize_is_refused() {
  setup_tracing();
  let market = Market::new().await;
  let delete_as = |caller| {
    AccessRequest::new(Method::Delete)
      .by(Some(caller))
      .on(market.category.id.to_string())
      .marked(RouteMarker::authenticated())
  };

  let mut early = access_pipeline::<Category>(&market.repos);
  early.before_root(AUTHORIZE, |ctx: bazaar::AccessContext| async move {
    Ok::<_, BazaarError>(PipelineControl::Stop(ctx))
  });
  let mut gatekeeper = Gatekeeper::new();
  gatekeeper.register(ResourceKind::Category, early);
  let err = gatekeeper
    .check(ResourceKind::Category, delete_as(market.stranger.clone()))
    .await
    .unwrap_err();
  assert!(matches!(err, BazaarError::Configuration { .. }));

  // Stopping once authorization has passed keeps the decision.
  let mut late = access_pipeline::<Category>(&market.repos);
  late.after_root(AUTHORIZE, |ctx: bazaar::AccessContext| async move {
    Ok::<_, BazaarError>(PipelineControl::Stop(ctx))
  });
  gatekeeper.register(ResourceKind::Category, late);
  let ctx = gatekeeper
    .check(ResourceKind::Category, delete_as(market.owner.clone()))
    .await
    .unwrap();
  assert!(ctx.authorized);
  let err = gatekeeper
    .check(ResourceKind::Category, delete_as(market.stranger.clone()))
    .await
    .unwrap_err();
  assert!(matches!(err, BazaarError::Forbidden { .. }));
}
