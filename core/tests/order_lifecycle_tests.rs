// tests/order_lifecycle_tests.rs
mod common;

use bazaar::model::{CartStatus, OrderStatus};
use bazaar::{BazaarError, DomainViolation};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_order_from_open_cart_is_pending_and_closes_cart() {
  setup_tracing();
  let market = Market::new().await;
  let cart = market.carts.create(market.buyer.id, market.store.id).await.unwrap();

  let order = market.orders.create_from_cart(cart.id).await.unwrap();
  assert_eq!(order.status, OrderStatus::Pending);
  assert_eq!(order.cart_id, cart.id);
  assert_eq!(market.orders.get(order.id).await.unwrap(), order);
  assert_eq!(market.carts.get(cart.id).await.unwrap().status, CartStatus::Closed);
}

#[tokio::test]
#[serial]
async fn test_order_from_closed_cart_is_rejected() {
  setup_tracing();
  let market = Market::new().await;
  let cart = market.carts.create(market.buyer.id, market.store.id).await.unwrap();
  market.orders.create_from_cart(cart.id).await.unwrap();

  let err = market.orders.create_from_cart(cart.id).await.unwrap_err();
  assert!(matches!(err, BazaarError::DomainState(DomainViolation::CartNotOpen)));
}

#[tokio::test]
#[serial]
async fn test_order_from_unknown_cart_is_not_found() {
  setup_tracing();
  let market = Market::new().await;
  let err = market.orders.create_from_cart(uuid::Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, BazaarError::NotFound { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_concurrent_orders_from_one_cart_only_one_wins() {
  setup_tracing();
  let market = Market::new().await;
  let cart = market.carts.create(market.buyer.id, market.store.id).await.unwrap();

  let mut tasks = Vec::new();
  for _ in 0..8 {
    let orders = market.orders.clone();
    let cart_id = cart.id;
    tasks.push(tokio::spawn(async move { orders.create_from_cart(cart_id).await }));
  }

  let mut placed = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(_) => placed += 1,
      Err(BazaarError::DomainState(DomainViolation::CartNotOpen)) => {}
      Err(other) => panic!("unexpected error {:?}", other),
    }
  }
  assert_eq!(placed, 1);
}

#[tokio::test]
#[serial]
async fn test_list_for_holder_returns_only_own_orders() {
  setup_tracing();
  let market = Market::new().await;

  let first = market.carts.create(market.buyer.id, market.store.id).await.unwrap();
  let o1 = market.orders.create_from_cart(first.id).await.unwrap();
  let second = market.carts.create(market.buyer.id, market.store.id).await.unwrap();
  let o2 = market.orders.create_from_cart(second.id).await.unwrap();

  let other = market.carts.create(market.stranger.id, market.store.id).await.unwrap();
  market.orders.create_from_cart(other.id).await.unwrap();

  let mine: Vec<_> = market
    .orders
    .list_for_holder(market.buyer.id)
    .await
    .unwrap()
    .into_iter()
    .map(|o| o.id)
    .collect();
  assert_eq!(mine.len(), 2);
  assert!(mine.contains(&o1.id));
  assert!(mine.contains(&o2.id));
}
