// bazaar/src/lifecycle/order.rs

use crate::error::BazaarResult;
use crate::model::{CartFilter, Order, OrderFilter};
use crate::repository::Repositories;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct OrderService {
  repos: Repositories,
}

impl OrderService {
  pub fn new(repos: Repositories) -> Self {
    Self { repos }
  }

  /// Promotes an open cart into a `pending` order and closes the cart.
  ///
  /// Fails with `CartNotOpen` if the cart is closed, including when a
  /// concurrent call closed it first.
  #[instrument(name = "OrderService::create_from_cart", skip(self), err(Display))]
  pub async fn create_from_cart(&self, cart_id: Uuid) -> BazaarResult<Order> {
    let order = self.repos.ledger.place_order(Order::pending(cart_id)).await?;
    info!(order_id = %order.id, "Order placed, cart closed.");
    Ok(order)
  }

  pub async fn get(&self, order_id: Uuid) -> BazaarResult<Order> {
    self.repos.orders.get_by_id(order_id).await
  }

  /// Orders placed from any of `user_id`'s carts, oldest first.
  #[instrument(name = "OrderService::list_for_holder", skip(self), err(Display))]
  pub async fn list_for_holder(&self, user_id: Uuid) -> BazaarResult<Vec<Order>> {
    let carts = self
      .repos
      .carts
      .find(&CartFilter {
        user_id: Some(user_id),
        ..Default::default()
      })
      .await?;

    let mut orders = Vec::new();
    for cart in carts {
      let filter = OrderFilter {
        cart_id: Some(cart.id),
        ..Default::default()
      };
      orders.extend(self.repos.orders.find(&filter).await?);
    }
    orders.sort_by_key(|o| o.created_at);
    Ok(orders)
  }
}
