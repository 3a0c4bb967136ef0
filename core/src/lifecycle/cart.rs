// bazaar/src/lifecycle/cart.rs

//! The cart state machine: `open` until an order is placed, then `closed` for good.

use super::ensure_in_store;
use crate::error::{BazaarError, BazaarResult, DomainViolation};
use crate::model::{Cart, CartFilter, CartLine, CartLineFilter, CartLinePatch, CartPatch, Entity, ResourceKind};
use crate::repository::Repositories;
use serde::Serialize;
use tracing::{event, info, instrument, Level};
use uuid::Uuid;

/// Result of [`CartService::get_or_create`].
#[derive(Debug, Clone, Serialize)]
pub struct CartLookup {
  pub cart: Cart,
  pub created: bool,
}

#[derive(Debug, Clone)]
pub struct CartService {
  repos: Repositories,
}

impl CartService {
  pub fn new(repos: Repositories) -> Self {
    Self { repos }
  }

  /// Opens a new cart for `(user_id, store_id)`.
  ///
  /// Fails with `CartAlreadyOpen` if the pair already has one. The check and
  /// the insert are a single ledger operation.
  #[instrument(name = "CartService::create", skip(self), err(Display))]
  pub async fn create(&self, user_id: Uuid, store_id: Uuid) -> BazaarResult<Cart> {
    self.repos.stores.get_by_id(store_id).await?;
    let cart = self.repos.ledger.open_cart(Cart::open(user_id, store_id)).await?;
    info!(cart_id = %cart.id, "Cart opened.");
    Ok(cart)
  }

  /// Returns the caller's open cart for the store, opening one if there is none.
  #[instrument(name = "CartService::get_or_create", skip(self), err(Display))]
  pub async fn get_or_create(&self, user_id: Uuid, store_id: Uuid) -> BazaarResult<CartLookup> {
    let open = CartFilter::open_for(user_id, store_id);
    if let Some(cart) = self.repos.carts.find_optional(&open).await? {
      return Ok(CartLookup { cart, created: false });
    }

    match self.create(user_id, store_id).await {
      Ok(cart) => Ok(CartLookup { cart, created: true }),
      // A concurrent request opened it between our read and our insert.
      Err(BazaarError::DomainState(DomainViolation::CartAlreadyOpen)) => {
        event!(Level::DEBUG, %user_id, %store_id, "Lost cart creation race, returning the winner's cart.");
        let cart = self.repos.carts.get_required(&open).await?;
        Ok(CartLookup { cart, created: false })
      }
      Err(e) => Err(e),
    }
  }

  pub async fn get(&self, cart_id: Uuid) -> BazaarResult<Cart> {
    self.repos.carts.get_by_id(cart_id).await
  }

  pub async fn lines(&self, cart: &Cart) -> BazaarResult<Vec<CartLine>> {
    self
      .repos
      .cart_lines
      .find(&CartLineFilter {
        cart_id: Some(cart.id),
        ..Default::default()
      })
      .await
  }

  /// Current state of `cart`, failing with `CartNotOpen` unless it is open.
  async fn reload_open(&self, cart: &Cart) -> BazaarResult<Cart> {
    let current = self.repos.carts.get_by_id(cart.id).await?;
    if !current.is_open() {
      event!(Level::DEBUG, cart_id = %current.id, status = %current.status, "Cart is not open.");
      return Err(DomainViolation::CartNotOpen.into());
    }
    Ok(current)
  }

  fn ensure_line_of(cart: &Cart, line: &CartLine) -> BazaarResult<()> {
    if line.cart_id != cart.id {
      return Err(BazaarError::not_found(CartLine::KIND, line.id));
    }
    Ok(())
  }

  /// Adds a new line. Repeated adds of one product create separate lines.
  #[instrument(name = "CartService::add_line", skip(self, cart), fields(cart_id = %cart.id), err(Display))]
  pub async fn add_line(&self, cart: &Cart, product_id: Uuid, quantity: i32) -> BazaarResult<CartLine> {
    let cart = self.reload_open(cart).await?;
    if quantity <= 0 {
      return Err(DomainViolation::NonPositiveQuantity.into());
    }
    ensure_in_store(&self.repos, cart.store_id, ResourceKind::Product, product_id).await?;

    let line = self
      .repos
      .cart_lines
      .create(CartLine::new(cart.id, product_id, quantity))
      .await?;
    info!(line_id = %line.id, quantity, "Cart line added.");
    Ok(line)
  }

  /// Overwrites a line's quantity. Non-positive quantities are rejected here
  /// too; removing a line is `delete_line`'s job.
  #[instrument(name = "CartService::update_line", skip(self, cart, line), fields(cart_id = %cart.id, line_id = %line.id), err(Display))]
  pub async fn update_line(&self, cart: &Cart, line: &CartLine, quantity: i32) -> BazaarResult<CartLine> {
    let cart = self.reload_open(cart).await?;
    Self::ensure_line_of(&cart, line)?;
    if quantity <= 0 {
      return Err(DomainViolation::NonPositiveQuantity.into());
    }

    let patch = CartLinePatch { quantity: Some(quantity) };
    let updated = self.repos.cart_lines.update(line, patch).await?;
    info!(quantity, "Cart line updated.");
    Ok(updated)
  }

  #[instrument(name = "CartService::delete_line", skip(self, cart, line), fields(cart_id = %cart.id, line_id = %line.id), err(Display))]
  pub async fn delete_line(&self, cart: &Cart, line: &CartLine) -> BazaarResult<()> {
    let cart = self.reload_open(cart).await?;
    Self::ensure_line_of(&cart, line)?;
    self.repos.cart_lines.delete(line).await?;
    info!("Cart line removed.");
    Ok(())
  }

  /// Sets checkout details. Every referenced payment method, shipping option
  /// and coupon must belong to the cart's store.
  #[instrument(name = "CartService::update_details", skip(self, cart, patch), fields(cart_id = %cart.id), err(Display))]
  pub async fn update_details(&self, cart: &Cart, patch: CartPatch) -> BazaarResult<Cart> {
    let cart = self.reload_open(cart).await?;
    if patch.is_empty() {
      return Ok(cart);
    }

    let references = [
      (ResourceKind::PaymentMethod, patch.payment_method_id),
      (ResourceKind::Shipping, patch.shipping_id),
      (ResourceKind::Coupon, patch.coupon_id),
    ];
    for (kind, id) in references {
      if let Some(id) = id {
        ensure_in_store(&self.repos, cart.store_id, kind, id).await?;
      }
    }

    let updated = self.repos.carts.update(&cart, patch).await?;
    info!("Cart details updated.");
    Ok(updated)
  }
}
