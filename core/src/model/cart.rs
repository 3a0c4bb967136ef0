// bazaar/src/model/cart.rs

//! Carts, their lines, and the orders carts are promoted into.

use super::{field_matches, optional_matches, CartStatus, Entity, OrderStatus, OwnerRef, Resource, ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A buyer's basket for one store. At most one cart per (user, store) is open.
///
/// `status` is not patchable: the only way a cart closes is through order
/// placement on the cart ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
  pub id: Uuid,
  pub user_id: Uuid,
  pub store_id: Uuid,
  pub status: CartStatus,
  pub delivery_address: Option<String>,
  pub payment_method_id: Option<Uuid>,
  pub shipping_id: Option<Uuid>,
  pub coupon_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CartFilter {
  pub id: Option<Uuid>,
  pub user_id: Option<Uuid>,
  pub store_id: Option<Uuid>,
  pub status: Option<CartStatus>,
  pub payment_method_id: Option<Uuid>,
  pub shipping_id: Option<Uuid>,
  pub coupon_id: Option<Uuid>,
}

impl CartFilter {
  /// The open cart of `user_id` in `store_id`, if any.
  pub fn open_for(user_id: Uuid, store_id: Uuid) -> Self {
    Self {
      id: None,
      user_id: Some(user_id),
      store_id: Some(store_id),
      status: Some(CartStatus::Open),
      ..Default::default()
    }
  }
}

/// Checkout details a buyer may set while the cart is open.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartPatch {
  pub delivery_address: Option<String>,
  pub payment_method_id: Option<Uuid>,
  pub shipping_id: Option<Uuid>,
  pub coupon_id: Option<Uuid>,
}

impl CartPatch {
  pub fn is_empty(&self) -> bool {
    self.delivery_address.is_none()
      && self.payment_method_id.is_none()
      && self.shipping_id.is_none()
      && self.coupon_id.is_none()
  }
}

impl Cart {
  pub fn open(user_id: Uuid, store_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      store_id,
      status: CartStatus::Open,
      delivery_address: None,
      payment_method_id: None,
      shipping_id: None,
      coupon_id: None,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn is_open(&self) -> bool {
    self.status == CartStatus::Open
  }
}

impl Entity for Cart {
  const KIND: ResourceKind = ResourceKind::Cart;
  type Filter = CartFilter;
  type Patch = CartPatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> CartFilter {
    CartFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &CartFilter) -> bool {
    field_matches(&filter.id, &self.id)
      && field_matches(&filter.user_id, &self.user_id)
      && field_matches(&filter.store_id, &self.store_id)
      && field_matches(&filter.status, &self.status)
      && optional_matches(&filter.payment_method_id, &self.payment_method_id)
      && optional_matches(&filter.shipping_id, &self.shipping_id)
      && optional_matches(&filter.coupon_id, &self.coupon_id)
  }

  fn apply(&mut self, patch: CartPatch) {
    if let Some(address) = patch.delivery_address {
      self.delivery_address = Some(address);
    }
    if let Some(id) = patch.payment_method_id {
      self.payment_method_id = Some(id);
    }
    if let Some(id) = patch.shipping_id {
      self.shipping_id = Some(id);
    }
    if let Some(id) = patch.coupon_id {
      self.coupon_id = Some(id);
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::User(self.user_id)
  }

  fn into_resource(self) -> Resource {
    Resource::Cart(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::Cart(e) => Some(e),
      _ => None,
    }
  }
}

// --- CartLine ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CartLineFilter {
  pub id: Option<Uuid>,
  pub cart_id: Option<Uuid>,
  pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct CartLinePatch {
  pub quantity: Option<i32>,
}

impl CartLine {
  pub fn new(cart_id: Uuid, product_id: Uuid, quantity: i32) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      cart_id,
      product_id,
      quantity,
      created_at: now,
      updated_at: now,
    }
  }
}

impl Entity for CartLine {
  const KIND: ResourceKind = ResourceKind::CartLine;
  type Filter = CartLineFilter;
  type Patch = CartLinePatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> CartLineFilter {
    CartLineFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &CartLineFilter) -> bool {
    field_matches(&filter.id, &self.id)
      && field_matches(&filter.cart_id, &self.cart_id)
      && field_matches(&filter.product_id, &self.product_id)
  }

  fn apply(&mut self, patch: CartLinePatch) {
    if let Some(quantity) = patch.quantity {
      self.quantity = quantity;
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::Cart(self.cart_id)
  }

  fn into_resource(self) -> Resource {
    Resource::CartLine(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::CartLine(e) => Some(e),
      _ => None,
    }
  }
}

// --- Order ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
  pub id: Option<Uuid>,
  pub cart_id: Option<Uuid>,
  pub status: Option<OrderStatus>,
}

/// Status advancement is left to an external fulfilment process; nothing in
/// this crate issues an order patch.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
  pub status: Option<OrderStatus>,
}

impl Order {
  pub fn pending(cart_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      cart_id,
      status: OrderStatus::Pending,
      created_at: now,
      updated_at: now,
    }
  }
}

impl Entity for Order {
  const KIND: ResourceKind = ResourceKind::Order;
  type Filter = OrderFilter;
  type Patch = OrderPatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> OrderFilter {
    OrderFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &OrderFilter) -> bool {
    field_matches(&filter.id, &self.id)
      && field_matches(&filter.cart_id, &self.cart_id)
      && field_matches(&filter.status, &self.status)
  }

  fn apply(&mut self, patch: OrderPatch) {
    if let Some(status) = patch.status {
      self.status = status;
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::Cart(self.cart_id)
  }

  fn into_resource(self) -> Resource {
    Resource::Order(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::Order(e) => Some(e),
      _ => None,
    }
  }
}
