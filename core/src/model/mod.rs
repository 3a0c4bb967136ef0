// bazaar/src/model/mod.rs

//! The marketplace entity model.
//!
//! Every persisted type implements [`Entity`], which gives the repository layer
//! a typed filter and patch for it, and gives the access pipeline a way to find
//! who owns an instance (see [`OwnerRef`]).

pub mod account;
pub mod cart;
pub mod status;
pub mod store;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

pub use account::{Notification, NotificationFilter, NotificationPatch, User, UserFilter, UserPatch};
pub use cart::{Cart, CartFilter, CartLine, CartLineFilter, CartLinePatch, CartPatch, Order, OrderFilter, OrderPatch};
pub use status::{CartStatus, OrderStatus, UnknownStatus};
pub use store::{
  Ad, AdDraft, AdFilter, AdPatch, Category, CategoryDraft, CategoryFilter, CategoryPatch, Coupon, CouponDraft,
  CouponFilter, CouponPatch, PaymentMethod, PaymentMethodDraft, PaymentMethodFilter, PaymentMethodPatch, Product,
  ProductDraft, ProductFilter, ProductPatch, Shipping, ShippingDraft, ShippingFilter, ShippingPatch, Store,
  StoreDraft, StoreFilter, StorePatch, StoreScoped,
};

/// Every kind of resource the access pipeline can gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
  User,
  Store,
  Category,
  Product,
  Ad,
  Coupon,
  Shipping,
  PaymentMethod,
  Cart,
  CartLine,
  Order,
  Notification,
}

impl ResourceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ResourceKind::User => "user",
      ResourceKind::Store => "store",
      ResourceKind::Category => "category",
      ResourceKind::Product => "product",
      ResourceKind::Ad => "ad",
      ResourceKind::Coupon => "coupon",
      ResourceKind::Shipping => "shipping",
      ResourceKind::PaymentMethod => "payment_method",
      ResourceKind::Cart => "cart",
      ResourceKind::CartLine => "cart_line",
      ResourceKind::Order => "order",
      ResourceKind::Notification => "notification",
    }
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Where ownership of an entity is decided.
///
/// Stores and carts are intermediate owners: a `Store(id)` reference is settled
/// by that store's `owner_user_id`, a `Cart(id)` reference by the cart's
/// `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerRef {
  User(Uuid),
  Store(Uuid),
  Cart(Uuid),
}

/// Type-erased entity, as held by the per-request access context.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Resource {
  User(User),
  Store(Store),
  Category(Category),
  Product(Product),
  Ad(Ad),
  Coupon(Coupon),
  Shipping(Shipping),
  PaymentMethod(PaymentMethod),
  Cart(Cart),
  CartLine(CartLine),
  Order(Order),
  Notification(Notification),
}

impl Resource {
  pub fn kind(&self) -> ResourceKind {
    match self {
      Resource::User(_) => ResourceKind::User,
      Resource::Store(_) => ResourceKind::Store,
      Resource::Category(_) => ResourceKind::Category,
      Resource::Product(_) => ResourceKind::Product,
      Resource::Ad(_) => ResourceKind::Ad,
      Resource::Coupon(_) => ResourceKind::Coupon,
      Resource::Shipping(_) => ResourceKind::Shipping,
      Resource::PaymentMethod(_) => ResourceKind::PaymentMethod,
      Resource::Cart(_) => ResourceKind::Cart,
      Resource::CartLine(_) => ResourceKind::CartLine,
      Resource::Order(_) => ResourceKind::Order,
      Resource::Notification(_) => ResourceKind::Notification,
    }
  }

  pub fn id(&self) -> Uuid {
    match self {
      Resource::User(e) => e.id,
      Resource::Store(e) => e.id,
      Resource::Category(e) => e.id,
      Resource::Product(e) => e.id,
      Resource::Ad(e) => e.id,
      Resource::Coupon(e) => e.id,
      Resource::Shipping(e) => e.id,
      Resource::PaymentMethod(e) => e.id,
      Resource::Cart(e) => e.id,
      Resource::CartLine(e) => e.id,
      Resource::Order(e) => e.id,
      Resource::Notification(e) => e.id,
    }
  }
}

/// A persisted marketplace entity.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
  const KIND: ResourceKind;

  /// All-optional equality predicates. `Default` matches everything.
  type Filter: Default + Clone + fmt::Debug + Send + Sync + 'static;

  /// All-optional field updates. `None` leaves a field unchanged.
  type Patch: Default + Clone + fmt::Debug + Send + Sync + 'static;

  fn id(&self) -> Uuid;

  fn id_filter(id: Uuid) -> Self::Filter;

  fn matches(&self, filter: &Self::Filter) -> bool;

  fn apply(&mut self, patch: Self::Patch);

  fn touch(&mut self, at: DateTime<Utc>);

  fn owner_ref(&self) -> OwnerRef;

  fn into_resource(self) -> Resource;

  fn from_resource(resource: &Resource) -> Option<&Self>;
}

/// True when the filter leaves the field unconstrained or equals it.
pub(crate) fn field_matches<V: PartialEq>(wanted: &Option<V>, actual: &V) -> bool {
  wanted.as_ref().map_or(true, |w| w == actual)
}

/// Like [`field_matches`] for a nullable field. An unset field never matches a wanted value.
pub(crate) fn optional_matches<V: PartialEq>(wanted: &Option<V>, actual: &Option<V>) -> bool {
  wanted.as_ref().map_or(true, |w| actual.as_ref() == Some(w))
}
