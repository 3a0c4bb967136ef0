// bazaar/src/repository/mod.rs

//! The storage capability consumed by the access pipeline and lifecycle services.
//!
//! The crate never talks to a database directly. It sees one [`Repository`] per
//! entity kind plus a [`CartLedger`] for the two transitions that must be atomic,
//! all bundled in [`Repositories`]. An in-memory backend lives in [`memory`];
//! other backends implement the same traits out of tree.

pub mod memory;

use crate::error::{BazaarError, BazaarResult};
use crate::model::{
  Ad, Cart, CartLine, Category, Coupon, Entity, Notification, Order, PaymentMethod, Product, Shipping, Store, User,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{event, Level};
use uuid::Uuid;

/// Generic CRUD over one entity kind.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
  /// All entities matching every set field of `filter`.
  async fn find(&self, filter: &E::Filter) -> BazaarResult<Vec<E>>;

  async fn create(&self, entity: E) -> BazaarResult<E>;

  /// Applies `patch` to the stored copy of `entity`, stamps `updated_at`, and
  /// returns the stored result.
  async fn update(&self, entity: &E, patch: E::Patch) -> BazaarResult<E>;

  async fn delete(&self, entity: &E) -> BazaarResult<()>;

  /// At most one match. Several matches mean a unique lookup is broken in
  /// storage and fail with `InvariantViolation`.
  async fn find_optional(&self, filter: &E::Filter) -> BazaarResult<Option<E>> {
    let mut found = self.find(filter).await?;
    match found.len() {
      0 | 1 => Ok(found.pop()),
      matches => {
        event!(
          Level::ERROR,
          kind = %E::KIND,
          matches,
          filter = ?filter,
          "Unique lookup matched more than one row."
        );
        Err(BazaarError::InvariantViolation { kind: E::KIND, matches })
      }
    }
  }

  /// Exactly one match, otherwise `NotFound` (or `InvariantViolation`).
  async fn get_required(&self, filter: &E::Filter) -> BazaarResult<E> {
    self
      .find_optional(filter)
      .await?
      .ok_or_else(|| BazaarError::not_found(E::KIND, format!("{filter:?}")))
  }

  async fn get_by_id(&self, id: Uuid) -> BazaarResult<E> {
    self
      .find_optional(&E::id_filter(id))
      .await?
      .ok_or_else(|| BazaarError::not_found(E::KIND, id))
  }
}

/// The check-then-act transitions of the cart lifecycle. Implementations make
/// each call atomic with respect to concurrent callers.
#[async_trait]
pub trait CartLedger: Send + Sync {
  /// Inserts `cart` unless its (user, store) pair already has an open cart,
  /// in which case it fails with `DomainViolation::CartAlreadyOpen`.
  async fn open_cart(&self, cart: Cart) -> BazaarResult<Cart>;

  /// Closes the cart referenced by `order` (`open -> closed`) and inserts the
  /// order as one unit. Fails with `DomainViolation::CartNotOpen` if the cart
  /// was not open, or `NotFound` if it does not exist.
  async fn place_order(&self, order: Order) -> BazaarResult<Order>;
}

/// One repository per entity kind plus the cart ledger. Cheap to clone.
#[derive(Clone)]
pub struct Repositories {
  pub users: Arc<dyn Repository<User>>,
  pub stores: Arc<dyn Repository<Store>>,
  pub categories: Arc<dyn Repository<Category>>,
  pub products: Arc<dyn Repository<Product>>,
  pub ads: Arc<dyn Repository<Ad>>,
  pub coupons: Arc<dyn Repository<Coupon>>,
  pub shippings: Arc<dyn Repository<Shipping>>,
  pub payment_methods: Arc<dyn Repository<PaymentMethod>>,
  pub carts: Arc<dyn Repository<Cart>>,
  pub cart_lines: Arc<dyn Repository<CartLine>>,
  pub orders: Arc<dyn Repository<Order>>,
  pub notifications: Arc<dyn Repository<Notification>>,
  pub ledger: Arc<dyn CartLedger>,
}

impl Repositories {
  /// A fresh, empty in-memory backend.
  pub fn in_memory() -> Self {
    memory::MemoryBackend::new().into_repositories()
  }

  /// The repository for entity type `E`.
  pub fn of<E: Stored>(&self) -> &Arc<dyn Repository<E>> {
    E::repository(self)
  }
}

impl std::fmt::Debug for Repositories {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Repositories").finish_non_exhaustive()
  }
}

/// Entity with a slot in [`Repositories`].
pub trait Stored: Entity {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>>;
}

impl Stored for User {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.users
  }
}

impl Stored for Store {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.stores
  }
}

impl Stored for Category {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.categories
  }
}

impl Stored for Product {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.products
  }
}

impl Stored for Ad {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.ads
  }
}

impl Stored for Coupon {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.coupons
  }
}

impl Stored for Shipping {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.shippings
  }
}

impl Stored for PaymentMethod {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.payment_methods
  }
}

impl Stored for Cart {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.carts
  }
}

impl Stored for CartLine {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.cart_lines
  }
}

impl Stored for Order {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.orders
  }
}

impl Stored for Notification {
  fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
    &repos.notifications
  }
}
