// bazaar/src/repository/memory.rs

//! In-process storage backend.
//!
//! Each entity kind is a `parking_lot::RwLock<Vec<E>>`. Locks are never held
//! across an `.await`, so the async trait methods complete without yielding.

use super::{CartLedger, Repositories, Repository};
use crate::error::{BazaarError, BazaarResult, DomainViolation};
use crate::model::{
  Ad, Cart, CartFilter, CartLine, CartStatus, Category, Coupon, Entity, Notification, Order, PaymentMethod, Product,
  Shipping, Store, User,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{event, Level};

type Table<E> = Arc<RwLock<Vec<E>>>;

pub struct MemoryRepository<E: Entity> {
  table: Table<E>,
}

impl<E: Entity> MemoryRepository<E> {
  pub fn new() -> Self {
    Self {
      table: Arc::new(RwLock::new(Vec::new())),
    }
  }

  fn sharing(table: Table<E>) -> Self {
    Self { table }
  }

  pub fn len(&self) -> usize {
    self.table.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.read().is_empty()
  }
}

impl<E: Entity> Default for MemoryRepository<E> {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
  async fn find(&self, filter: &E::Filter) -> BazaarResult<Vec<E>> {
    let rows = self.table.read();
    Ok(rows.iter().filter(|e| e.matches(filter)).cloned().collect())
  }

  async fn create(&self, entity: E) -> BazaarResult<E> {
    let mut rows = self.table.write();
    if rows.iter().any(|e| e.id() == entity.id()) {
      return Err(BazaarError::Storage {
        source: anyhow::anyhow!("duplicate {} id {}", E::KIND, entity.id()),
      });
    }
    rows.push(entity.clone());
    event!(Level::TRACE, kind = %E::KIND, id = %entity.id(), "Row inserted.");
    Ok(entity)
  }

  async fn update(&self, entity: &E, patch: E::Patch) -> BazaarResult<E> {
    let mut rows = self.table.write();
    let row = rows
      .iter_mut()
      .find(|e| e.id() == entity.id())
      .ok_or_else(|| BazaarError::not_found(E::KIND, entity.id()))?;
    row.apply(patch);
    row.touch(Utc::now());
    Ok(row.clone())
  }

  async fn delete(&self, entity: &E) -> BazaarResult<()> {
    let mut rows = self.table.write();
    let before = rows.len();
    rows.retain(|e| e.id() != entity.id());
    if rows.len() == before {
      return Err(BazaarError::not_found(E::KIND, entity.id()));
    }
    Ok(())
  }
}

/// Ledger over the same cart and order tables the repositories use.
pub struct MemoryLedger {
  carts: Table<Cart>,
  orders: Table<Order>,
}

#[async_trait]
impl CartLedger for MemoryLedger {
  async fn open_cart(&self, cart: Cart) -> BazaarResult<Cart> {
    let mut carts = self.carts.write();
    let open = CartFilter::open_for(cart.user_id, cart.store_id);
    if carts.iter().any(|c| c.matches(&open)) {
      return Err(DomainViolation::CartAlreadyOpen.into());
    }
    carts.push(cart.clone());
    Ok(cart)
  }

  async fn place_order(&self, order: Order) -> BazaarResult<Order> {
    // Lock order: carts, then orders.
    let mut carts = self.carts.write();
    let mut orders = self.orders.write();

    let cart = carts
      .iter_mut()
      .find(|c| c.id == order.cart_id)
      .ok_or_else(|| BazaarError::not_found(Cart::KIND, order.cart_id))?;
    if cart.status != CartStatus::Open {
      return Err(DomainViolation::CartNotOpen.into());
    }
    cart.status = CartStatus::Closed;
    cart.touch(Utc::now());
    orders.push(order.clone());
    Ok(order)
  }
}

/// All tables of one in-memory store.
pub struct MemoryBackend {
  carts: Table<Cart>,
  orders: Table<Order>,
}

impl MemoryBackend {
  pub fn new() -> Self {
    Self {
      carts: Arc::new(RwLock::new(Vec::new())),
      orders: Arc::new(RwLock::new(Vec::new())),
    }
  }

  pub fn into_repositories(self) -> Repositories {
    Repositories {
      users: Arc::new(MemoryRepository::<User>::new()),
      stores: Arc::new(MemoryRepository::<Store>::new()),
      categories: Arc::new(MemoryRepository::<Category>::new()),
      products: Arc::new(MemoryRepository::<Product>::new()),
      ads: Arc::new(MemoryRepository::<Ad>::new()),
      coupons: Arc::new(MemoryRepository::<Coupon>::new()),
      shippings: Arc::new(MemoryRepository::<Shipping>::new()),
      payment_methods: Arc::new(MemoryRepository::<PaymentMethod>::new()),
      carts: Arc::new(MemoryRepository::sharing(self.carts.clone())),
      cart_lines: Arc::new(MemoryRepository::<CartLine>::new()),
      orders: Arc::new(MemoryRepository::sharing(self.orders.clone())),
      notifications: Arc::new(MemoryRepository::<Notification>::new()),
      ledger: Arc::new(MemoryLedger {
        carts: self.carts,
        orders: self.orders,
      }),
    }
  }
}

impl Default for MemoryBackend {
  fn default() -> Self {
    Self::new()
  }
}
