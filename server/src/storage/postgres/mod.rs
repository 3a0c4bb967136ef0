// bazaar_server/src/storage/postgres/mod.rs

//! PostgreSQL backend.
//!
//! Every entity describes its table through [`PgTable`]; one generic
//! [`PgRepository`] turns that description into SQL. The cart ledger relies on
//! two database guarantees: the partial unique index `carts_one_open_per_pair`
//! and a conditional `open -> closed` update checked by affected row count.

mod tables;

pub use tables::PgTable;

use async_trait::async_trait;
use bazaar::model::{
  Ad, Cart, CartLine, Category, Coupon, Entity, Notification, Order, PaymentMethod, Product, ResourceKind, Shipping, Store,
  User,
};
use bazaar::{BazaarError, BazaarResult, CartLedger, DomainViolation, Repositories, Repository};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level};
use uuid::Uuid;

pub type Sql = QueryBuilder<'static, Postgres>;

/// Name of the partial unique index enforcing one open cart per (user, store).
pub const ONE_OPEN_CART_INDEX: &str = "carts_one_open_per_pair";

fn storage(err: sqlx::Error) -> BazaarError {
  BazaarError::Storage { source: err.into() }
}

fn insert<E: PgTable>(entity: &E) -> Sql {
  let mut builder: Sql = QueryBuilder::new(format!("INSERT INTO {} ({}) VALUES (", E::TABLE, E::COLUMNS));
  {
    let mut values = builder.separated(", ");
    entity.push_values(&mut values);
  }
  builder.push(format!(") RETURNING {}", E::COLUMNS));
  builder
}

pub struct PgRepository<E> {
  pool: PgPool,
  _entity: PhantomData<fn() -> E>,
}

impl<E> PgRepository<E> {
  pub fn new(pool: PgPool) -> Self {
    Self {
      pool,
      _entity: PhantomData,
    }
  }
}

#[async_trait]
impl<E: PgTable> Repository<E> for PgRepository<E> {
  #[instrument(name = "PgRepository::find", skip(self, filter), fields(table = E::TABLE))]
  async fn find(&self, filter: &E::Filter) -> BazaarResult<Vec<E>> {
    let mut builder: Sql = QueryBuilder::new(format!("SELECT {} FROM {} WHERE TRUE", E::COLUMNS, E::TABLE));
    E::push_filter(filter, &mut builder);
    builder.push(" ORDER BY created_at");

    let rows = builder.build().fetch_all(&self.pool).await.map_err(storage)?;
    rows.iter().map(|row| E::decode(row).map_err(storage)).collect()
  }

  async fn create(&self, entity: E) -> BazaarResult<E> {
    let mut builder = insert(&entity);
    let row = builder.build().fetch_one(&self.pool).await.map_err(storage)?;
    E::decode(&row).map_err(storage)
  }

  async fn update(&self, entity: &E, patch: E::Patch) -> BazaarResult<E> {
    let mut builder: Sql = QueryBuilder::new(format!("UPDATE {} SET updated_at = NOW()", E::TABLE));
    E::push_patch(patch, &mut builder);
    builder.push(" WHERE id = ").push_bind(entity.id());
    builder.push(format!(" RETURNING {}", E::COLUMNS));

    let row = builder
      .build()
      .fetch_optional(&self.pool)
      .await
      .map_err(storage)?
      .ok_or_else(|| BazaarError::not_found(E::KIND, entity.id()))?;
    E::decode(&row).map_err(storage)
  }

  async fn delete(&self, entity: &E) -> BazaarResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
    // A reference added after the lifecycle check still trips the foreign key.
    let result = match sqlx::query(&sql).bind(entity.id()).execute(&self.pool).await {
      Ok(result) => result,
      Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
        return Err(DomainViolation::StillReferenced(E::KIND).into());
      }
      Err(e) => return Err(storage(e)),
    };
    if result.rows_affected() == 0 {
      return Err(BazaarError::not_found(E::KIND, entity.id()));
    }
    Ok(())
  }
}

pub struct PgLedger {
  pool: PgPool,
}

impl PgLedger {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CartLedger for PgLedger {
  #[instrument(name = "PgLedger::open_cart", skip(self, cart), fields(user_id = %cart.user_id, store_id = %cart.store_id))]
  async fn open_cart(&self, cart: Cart) -> BazaarResult<Cart> {
    let mut builder = insert(&cart);
    match builder.build().fetch_one(&self.pool).await {
      Ok(row) => Cart::decode(&row).map_err(storage),
      Err(sqlx::Error::Database(db_err)) if db_err.constraint() == Some(ONE_OPEN_CART_INDEX) => {
        event!(Level::DEBUG, "Open cart already exists for this pair.");
        Err(DomainViolation::CartAlreadyOpen.into())
      }
      Err(e) => Err(storage(e)),
    }
  }

  #[instrument(name = "PgLedger::place_order", skip(self, order), fields(cart_id = %order.cart_id))]
  async fn place_order(&self, order: Order) -> BazaarResult<Order> {
    let mut tx = self.pool.begin().await.map_err(storage)?;

    let closed = sqlx::query("UPDATE carts SET status = 'closed', updated_at = NOW() WHERE id = $1 AND status = 'open'")
      .bind(order.cart_id)
      .execute(&mut *tx)
      .await
      .map_err(storage)?;

    if closed.rows_affected() == 0 {
      let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM carts WHERE id = $1")
        .bind(order.cart_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;
      tx.rollback().await.map_err(storage)?;
      return Err(match existing {
        Some(_) => DomainViolation::CartNotOpen.into(),
        None => BazaarError::not_found(ResourceKind::Cart, order.cart_id),
      });
    }

    let mut builder = insert(&order);
    let row = builder.build().fetch_one(&mut *tx).await.map_err(storage)?;
    let placed = Order::decode(&row).map_err(storage)?;
    tx.commit().await.map_err(storage)?;
    Ok(placed)
  }
}

/// The full repository bundle over one connection pool.
pub fn repositories(pool: PgPool) -> Repositories {
  Repositories {
    users: Arc::new(PgRepository::<User>::new(pool.clone())),
    stores: Arc::new(PgRepository::<Store>::new(pool.clone())),
    categories: Arc::new(PgRepository::<Category>::new(pool.clone())),
    products: Arc::new(PgRepository::<Product>::new(pool.clone())),
    ads: Arc::new(PgRepository::<Ad>::new(pool.clone())),
    coupons: Arc::new(PgRepository::<Coupon>::new(pool.clone())),
    shippings: Arc::new(PgRepository::<Shipping>::new(pool.clone())),
    payment_methods: Arc::new(PgRepository::<PaymentMethod>::new(pool.clone())),
    carts: Arc::new(PgRepository::<Cart>::new(pool.clone())),
    cart_lines: Arc::new(PgRepository::<CartLine>::new(pool.clone())),
    orders: Arc::new(PgRepository::<Order>::new(pool.clone())),
    notifications: Arc::new(PgRepository::<Notification>::new(pool.clone())),
    ledger: Arc::new(PgLedger::new(pool)),
  }
}
