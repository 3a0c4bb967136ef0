// bazaar_server/src/storage/postgres/tables.rs

use bazaar::model::{
  Ad, AdFilter, AdPatch, Cart, CartFilter, CartLine, CartLineFilter, CartLinePatch, CartPatch, Category,
  CategoryFilter, CategoryPatch, Coupon, CouponFilter, CouponPatch, Entity, Notification, NotificationFilter,
  NotificationPatch, Order, OrderFilter, OrderPatch, PaymentMethod, PaymentMethodFilter, PaymentMethodPatch, Product,
  ProductFilter, ProductPatch, Shipping, ShippingFilter, ShippingPatch, Store, StoreFilter, StorePatch, User,
  UserFilter, UserPatch,
};
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{Encode, Postgres, Row, Type};
use std::str::FromStr;

use super::Sql;

pub type Values<'qb> = Separated<'qb, 'static, Postgres, &'static str>;

/// How an entity maps onto its table.
pub trait PgTable: Entity {
  const TABLE: &'static str;

  /// Every column, in the order `push_values` binds them.
  const COLUMNS: &'static str;

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error>;

  /// Appends ` AND column = $n` for every set filter field.
  fn push_filter(filter: &Self::Filter, builder: &mut Sql);

  fn push_values(&self, values: &mut Values<'_>);

  /// Appends `, column = $n` for every set patch field.
  fn push_patch(patch: Self::Patch, builder: &mut Sql);
}

fn eq<T>(builder: &mut Sql, column: &str, value: Option<T>)
where
  T: 'static + Encode<'static, Postgres> + Type<Postgres> + Send,
{
  if let Some(value) = value {
    builder.push(" AND ").push(column).push(" = ").push_bind(value);
  }
}

fn set<T>(builder: &mut Sql, column: &str, value: Option<T>)
where
  T: 'static + Encode<'static, Postgres> + Type<Postgres> + Send,
{
  if let Some(value) = value {
    builder.push(", ").push(column).push(" = ").push_bind(value);
  }
}

fn status<S>(row: &PgRow) -> Result<S, sqlx::Error>
where
  S: FromStr,
  S::Err: std::error::Error + Send + Sync + 'static,
{
  let raw: String = row.try_get("status")?;
  raw.parse::<S>().map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl PgTable for User {
  const TABLE: &'static str = "users";
  const COLUMNS: &'static str = "id, email, password_hash, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      email: row.try_get("email")?,
      password_hash: row.try_get("password_hash")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &UserFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "email", filter.email.clone());
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.email.clone())
      .push_bind(self.password_hash.clone())
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: UserPatch, builder: &mut Sql) {
    set(builder, "email", patch.email);
    set(builder, "password_hash", patch.password_hash);
  }
}

impl PgTable for Store {
  const TABLE: &'static str = "stores";
  const COLUMNS: &'static str = "id, name, owner_user_id, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      name: row.try_get("name")?,
      owner_user_id: row.try_get("owner_user_id")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &StoreFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "owner_user_id", filter.owner_user_id);
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.name.clone())
      .push_bind(self.owner_user_id)
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: StorePatch, builder: &mut Sql) {
    set(builder, "name", patch.name);
  }
}

impl PgTable for Category {
  const TABLE: &'static str = "categories";
  const COLUMNS: &'static str = "id, store_id, name, image_url, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      store_id: row.try_get("store_id")?,
      name: row.try_get("name")?,
      image_url: row.try_get("image_url")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &CategoryFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "store_id", filter.store_id);
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.store_id)
      .push_bind(self.name.clone())
      .push_bind(self.image_url.clone())
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: CategoryPatch, builder: &mut Sql) {
    set(builder, "name", patch.name);
    set(builder, "image_url", patch.image_url);
  }
}

impl PgTable for Product {
  const TABLE: &'static str = "products";
  const COLUMNS: &'static str = "id, store_id, category_id, title, image_url, price_cents, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      store_id: row.try_get("store_id")?,
      category_id: row.try_get("category_id")?,
      title: row.try_get("title")?,
      image_url: row.try_get("image_url")?,
      price_cents: row.try_get("price_cents")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &ProductFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "store_id", filter.store_id);
    eq(builder, "category_id", filter.category_id);
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.store_id)
      .push_bind(self.category_id)
      .push_bind(self.title.clone())
      .push_bind(self.image_url.clone())
      .push_bind(self.price_cents)
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: ProductPatch, builder: &mut Sql) {
    set(builder, "category_id", patch.category_id);
    set(builder, "title", patch.title);
    set(builder, "image_url", patch.image_url);
    set(builder, "price_cents", patch.price_cents);
  }
}

impl PgTable for Ad {
  const TABLE: &'static str = "ads";
  const COLUMNS: &'static str = "id, store_id, product_id, image_url, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      store_id: row.try_get("store_id")?,
      product_id: row.try_get("product_id")?,
      image_url: row.try_get("image_url")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &AdFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "store_id", filter.store_id);
    eq(builder, "product_id", filter.product_id);
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.store_id)
      .push_bind(self.product_id)
      .push_bind(self.image_url.clone())
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: AdPatch, builder: &mut Sql) {
    set(builder, "product_id", patch.product_id);
    set(builder, "image_url", patch.image_url);
  }
}

impl PgTable for Coupon {
  const TABLE: &'static str = "coupons";
  const COLUMNS: &'static str = "id, store_id, code, discount, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      store_id: row.try_get("store_id")?,
      code: row.try_get("code")?,
      discount: row.try_get("discount")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &CouponFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "store_id", filter.store_id);
    eq(builder, "code", filter.code.clone());
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.store_id)
      .push_bind(self.code.clone())
      .push_bind(self.discount)
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: CouponPatch, builder: &mut Sql) {
    set(builder, "code", patch.code);
    set(builder, "discount", patch.discount);
  }
}

impl PgTable for Shipping {
  const TABLE: &'static str = "shippings";
  const COLUMNS: &'static str = "id, store_id, name, price_cents, delivery_days, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      store_id: row.try_get("store_id")?,
      name: row.try_get("name")?,
      price_cents: row.try_get("price_cents")?,
      delivery_days: row.try_get("delivery_days")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &ShippingFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "store_id", filter.store_id);
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.store_id)
      .push_bind(self.name.clone())
      .push_bind(self.price_cents)
      .push_bind(self.delivery_days)
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: ShippingPatch, builder: &mut Sql) {
    set(builder, "name", patch.name);
    set(builder, "price_cents", patch.price_cents);
    set(builder, "delivery_days", patch.delivery_days);
  }
}

impl PgTable for PaymentMethod {
  const TABLE: &'static str = "payment_methods";
  const COLUMNS: &'static str = "id, store_id, name, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      store_id: row.try_get("store_id")?,
      name: row.try_get("name")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &PaymentMethodFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "store_id", filter.store_id);
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.store_id)
      .push_bind(self.name.clone())
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: PaymentMethodPatch, builder: &mut Sql) {
    set(builder, "name", patch.name);
  }
}

impl PgTable for Cart {
  const TABLE: &'static str = "carts";
  const COLUMNS: &'static str = "id, user_id, store_id, status, delivery_address, payment_method_id, shipping_id, \
                                 coupon_id, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      user_id: row.try_get("user_id")?,
      store_id: row.try_get("store_id")?,
      status: status(row)?,
      delivery_address: row.try_get("delivery_address")?,
      payment_method_id: row.try_get("payment_method_id")?,
      shipping_id: row.try_get("shipping_id")?,
      coupon_id: row.try_get("coupon_id")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &CartFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "user_id", filter.user_id);
    eq(builder, "store_id", filter.store_id);
    eq(builder, "status", filter.status.map(|s| s.as_str().to_owned()));
    eq(builder, "payment_method_id", filter.payment_method_id);
    eq(builder, "shipping_id", filter.shipping_id);
    eq(builder, "coupon_id", filter.coupon_id);
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.user_id)
      .push_bind(self.store_id)
      .push_bind(self.status.as_str().to_owned())
      .push_bind(self.delivery_address.clone())
      .push_bind(self.payment_method_id)
      .push_bind(self.shipping_id)
      .push_bind(self.coupon_id)
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  // Status is never patched; closing goes through the ledger.
  fn push_patch(patch: CartPatch, builder: &mut Sql) {
    set(builder, "delivery_address", patch.delivery_address);
    set(builder, "payment_method_id", patch.payment_method_id);
    set(builder, "shipping_id", patch.shipping_id);
    set(builder, "coupon_id", patch.coupon_id);
  }
}

impl PgTable for CartLine {
  const TABLE: &'static str = "cart_lines";
  const COLUMNS: &'static str = "id, cart_id, product_id, quantity, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      cart_id: row.try_get("cart_id")?,
      product_id: row.try_get("product_id")?,
      quantity: row.try_get("quantity")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &CartLineFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "cart_id", filter.cart_id);
    eq(builder, "product_id", filter.product_id);
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.cart_id)
      .push_bind(self.product_id)
      .push_bind(self.quantity)
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: CartLinePatch, builder: &mut Sql) {
    set(builder, "quantity", patch.quantity);
  }
}

impl PgTable for Order {
  const TABLE: &'static str = "orders";
  const COLUMNS: &'static str = "id, cart_id, status, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      cart_id: row.try_get("cart_id")?,
      status: status(row)?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &OrderFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "cart_id", filter.cart_id);
    eq(builder, "status", filter.status.map(|s| s.as_str().to_owned()));
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.cart_id)
      .push_bind(self.status.as_str().to_owned())
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: OrderPatch, builder: &mut Sql) {
    set(builder, "status", patch.status.map(|s| s.as_str().to_owned()));
  }
}

impl PgTable for Notification {
  const TABLE: &'static str = "notifications";
  const COLUMNS: &'static str = "id, user_id, title, message, read, metadata, created_at, updated_at";

  fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
    Ok(Self {
      id: row.try_get("id")?,
      user_id: row.try_get("user_id")?,
      title: row.try_get("title")?,
      message: row.try_get("message")?,
      read: row.try_get("read")?,
      metadata: row.try_get("metadata")?,
      created_at: row.try_get("created_at")?,
      updated_at: row.try_get("updated_at")?,
    })
  }

  fn push_filter(filter: &NotificationFilter, builder: &mut Sql) {
    eq(builder, "id", filter.id);
    eq(builder, "user_id", filter.user_id);
    eq(builder, "read", filter.read);
  }

  fn push_values(&self, values: &mut Values<'_>) {
    values
      .push_bind(self.id)
      .push_bind(self.user_id)
      .push_bind(self.title.clone())
      .push_bind(self.message.clone())
      .push_bind(self.read)
      .push_bind(self.metadata.clone())
      .push_bind(self.created_at)
      .push_bind(self.updated_at);
  }

  fn push_patch(patch: NotificationPatch, builder: &mut Sql) {
    set(builder, "read", patch.read);
  }
}
