// bazaar/src/lifecycle/mod.rs

//! Business operations that run after access has been granted.
//!
//! Each service re-reads whatever state its preconditions depend on instead of
//! trusting the copy the access pipeline resolved.

pub mod cart;
pub mod catalog;
pub mod order;

pub use cart::{CartLookup, CartService};
pub use catalog::Catalog;
pub use order::OrderService;

use crate::error::{BazaarError, BazaarResult, DomainViolation};
use crate::model::{ResourceKind, StoreScoped};
use crate::repository::Repositories;
use uuid::Uuid;

async fn store_of<E: StoreScoped + crate::repository::Stored>(repos: &Repositories, id: Uuid) -> BazaarResult<Uuid> {
  Ok(repos.of::<E>().get_by_id(id).await?.store_id())
}

/// Fails with `NotFound` unless the catalog entity `(kind, id)` exists and
/// belongs to `store_id`. A reference into another store is reported exactly
/// like a missing one.
pub(crate) async fn ensure_in_store(
  repos: &Repositories,
  store_id: Uuid,
  kind: ResourceKind,
  id: Uuid,
) -> BazaarResult<()> {
  use crate::model::{Ad, Category, Coupon, PaymentMethod, Product, Shipping};

  let owner_store = match kind {
    ResourceKind::Category => store_of::<Category>(repos, id).await?,
    ResourceKind::Product => store_of::<Product>(repos, id).await?,
    ResourceKind::Ad => store_of::<Ad>(repos, id).await?,
    ResourceKind::Coupon => store_of::<Coupon>(repos, id).await?,
    ResourceKind::Shipping => store_of::<Shipping>(repos, id).await?,
    ResourceKind::PaymentMethod => store_of::<PaymentMethod>(repos, id).await?,
    other => {
      return Err(BazaarError::Internal(format!("{other} is not a catalog entity")));
    }
  };

  if owner_store != store_id {
    return Err(BazaarError::not_found(kind, id));
  }
  Ok(())
}

async fn any_match<E: crate::repository::Stored>(repos: &Repositories, filter: E::Filter) -> BazaarResult<bool> {
  Ok(!repos.of::<E>().find(&filter).await?.is_empty())
}

/// Fails with `StillReferenced` while another entity points at `(kind, id)`.
/// Closed carts count too: their lines are the contents of placed orders.
pub(crate) async fn ensure_unreferenced(repos: &Repositories, kind: ResourceKind, id: Uuid) -> BazaarResult<()> {
  use crate::model::{Ad, AdFilter, Cart, CartFilter, CartLine, CartLineFilter, Product, ProductFilter};

  let referenced = match kind {
    ResourceKind::Category => {
      any_match::<Product>(
        repos,
        ProductFilter {
          category_id: Some(id),
          ..Default::default()
        },
      )
      .await?
    }
    ResourceKind::Product => {
      any_match::<CartLine>(
        repos,
        CartLineFilter {
          product_id: Some(id),
          ..Default::default()
        },
      )
      .await?
        || any_match::<Ad>(
          repos,
          AdFilter {
            product_id: Some(id),
            ..Default::default()
          },
        )
        .await?
    }
    ResourceKind::Coupon => {
      any_match::<Cart>(
        repos,
        CartFilter {
          coupon_id: Some(id),
          ..Default::default()
        },
      )
      .await?
    }
    ResourceKind::Shipping => {
      any_match::<Cart>(
        repos,
        CartFilter {
          shipping_id: Some(id),
          ..Default::default()
        },
      )
      .await?
    }
    ResourceKind::PaymentMethod => {
      any_match::<Cart>(
        repos,
        CartFilter {
          payment_method_id: Some(id),
          ..Default::default()
        },
      )
      .await?
    }
    _ => false,
  };

  if referenced {
    return Err(DomainViolation::StillReferenced(kind).into());
  }
  Ok(())
}
