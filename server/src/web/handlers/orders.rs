// bazaar_server/src/web/handlers/orders.rs

use actix_web::{web, HttpResponse};
use bazaar::model::{Cart, Order, ResourceKind};
use bazaar::{Method, RouteMarker};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::identity::Caller;

#[derive(Deserialize, Debug)]
pub struct PlaceOrderPayload {
  pub cart_id: Uuid,
}

/// Orders placed from any of the caller's carts.
pub async fn list_orders_handler(app_state: web::Data<AppState>, caller: Caller) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::Order,
      caller.request(Method::Get, RouteMarker::authenticated()),
    )
    .await?;
  let orders = app_state.orders.list_for_holder(ctx.require_identity()?.id).await?;
  Ok(HttpResponse::Ok().json(orders))
}

pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::Order,
      caller.request(Method::Get, RouteMarker::owner_only()).on(path.into_inner()),
    )
    .await?;
  Ok(HttpResponse::Ok().json(ctx.require::<Order>()?))
}

/// `POST /orders`: promotes one of the caller's open carts into a pending order.
#[instrument(name = "handler::place_order", skip(app_state, caller), fields(cart_id = %payload.cart_id))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  payload: web::Json<PlaceOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::Cart,
      caller
        .request(Method::Post, RouteMarker::owner_only())
        .on(payload.cart_id.to_string()),
    )
    .await?;
  let cart = ctx.require::<Cart>()?;
  let order = app_state.orders.create_from_cart(cart.id).await?;
  info!(order_id = %order.id, cart_id = %cart.id, "Order placed via API.");
  Ok(HttpResponse::Created().json(order))
}
