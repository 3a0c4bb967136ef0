// bazaar_server/src/web/handlers/carts.rs

use actix_web::{web, HttpResponse};
use bazaar::access::ME;
use bazaar::model::{Cart, CartLine, CartPatch, ResourceKind};
use bazaar::{AccessContext, Method, RouteMarker};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::identity::Caller;

#[derive(Deserialize, Debug)]
pub struct CartQuery {
  pub store_id: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct AddLinePayload {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct UpdateLinePayload {
  pub quantity: i32,
}

async fn gate_cart(
  app_state: &AppState,
  caller: &Caller,
  method: Method,
  cart_id: String,
  line_id: Option<String>,
) -> Result<AccessContext, AppError> {
  // Reading a cart never needs an identity; every write does.
  let marker = if method.is_safe() {
    RouteMarker::public()
  } else {
    RouteMarker::authenticated()
  };
  let mut request = caller.request(method, marker).on(cart_id);
  if let Some(line_id) = line_id {
    request = request.nested(line_id);
  }
  Ok(app_state.gatekeeper.check(ResourceKind::Cart, request).await?)
}

/// `GET /carts/me?store_id=`: the caller's open cart for a store, opened on demand.
#[instrument(name = "handler::my_cart", skip(app_state, caller), fields(store_id = %query.store_id))]
pub async fn my_cart_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  query: web::Query<CartQuery>,
) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::Cart,
      caller.request(Method::Get, RouteMarker::authenticated()).on(ME),
    )
    .await?;
  let user_id = ctx.require_identity()?.id;

  let lookup = app_state.carts.get_or_create(user_id, query.store_id).await?;
  if lookup.created {
    info!(cart_id = %lookup.cart.id, %user_id, "Opened a cart on first visit.");
    Ok(HttpResponse::Created().json(lookup))
  } else {
    Ok(HttpResponse::Ok().json(lookup))
  }
}

pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let ctx = gate_cart(&app_state, &caller, Method::Get, path.into_inner(), None).await?;
  let cart = ctx.require::<Cart>()?;
  let lines = app_state.carts.lines(cart).await?;
  Ok(HttpResponse::Ok().json(json!({ "cart": cart, "lines": lines })))
}

/// `PUT /carts/{id}`: checkout details.
#[instrument(name = "handler::update_cart", skip(app_state, caller, payload), fields(cart = %path))]
pub async fn update_cart_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
  payload: web::Json<CartPatch>,
) -> Result<HttpResponse, AppError> {
  let ctx = gate_cart(&app_state, &caller, Method::Put, path.into_inner(), None).await?;
  let updated = app_state
    .carts
    .update_details(ctx.require::<Cart>()?, payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(updated))
}

pub async fn list_lines_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let ctx = gate_cart(&app_state, &caller, Method::Get, path.into_inner(), None).await?;
  let lines = app_state.carts.lines(ctx.require::<Cart>()?).await?;
  Ok(HttpResponse::Ok().json(lines))
}

#[instrument(
  name = "handler::add_line",
  skip(app_state, caller, payload),
  fields(cart = %path, product_id = %payload.product_id, quantity = payload.quantity)
)]
pub async fn add_line_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
  payload: web::Json<AddLinePayload>,
) -> Result<HttpResponse, AppError> {
  let ctx = gate_cart(&app_state, &caller, Method::Post, path.into_inner(), None).await?;
  let line = app_state
    .carts
    .add_line(ctx.require::<Cart>()?, payload.product_id, payload.quantity)
    .await?;
  Ok(HttpResponse::Created().json(line))
}

#[instrument(name = "handler::update_line", skip(app_state, caller, payload), fields(quantity = payload.quantity))]
pub async fn update_line_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<(String, String)>,
  payload: web::Json<UpdateLinePayload>,
) -> Result<HttpResponse, AppError> {
  let (cart_id, line_id) = path.into_inner();
  let ctx = gate_cart(&app_state, &caller, Method::Put, cart_id, Some(line_id)).await?;
  let line = app_state
    .carts
    .update_line(ctx.require::<Cart>()?, ctx.require_nested::<CartLine>()?, payload.quantity)
    .await?;
  Ok(HttpResponse::Ok().json(line))
}

#[instrument(name = "handler::delete_line", skip(app_state, caller))]
pub async fn delete_line_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
  let (cart_id, line_id) = path.into_inner();
  let ctx = gate_cart(&app_state, &caller, Method::Delete, cart_id, Some(line_id)).await?;
  app_state
    .carts
    .delete_line(ctx.require::<Cart>()?, ctx.require_nested::<CartLine>()?)
    .await?;
  Ok(HttpResponse::NoContent().finish())
}
