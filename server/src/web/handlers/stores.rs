// bazaar_server/src/web/handlers/stores.rs

use actix_web::{web, HttpResponse};
use bazaar::model::{ResourceKind, Store, StoreDraft, StorePatch};
use bazaar::{Method, RouteMarker};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::identity::Caller;

#[derive(Deserialize, Debug)]
pub struct StoreQuery {
  pub owner_user_id: Option<Uuid>,
}

pub async fn list_stores_handler(
  app_state: web::Data<AppState>,
  query: web::Query<StoreQuery>,
) -> Result<HttpResponse, AppError> {
  let stores = app_state.catalog.stores(query.owner_user_id).await?;
  Ok(HttpResponse::Ok().json(stores))
}

#[instrument(name = "handler::open_store", skip(app_state, caller, payload))]
pub async fn open_store_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  payload: web::Json<StoreDraft>,
) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::Store,
      caller.request(Method::Post, RouteMarker::authenticated()),
    )
    .await?;
  let owner = ctx.require_identity()?.id;
  let store = app_state.catalog.open_store(owner, payload.into_inner()).await?;
  info!(store_id = %store.id, %owner, "Store opened via API.");
  Ok(HttpResponse::Created().json(store))
}

pub async fn get_store_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::Store,
      caller.request(Method::Get, RouteMarker::public()).on(path.into_inner()),
    )
    .await?;
  Ok(HttpResponse::Ok().json(ctx.require::<Store>()?))
}

#[instrument(name = "handler::update_store", skip(app_state, caller, payload), fields(store = %path))]
pub async fn update_store_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
  payload: web::Json<StorePatch>,
) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::Store,
      caller.request(Method::Put, RouteMarker::authenticated()).on(path.into_inner()),
    )
    .await?;
  let store = ctx.require::<Store>()?;
  let updated = app_state.catalog.update_store(store, payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(updated))
}
