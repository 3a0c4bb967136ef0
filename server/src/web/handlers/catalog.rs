// bazaar_server/src/web/handlers/catalog.rs

//! One set of handlers for every store-scoped catalog kind.
//!
//! The routes are instantiated per entity type in `routes.rs`, e.g.
//! `get_entity_handler::<Product>`. Writes are gated twice over the same rule:
//! creation is checked against the parent store, updates and deletes against
//! the entity itself (which resolves to the same store owner).

use actix_web::{web, HttpResponse};
use bazaar::model::{Entity, ResourceKind, StoreScoped};
use bazaar::{Method, RouteMarker, Stored};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{event, Level};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::identity::Caller;

#[derive(Deserialize, Debug)]
pub struct StoreQuery {
  pub store_id: Option<Uuid>,
}

/// Creation body: the parent store plus the kind-specific fields.
#[derive(Deserialize, Debug)]
pub struct CreatePayload<D> {
  pub store_id: Uuid,
  #[serde(flatten)]
  pub draft: D,
}

pub async fn list_entities_handler<E>(
  app_state: web::Data<AppState>,
  query: web::Query<StoreQuery>,
) -> Result<HttpResponse, AppError>
where
  E: StoreScoped + Stored + Serialize,
{
  let items = app_state.catalog.list::<E>(query.store_id).await?;
  Ok(HttpResponse::Ok().json(items))
}

pub async fn create_entity_handler<E>(
  app_state: web::Data<AppState>,
  caller: Caller,
  payload: web::Json<CreatePayload<E::Draft>>,
) -> Result<HttpResponse, AppError>
where
  E: StoreScoped + Stored + Serialize,
  E::Draft: DeserializeOwned,
{
  let CreatePayload { store_id, draft } = payload.into_inner();
  app_state
    .gatekeeper
    .check(
      ResourceKind::Store,
      caller
        .request(Method::Post, RouteMarker::authenticated())
        .on(store_id.to_string()),
    )
    .await?;

  let created = app_state.catalog.create::<E>(store_id, draft).await?;
  event!(Level::INFO, kind = %E::KIND, id = %created.id(), %store_id, "Catalog entity created via API.");
  Ok(HttpResponse::Created().json(created))
}

pub async fn get_entity_handler<E>(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError>
where
  E: StoreScoped + Stored + Serialize,
{
  let ctx = app_state
    .gatekeeper
    .check(
      E::KIND,
      caller.request(Method::Get, RouteMarker::public()).on(path.into_inner()),
    )
    .await?;
  Ok(HttpResponse::Ok().json(ctx.require::<E>()?))
}

pub async fn update_entity_handler<E>(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
  payload: web::Json<E::Patch>,
) -> Result<HttpResponse, AppError>
where
  E: StoreScoped + Stored + Serialize,
  E::Patch: DeserializeOwned,
{
  let ctx = app_state
    .gatekeeper
    .check(
      E::KIND,
      caller.request(Method::Put, RouteMarker::authenticated()).on(path.into_inner()),
    )
    .await?;
  let entity = ctx.require::<E>()?;
  let updated = app_state.catalog.update(entity, payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_entity_handler<E>(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError>
where
  E: StoreScoped + Stored + Serialize,
{
  let ctx = app_state
    .gatekeeper
    .check(
      E::KIND,
      caller
        .request(Method::Delete, RouteMarker::authenticated())
        .on(path.into_inner()),
    )
    .await?;
  app_state.catalog.delete(ctx.require::<E>()?).await?;
  Ok(HttpResponse::NoContent().finish())
}

/// The five catalog routes for one kind, mounted under `path`.
pub fn catalog_scope<E>(path: &str) -> actix_web::Scope
where
  E: StoreScoped + Stored + Serialize,
  E::Draft: DeserializeOwned,
  E::Patch: DeserializeOwned,
{
  web::scope(path)
    .route("", web::get().to(list_entities_handler::<E>))
    .route("", web::post().to(create_entity_handler::<E>))
    .route("/{id}", web::get().to(get_entity_handler::<E>))
    .route("/{id}", web::put().to(update_entity_handler::<E>))
    .route("/{id}", web::delete().to(delete_entity_handler::<E>))
}
