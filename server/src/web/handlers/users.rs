// bazaar_server/src/web/handlers/users.rs

use actix_web::{web, HttpResponse};
use bazaar::access::ME;
use bazaar::model::ResourceKind;
use bazaar::{Method, Repository, RouteMarker};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::identity::Caller;

#[derive(Deserialize, Debug)]
pub struct RegisterPayload {
  pub email: String,
  pub password: String,
}

#[instrument(name = "handler::register_user", skip(app_state, payload), fields(email = %payload.email))]
pub async fn register_user_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  let user = auth_service::register(&app_state.repos, &payload.email, &payload.password).await?;
  Ok(HttpResponse::Created().json(user))
}

#[derive(Deserialize, Debug)]
pub struct SignInPayload {
  pub email: String,
  pub password: String,
}

/// Returns the id the client sends back in the `X-User-ID` header.
#[instrument(name = "handler::sign_in", skip(app_state, payload), fields(email = %payload.email))]
pub async fn sign_in_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<SignInPayload>,
) -> Result<HttpResponse, AppError> {
  let user = auth_service::sign_in(&app_state.repos, &payload.email, &payload.password).await?;
  Ok(HttpResponse::Ok().json(json!({ "user_id": user.id })))
}

#[instrument(name = "handler::current_user", skip(app_state, caller))]
pub async fn current_user_handler(app_state: web::Data<AppState>, caller: Caller) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::User,
      caller.request(Method::Get, RouteMarker::authenticated()).on(ME),
    )
    .await?;
  let identity = ctx.require_identity()?;
  let user = app_state.repos.users.get_by_id(identity.id).await?;
  Ok(HttpResponse::Ok().json(user))
}
