// bazaar_server/src/web/handlers/notifications.rs

use actix_web::{web, HttpResponse};
use bazaar::model::{Notification, NotificationFilter, NotificationPatch, ResourceKind};
use bazaar::{Method, Repository, RouteMarker};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::identity::Caller;

pub async fn list_notifications_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::Notification,
      caller.request(Method::Get, RouteMarker::authenticated()),
    )
    .await?;
  let filter = NotificationFilter {
    user_id: Some(ctx.require_identity()?.id),
    ..Default::default()
  };
  let notifications = app_state.repos.notifications.find(&filter).await?;
  Ok(HttpResponse::Ok().json(notifications))
}

pub async fn get_notification_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::Notification,
      caller.request(Method::Get, RouteMarker::owner_only()).on(path.into_inner()),
    )
    .await?;
  Ok(HttpResponse::Ok().json(ctx.require::<Notification>()?))
}

pub async fn mark_read_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let ctx = app_state
    .gatekeeper
    .check(
      ResourceKind::Notification,
      caller.request(Method::Put, RouteMarker::owner_only()).on(path.into_inner()),
    )
    .await?;
  let notification = ctx.require::<Notification>()?;
  let updated = app_state
    .repos
    .notifications
    .update(notification, NotificationPatch { read: Some(true) })
    .await?;
  Ok(HttpResponse::Ok().json(updated))
}
