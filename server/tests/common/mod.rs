// tests/common/mod.rs
#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use bazaar::model::User;
use bazaar::Repository;
use bazaar_server::{AppConfig, AppState};
use bazaar_server::storage;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Fresh state over an empty in-memory backend.
pub async fn memory_state() -> AppState {
  let config = AppConfig::in_memory();
  let repos = storage::connect(&config).await.expect("memory backend never fails");
  AppState::new(Arc::new(config), repos)
}

/// Inserts a user directly, skipping the password hashing of the register route.
pub async fn seed_user(state: &AppState, email: &str) -> User {
  state
    .repos
    .users
    .create(User::new(email, "unused-hash"))
    .await
    .expect("seeding user")
}

/// Sends `req` and returns the status plus the JSON body (`Null` when empty).
pub async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, Value)
where
  S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let resp = test::call_service(app, req).await;
  let status = resp.status();
  let body = test::read_body(resp).await;
  let json = if body.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&body).unwrap_or(Value::Null)
  };
  (status, json)
}

pub fn id_of(body: &Value) -> Uuid {
  body["id"]
    .as_str()
    .and_then(|raw| Uuid::parse_str(raw).ok())
    .unwrap_or_else(|| panic!("response has no id: {body}"))
}
