// tests/api_tests.rs
//
// Routes end to end over the in-memory backend: identity extraction, access
// decisions, lifecycle rules and their HTTP status mapping.
mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use bazaar::model::Notification;
use bazaar::Repository;
use bazaar_server::configure_app_routes;
use bazaar_server::web::USER_ID_HEADER;
use common::*;
use serde_json::json;
use uuid::Uuid;

macro_rules! app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

fn get(uri: &str, caller: Option<Uuid>) -> test::TestRequest {
  with_caller(test::TestRequest::get().uri(uri), caller)
}

fn post(uri: &str, caller: Option<Uuid>, body: serde_json::Value) -> test::TestRequest {
  with_caller(test::TestRequest::post().uri(uri), caller).set_json(body)
}

fn put(uri: &str, caller: Option<Uuid>, body: serde_json::Value) -> test::TestRequest {
  with_caller(test::TestRequest::put().uri(uri), caller).set_json(body)
}

fn delete(uri: &str, caller: Option<Uuid>) -> test::TestRequest {
  with_caller(test::TestRequest::delete().uri(uri), caller)
}

fn with_caller(req: test::TestRequest, caller: Option<Uuid>) -> test::TestRequest {
  match caller {
    Some(id) => req.insert_header((USER_ID_HEADER, id.to_string())),
    None => req,
  }
}

#[actix_rt::test]
async fn health_check_reports_ok() {
  setup_tracing();
  let state = memory_state().await;
  let app = app!(state);

  let (status, body) = send(&app, get("/api/v1/health", None).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn registration_and_identity_extraction() {
  setup_tracing();
  let state = memory_state().await;
  let app = app!(state);

  let (status, user) = send(
    &app,
    post("/api/v1/users", None, json!({"email": "ann@example.com", "password": "s3cret"})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(user.get("password_hash").is_none(), "hash must never be serialized");
  let ann = id_of(&user);

  let (status, _) = send(
    &app,
    post("/api/v1/users", None, json!({"email": "ann@example.com", "password": "other"})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, me) = send(&app, get("/api/v1/users/me", Some(ann)).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["email"], "ann@example.com");

  let (status, _) = send(&app, get("/api/v1/users/me", None).to_request()).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) = send(&app, get("/api/v1/users/me", Some(Uuid::new_v4())).to_request()).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let malformed = test::TestRequest::get()
    .uri("/api/v1/users/me")
    .insert_header((USER_ID_HEADER, "not-a-uuid"))
    .to_request();
  let (status, _) = send(&app, malformed).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn only_the_store_owner_mutates_its_catalog() {
  setup_tracing();
  let state = memory_state().await;
  let owner = seed_user(&state, "owner@example.com").await.id;
  let stranger = seed_user(&state, "stranger@example.com").await.id;
  let app = app!(state);

  let (status, store) = send(&app, post("/api/v1/stores", Some(owner), json!({"name": "Corner Shop"})).to_request()).await;
  assert_eq!(status, StatusCode::CREATED);
  let store_id = id_of(&store);

  let (status, _) = send(&app, post("/api/v1/stores", None, json!({"name": "Nobody's"})).to_request()).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, category) = send(
    &app,
    post("/api/v1/categories", Some(owner), json!({"store_id": store_id, "name": "Tea"})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let category_id = id_of(&category);

  let (status, _) = send(
    &app,
    post("/api/v1/categories", Some(stranger), json!({"store_id": store_id, "name": "Coffee"})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, product) = send(
    &app,
    post(
      "/api/v1/products",
      Some(owner),
      json!({"store_id": store_id, "category_id": category_id, "title": "Green tea", "price_cents": 450}),
    )
    .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let product_uri = format!("/api/v1/products/{}", id_of(&product));

  // Reads are public, writes are the owner's.
  let (status, fetched) = send(&app, get(&product_uri, None).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched["title"], "Green tea");

  let (status, _) = send(&app, put(&product_uri, Some(stranger), json!({"price_cents": 1})).to_request()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&app, put(&product_uri, None, json!({"price_cents": 1})).to_request()).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, updated) = send(&app, put(&product_uri, Some(owner), json!({"price_cents": 500})).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["price_cents"], 500);

  let (status, listed) = send(&app, get(&format!("/api/v1/products?store_id={store_id}"), None).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().map(Vec::len), Some(1));

  let (status, _) = send(&app, delete(&product_uri, Some(stranger)).to_request()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&app, delete(&product_uri, Some(owner)).to_request()).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&app, get(&product_uri, None).to_request()).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&app, get("/api/v1/products/not-a-uuid", None).to_request()).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn catalog_references_must_stay_inside_the_store() {
  setup_tracing();
  let state = memory_state().await;
  let owner = seed_user(&state, "owner@example.com").await.id;
  let app = app!(state);

  let (_, first) = send(&app, post("/api/v1/stores", Some(owner), json!({"name": "First"})).to_request()).await;
  let (_, second) = send(&app, post("/api/v1/stores", Some(owner), json!({"name": "Second"})).to_request()).await;
  let (_, category) = send(
    &app,
    post("/api/v1/categories", Some(owner), json!({"store_id": id_of(&first), "name": "Tea"})).to_request(),
  )
  .await;

  let (status, _) = send(
    &app,
    post(
      "/api/v1/products",
      Some(owner),
      json!({"store_id": id_of(&second), "category_id": id_of(&category), "title": "Stray", "price_cents": 1}),
    )
    .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn buyer_journey_from_cart_to_order() {
  setup_tracing();
  let state = memory_state().await;
  let owner = seed_user(&state, "owner@example.com").await.id;
  let buyer = seed_user(&state, "buyer@example.com").await.id;
  let stranger = seed_user(&state, "stranger@example.com").await.id;
  let app = app!(state);

  let (_, store) = send(&app, post("/api/v1/stores", Some(owner), json!({"name": "Corner Shop"})).to_request()).await;
  let store_id = id_of(&store);
  let (_, category) = send(
    &app,
    post("/api/v1/categories", Some(owner), json!({"store_id": store_id, "name": "Tea"})).to_request(),
  )
  .await;
  let (_, product) = send(
    &app,
    post(
      "/api/v1/products",
      Some(owner),
      json!({"store_id": store_id, "category_id": id_of(&category), "title": "Sencha", "price_cents": 900}),
    )
    .to_request(),
  )
  .await;
  let product_id = id_of(&product);
  let my_cart_uri = format!("/api/v1/carts/me?store_id={store_id}");

  let (status, _) = send(&app, get(&my_cart_uri, None).to_request()).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  // get-or-create twice yields one cart
  let (status, first) = send(&app, get(&my_cart_uri, Some(buyer)).to_request()).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(first["created"], true);
  let (status, second) = send(&app, get(&my_cart_uri, Some(buyer)).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(second["created"], false);
  let cart_id = id_of(&first["cart"]);
  assert_eq!(id_of(&second["cart"]), cart_id);
  let lines_uri = format!("/api/v1/carts/{cart_id}/products");

  let (status, line) = send(
    &app,
    post(&lines_uri, Some(buyer), json!({"product_id": product_id, "quantity": 2})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(line["quantity"], 2);
  let line_uri = format!("{lines_uri}/{}", id_of(&line));

  let (status, _) = send(
    &app,
    post(&lines_uri, Some(stranger), json!({"product_id": product_id, "quantity": 1})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &app,
    post(&lines_uri, Some(buyer), json!({"product_id": product_id, "quantity": 0})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, put(&line_uri, Some(buyer), json!({"quantity": -1})).to_request()).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, updated) = send(&app, put(&line_uri, Some(buyer), json!({"quantity": 5})).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["quantity"], 5);

  let (status, _) = send(
    &app,
    put(&format!("{lines_uri}/{}", Uuid::new_v4()), Some(buyer), json!({"quantity": 1})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, view) = send(&app, get(&format!("/api/v1/carts/{cart_id}"), Some(buyer)).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["lines"].as_array().map(Vec::len), Some(1));

  let (status, _) = send(&app, get(&lines_uri, None).to_request()).await;
  assert_eq!(status, StatusCode::OK);

  // Only the cart holder can place the order.
  let (status, _) = send(&app, post("/api/v1/orders", Some(stranger), json!({"cart_id": cart_id})).to_request()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, order) = send(&app, post("/api/v1/orders", Some(buyer), json!({"cart_id": cart_id})).to_request()).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(order["status"], "pending");
  let order_uri = format!("/api/v1/orders/{}", id_of(&order));

  let (status, _) = send(&app, post("/api/v1/orders", Some(buyer), json!({"cart_id": cart_id})).to_request()).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(
    &app,
    post(&lines_uri, Some(buyer), json!({"product_id": product_id, "quantity": 1})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, get(&order_uri, Some(stranger)).to_request()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, fetched) = send(&app, get(&order_uri, Some(buyer)).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched["cart_id"], cart_id.to_string());

  let (status, orders) = send(&app, get("/api/v1/orders", Some(buyer)).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(orders.as_array().map(Vec::len), Some(1));

  // The closed cart is no longer the buyer's current cart.
  let (status, fresh) = send(&app, get(&my_cart_uri, Some(buyer)).to_request()).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_ne!(id_of(&fresh["cart"]), cart_id);
}

#[actix_rt::test]
async fn notifications_are_private_to_their_recipient() {
  setup_tracing();
  let state = memory_state().await;
  let reader = seed_user(&state, "reader@example.com").await.id;
  let stranger = seed_user(&state, "stranger@example.com").await.id;
  let notification = state
    .repos
    .notifications
    .create(Notification::new(reader, "Shipped", "Your order is on its way", json!({})))
    .await
    .expect("seeding notification");
  let app = app!(state);
  let uri = format!("/api/v1/notifications/{}", notification.id);

  let (status, listed) = send(&app, get("/api/v1/notifications", Some(reader)).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().map(Vec::len), Some(1));

  let (status, listed) = send(&app, get("/api/v1/notifications", Some(stranger)).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().map(Vec::len), Some(0));

  let (status, _) = send(&app, get(&uri, Some(stranger)).to_request()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&app, put(&format!("{uri}/read"), Some(stranger), json!({})).to_request()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, read) = send(&app, put(&format!("{uri}/read"), Some(reader), json!({})).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(read["read"], true);
}

#[actix_rt::test]
async fn sign_in_returns_the_caller_id() {
  setup_tracing();
  let state = memory_state().await;
  let app = app!(state);

  let (status, user) = send(
    &app,
    post("/api/v1/users", None, json!({"email": "cy@example.com", "password": "s3cret"})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let cy = id_of(&user);

  let (status, body) = send(
    &app,
    post("/api/v1/auth/signin", None, json!({"email": "cy@example.com", "password": "s3cret"})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["user_id"], cy.to_string());

  let (status, _) = send(
    &app,
    post("/api/v1/auth/signin", None, json!({"email": "cy@example.com", "password": "wrong"})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) = send(
    &app,
    post("/api/v1/auth/signin", None, json!({"email": "nobody@example.com", "password": "s3cret"})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn invalid_catalog_values_and_referenced_deletes_are_client_errors() {
  setup_tracing();
  let state = memory_state().await;
  let owner = seed_user(&state, "owner@example.com").await.id;
  let app = app!(state);

  let (_, store) = send(&app, post("/api/v1/stores", Some(owner), json!({"name": "Corner Shop"})).to_request()).await;
  let store_id = id_of(&store);

  let (status, body) = send(
    &app,
    post("/api/v1/coupons", Some(owner), json!({"store_id": store_id, "code": "BIG", "discount": 250})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().is_some());

  let (status, _) = send(
    &app,
    post(
      "/api/v1/shippings",
      Some(owner),
      json!({"store_id": store_id, "name": "Courier", "price_cents": 100, "delivery_days": -1}),
    )
    .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, category) = send(
    &app,
    post("/api/v1/categories", Some(owner), json!({"store_id": store_id, "name": "Tea"})).to_request(),
  )
  .await;
  let category_id = id_of(&category);
  let (status, product) = send(
    &app,
    post(
      "/api/v1/products",
      Some(owner),
      json!({"store_id": store_id, "category_id": category_id, "title": "Green tea", "price_cents": 450}),
    )
    .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let product_id = id_of(&product);

  let (status, _) = send(
    &app,
    put(&format!("/api/v1/products/{product_id}"), Some(owner), json!({"price_cents": -1})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, delete(&format!("/api/v1/categories/{category_id}"), Some(owner)).to_request()).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, delete(&format!("/api/v1/products/{product_id}"), Some(owner)).to_request()).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, delete(&format!("/api/v1/categories/{category_id}"), Some(owner)).to_request()).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}
