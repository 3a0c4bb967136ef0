// bazaar_server/src/web/routes.rs

use actix_web::web;
use bazaar::model::{Ad, Category, Coupon, PaymentMethod, Product, Shipping};

use crate::web::handlers::catalog::catalog_scope;
use crate::web::handlers::{carts, notifications, orders, stores, users};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .route("/auth/signin", web::post().to(users::sign_in_handler))
      .service(
        web::scope("/users")
          .route("", web::post().to(users::register_user_handler))
          .route("/me", web::get().to(users::current_user_handler)),
      )
      .service(
        web::scope("/stores")
          .route("", web::get().to(stores::list_stores_handler))
          .route("", web::post().to(stores::open_store_handler))
          .route("/{id}", web::get().to(stores::get_store_handler))
          .route("/{id}", web::put().to(stores::update_store_handler)),
      )
      .service(catalog_scope::<Category>("/categories"))
      .service(catalog_scope::<Product>("/products"))
      .service(catalog_scope::<Ad>("/ads"))
      .service(catalog_scope::<Coupon>("/coupons"))
      .service(catalog_scope::<Shipping>("/shippings"))
      .service(catalog_scope::<PaymentMethod>("/payment_methods"))
      // `/me` is registered ahead of `/{id}` so it is never taken for an id.
      .service(
        web::scope("/carts")
          .route("/me", web::get().to(carts::my_cart_handler))
          .route("/{id}", web::get().to(carts::get_cart_handler))
          .route("/{id}", web::put().to(carts::update_cart_handler))
          .route("/{id}/products", web::get().to(carts::list_lines_handler))
          .route("/{id}/products", web::post().to(carts::add_line_handler))
          .route("/{id}/products/{line_id}", web::put().to(carts::update_line_handler))
          .route("/{id}/products/{line_id}", web::delete().to(carts::delete_line_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(orders::list_orders_handler))
          .route("", web::post().to(orders::place_order_handler))
          .route("/{id}", web::get().to(orders::get_order_handler)),
      )
      .service(
        web::scope("/notifications")
          .route("", web::get().to(notifications::list_notifications_handler))
          .route("/{id}", web::get().to(notifications::get_notification_handler))
          .route("/{id}/read", web::put().to(notifications::mark_read_handler)),
      ),
  );
}
