// bazaar_server/src/lib.rs

//! HTTP front end for the `bazaar` marketplace core.
//!
//! Establishes the caller's identity, translates routes into access requests,
//! hands the resulting context to the lifecycle services and maps
//! `BazaarError` onto HTTP statuses. Persistence is either PostgreSQL or the
//! core's in-memory backend.

pub mod config;
pub mod errors;
pub mod services;
pub mod state;
pub mod storage;
pub mod web;

pub use config::{AppConfig, StorageBackend};
pub use errors::AppError;
pub use state::AppState;
pub use web::configure_app_routes;
