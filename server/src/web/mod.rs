// bazaar_server/src/web/mod.rs

pub mod handlers;
pub mod identity;
pub mod routes;

pub use identity::{Caller, USER_ID_HEADER};
pub use routes::configure_app_routes;
