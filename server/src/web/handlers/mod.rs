// bazaar_server/src/web/handlers/mod.rs

pub mod carts;
pub mod catalog;
pub mod notifications;
pub mod orders;
pub mod stores;
pub mod users;
