// bazaar_server/src/state.rs
use crate::config::AppConfig;
use bazaar::{CartService, Catalog, Gatekeeper, OrderService, Repositories};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub repos: Repositories,
  pub gatekeeper: Arc<Gatekeeper>,
  pub carts: CartService,
  pub orders: OrderService,
  pub catalog: Catalog,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the access pipelines and lifecycle services over one storage backend.
  pub fn new(config: Arc<AppConfig>, repos: Repositories) -> Self {
    Self {
      gatekeeper: Arc::new(Gatekeeper::for_repositories(&repos)),
      carts: CartService::new(repos.clone()),
      orders: OrderService::new(repos.clone()),
      catalog: Catalog::new(repos.clone()),
      repos,
      config,
    }
  }
}
