// bazaar/examples/access_walkthrough.rs

use bazaar::model::{Category, CategoryDraft, ResourceKind, StoreDraft, User};
use bazaar::{
  AccessRequest, BazaarError, CartService, Catalog, Gatekeeper, Identity, Method, OrderService, Repositories,
  Repository, RouteMarker,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), BazaarError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Access Walkthrough ---");

  // 1. Storage and the registry of access pipelines
  let repos = Repositories::in_memory();
  let gatekeeper = Gatekeeper::for_repositories(&repos);
  let catalog = Catalog::new(repos.clone());
  let carts = CartService::new(repos.clone());
  let orders = OrderService::new(repos.clone());

  // 2. An owner with a store, and a visitor
  let owner = repos.users.create(User::new("owner@example.com", "hash")).await?;
  let visitor = repos.users.create(User::new("visitor@example.com", "hash")).await?;
  let as_identity = |u: &User| Identity {
    id: u.id,
    email: u.email.clone(),
  };

  let store = catalog
    .open_store(owner.id, StoreDraft { name: "Tea House".to_string() })
    .await?;
  let category = catalog
    .create::<Category>(
      store.id,
      CategoryDraft {
        name: "Green".to_string(),
        image_url: None,
      },
    )
    .await?;

  // 3. Anyone reads, only the owner writes
  let read = AccessRequest::new(Method::Get).on(category.id.to_string());
  gatekeeper.check(ResourceKind::Category, read).await?;
  info!("Anonymous read allowed.");

  let edit = AccessRequest::new(Method::Put)
    .by(Some(as_identity(&visitor)))
    .on(category.id.to_string())
    .marked(RouteMarker::authenticated());
  match gatekeeper.check(ResourceKind::Category, edit).await {
    Err(e @ BazaarError::Forbidden { .. }) => warn!("Visitor edit rejected: {}", e),
    other => info!("Unexpected outcome: {:?}", other.map(|ctx| ctx.is_owner)),
  }

  // 4. A cart becomes an order and closes
  let lookup = carts.get_or_create(visitor.id, store.id).await?;
  info!(created = lookup.created, "Cart ready.");
  let order = orders.create_from_cart(lookup.cart.id).await?;
  info!(status = %order.status, "Order placed.");

  if let Err(e) = carts.create(visitor.id, store.id).await {
    info!("Unexpected: {}", e);
  } else {
    info!("A fresh cart opened after the previous one closed.");
  }

  Ok(())
}
