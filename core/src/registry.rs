// bazaar/src/registry.rs

//! Defines the `Gatekeeper`, a registry of access pipelines keyed by `ResourceKind`.

use crate::access::resolver::{self, AccessPipeline};
use crate::access::{AccessContext, AccessRequest};
use crate::error::{BazaarError, BazaarResult};
use crate::model::{
  Ad, Cart, CartLine, Category, Coupon, Notification, Order, PaymentMethod, Product, ResourceKind, Shipping, Store,
  User,
};
use crate::repository::{Repositories, Stored};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Runs the access pipeline of a resource kind for one request.
///
/// Built once at start-up and shared; `check` never mutates the registry.
#[derive(Default)]
pub struct Gatekeeper {
  pipelines: HashMap<ResourceKind, Arc<AccessPipeline>>,
}

impl Gatekeeper {
  /// Creates a new, empty registry.
  pub fn new() -> Self {
    Self {
      pipelines: HashMap::new(),
    }
  }

  /// A registry with the standard pipeline for every resource kind. Cart
  /// pipelines also resolve a nested cart line.
  pub fn for_repositories(repos: &Repositories) -> Self {
    let mut gatekeeper = Self::new();
    gatekeeper.register_standard::<User>(repos);
    gatekeeper.register_standard::<Store>(repos);
    gatekeeper.register_standard::<Category>(repos);
    gatekeeper.register_standard::<Product>(repos);
    gatekeeper.register_standard::<Ad>(repos);
    gatekeeper.register_standard::<Coupon>(repos);
    gatekeeper.register_standard::<Shipping>(repos);
    gatekeeper.register_standard::<PaymentMethod>(repos);
    gatekeeper.register_standard::<CartLine>(repos);
    gatekeeper.register_standard::<Order>(repos);
    gatekeeper.register_standard::<Notification>(repos);

    let mut carts = resolver::access_pipeline::<Cart>(repos);
    resolver::bind_nested::<CartLine>(&mut carts, repos);
    gatekeeper.register(ResourceKind::Cart, carts);

    gatekeeper
  }

  fn register_standard<E: Stored>(&mut self, repos: &Repositories) {
    self.register(E::KIND, resolver::access_pipeline::<E>(repos));
  }

  /// Registers (or replaces) the pipeline for `kind`.
  pub fn register(&mut self, kind: ResourceKind, pipeline: AccessPipeline) {
    event!(Level::DEBUG, %kind, "Registering access pipeline.");
    self.pipelines.insert(kind, Arc::new(pipeline));
  }

  pub fn is_registered(&self, kind: ResourceKind) -> bool {
    self.pipelines.contains_key(&kind)
  }

  /// Runs the pipeline registered for `kind` and returns the gathered facts.
  ///
  /// A handler may stop the pipeline early, but only after the authorize step
  /// has passed. A run that ends unauthorized is refused as a configuration
  /// error.
  #[instrument(
        name = "Gatekeeper::check",
        skip(self, request),
        fields(method = %request.method, id = ?request.id),
        err(Display)
    )]
  pub async fn check(&self, kind: ResourceKind, request: AccessRequest) -> BazaarResult<AccessContext> {
    let pipeline = self.pipelines.get(&kind).cloned().ok_or_else(|| {
      event!(Level::ERROR, %kind, "No access pipeline registered.");
      BazaarError::Configuration {
        step_name: "Gatekeeper::check".to_string(),
        message: format!("No access pipeline registered for {}", kind),
      }
    })?;

    let ctx = pipeline.run(AccessContext::new(request)).await?.into_inner();
    if !ctx.authorized {
      event!(Level::ERROR, %kind, "Access pipeline ended before authorization.");
      return Err(BazaarError::Configuration {
        step_name: "Gatekeeper::check".to_string(),
        message: format!("Access pipeline for {} ended before authorization", kind),
      });
    }
    Ok(ctx)
  }
}
