// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use bazaar::model::{Category, CategoryDraft, Product, ProductDraft, Store, StoreDraft, User};
use bazaar::{
  BazaarError, CartService, Catalog, Gatekeeper, Identity, OrderService, PipelineControl, Repositories, Repository,
};
use tracing::Level;

// --- Common Context Struct for pipeline tests ---
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Bazaar framework error: {0}")]
  Bazaar(String), // Store as String for Eq comparison

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<BazaarError> for TestError {
  fn from(be: BazaarError) -> Self {
    TestError::Bazaar(format!("{:?}", be))
  }
}

// --- Common Handler Creators ---
pub fn create_simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> bazaar::Handler<TestContext, TestError> {
  Box::new(move |mut ctx: TestContext| {
    Box::pin(async move {
      ctx.counter += 1;
      ctx.message.push_str(message_to_append);
      ctx.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = %step_name, "executed, counter: {}, message: '{}'", ctx.counter, ctx.message);
      if ctx.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop(ctx));
      }
      Ok(PipelineControl::Continue(ctx))
    })
  })
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> bazaar::Handler<TestContext, TestError> {
  Box::new(move |_ctx: TestContext| {
    Box::pin(async move {
      tracing::warn!(target: "test_handlers", step = %step_name, "failing with: '{}'", error_message);
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Marketplace fixture ---

/// A memory-backed marketplace with one store, one category and one product.
/// `owner` owns the store; `buyer` and `stranger` own nothing.
pub struct Market {
  pub repos: Repositories,
  pub gatekeeper: Gatekeeper,
  pub carts: CartService,
  pub orders: OrderService,
  pub catalog: Catalog,
  pub owner: Identity,
  pub buyer: Identity,
  pub stranger: Identity,
  pub store: Store,
  pub category: Category,
  pub product: Product,
}

pub async fn register_user(repos: &Repositories, email: &str) -> Identity {
  let user = repos.users.create(User::new(email, "not-a-real-hash")).await.unwrap();
  Identity {
    id: user.id,
    email: user.email,
  }
}

impl Market {
  pub async fn new() -> Self {
    let repos = Repositories::in_memory();
    let gatekeeper = Gatekeeper::for_repositories(&repos);
    let carts = CartService::new(repos.clone());
    let orders = OrderService::new(repos.clone());
    let catalog = Catalog::new(repos.clone());

    let owner = register_user(&repos, "owner@example.com").await;
    let buyer = register_user(&repos, "buyer@example.com").await;
    let stranger = register_user(&repos, "stranger@example.com").await;

    let store = catalog
      .open_store(
        owner.id,
        StoreDraft {
          name: "Corner Shop".to_string(),
        },
      )
      .await
      .unwrap();
    let category = catalog
      .create::<Category>(
        store.id,
        CategoryDraft {
          name: "Tea".to_string(),
          image_url: None,
        },
      )
      .await
      .unwrap();
    let product = catalog
      .create::<Product>(
        store.id,
        ProductDraft {
          category_id: category.id,
          title: "Green tea".to_string(),
          image_url: None,
          price_cents: 450,
        },
      )
      .await
      .unwrap();

    Self {
      repos,
      gatekeeper,
      carts,
      orders,
      catalog,
      owner,
      buyer,
      stranger,
      store,
      category,
      product,
    }
  }

  /// A second store owned by `stranger`, with one product of its own.
  pub async fn rival_store(&self) -> (Store, Product) {
    let store = self
      .catalog
      .open_store(
        self.stranger.id,
        StoreDraft {
          name: "Rival".to_string(),
        },
      )
      .await
      .unwrap();
    let category = self
      .catalog
      .create::<Category>(
        store.id,
        CategoryDraft {
          name: "Coffee".to_string(),
          image_url: None,
        },
      )
      .await
      .unwrap();
    let product = self
      .catalog
      .create::<Product>(
        store.id,
        ProductDraft {
          category_id: category.id,
          title: "Espresso".to_string(),
          image_url: None,
          price_cents: 300,
        },
      )
      .await
      .unwrap();
    (store, product)
  }
}
