// bazaar/src/lib.rs

//! Bazaar: ownership-gated access and the cart/order lifecycle of a multi-store
//! marketplace.
//!
//! The crate is built from two parts:
//!  - A generic, async, named-step pipeline (`Pipeline<T, Err>`) whose handlers
//!    receive the context by value and hand it back through `PipelineControl`.
//!  - The marketplace on top of it: one access pipeline per resource kind
//!    (`authenticate -> resolve -> authorize`), registered in a `Gatekeeper`,
//!    and lifecycle services for carts, orders and the store catalog.
//!
//! Storage is abstracted behind `Repository<E>` and `CartLedger`; an in-memory
//! backend ships with the crate.

pub mod access;
pub mod core;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod repository;

// --- Re-exports for the Public API ---

pub use crate::core::context::{Handler, HandlerFuture};
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::pipeline::definition::Pipeline;

pub use crate::access::{AccessContext, AccessRequest, AccessRule, Decision, Identity, Method, RouteMarker};
pub use crate::error::{BazaarError, BazaarResult, DomainViolation};
pub use crate::lifecycle::{CartLookup, CartService, Catalog, OrderService};
pub use crate::registry::Gatekeeper;
pub use crate::repository::{CartLedger, Repositories, Repository, Stored};
