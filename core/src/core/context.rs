// bazaar/src/core/context.rs

//! Defines the `Handler<T, Err>` type for pipeline step handlers.

use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every handler.
pub type HandlerFuture<T, Err> = Pin<Box<dyn Future<Output = Result<PipelineControl<T>, Err>> + Send>>;

/// Type alias for a pipeline step handler.
///
/// A handler takes ownership of the context `T`, performs its work (possibly
/// I/O), and hands the context back inside a `PipelineControl`. Because the
/// context is moved rather than shared, handlers never hold locks and the next
/// handler always observes exactly what the previous one returned.
pub type Handler<T, Err> = Box<dyn Fn(T) -> HandlerFuture<T, Err> + Send + Sync>;
