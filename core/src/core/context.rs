// core/src/core/context.rs

//! The `Handler` type every step hook is stored as.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// Boxed future produced by a handler.
pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>;

/// A step hook: receives a clone of the run's `ContextData<TData>` and
/// resolves to a control signal or the pipeline's error type.
///
/// Handlers lock the context to read their inputs, drop the guard, do their
/// I/O, then lock again to write results. A guard held across `.await` makes
/// the future `!Send` and will not compile.
pub type Handler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<Err> + Send + Sync>;
