// core/src/lib.rs

//! Async step pipelines for the BootBox storefront.
//!
//! A workflow (placing an order, creating a product, signing a manager in) is
//! a `Pipeline<TData, Err>`: an ordered list of named steps, each with
//! `before` / `on` / `after` handlers operating on shared `ContextData<TData>`.
//! Steps can be optional or conditionally skipped, and any handler can stop
//! the run early. A `FlowRegistry` holds one pipeline per context type.
//!
//! ```ignore
//! let mut p = Pipeline::<PlaceOrderCtx, AppError>::new(&[("validate", false, None), ("persist", false, None)]);
//! p.on_step("validate", |ctx| async move { /* ... */ Ok::<_, AppError>(PipelineControl::Continue) })?;
//! registry.register(p);
//! registry.run(ContextData::new(PlaceOrderCtx::default())).await?;
//! ```

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::{Handler, HandlerFuture};
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{Phase, SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::definition::Pipeline;
pub use crate::registry::FlowRegistry;
