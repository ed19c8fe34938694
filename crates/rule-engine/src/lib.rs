//! Schema Registry and Evaluator Core for the content-evaluation engine.
//!
//! This crate owns the startup-validated [`registry::SchemaRegistry`], the
//! per-request [`cache::PerRequestCache`], the numeric aggregation rules for
//! each schema kind, and the [`evaluator::Evaluator`] that ties them together
//! with a Judge backend.

pub mod aggregator;
pub mod cache;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod shaper;

pub use context::RequestContext;
pub use error::{EngineError, EngineResult};
pub use evaluator::Evaluator;
pub use registry::{ListFilter, SchemaRegistry, SchemaSummary};
