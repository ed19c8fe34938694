//! Core domain types for the content-evaluation engine.
//!
//! Defines the schema model (ordinal, checklist, binary-gate, derived), the
//! per-request evaluation result shape, the dynamic value type shared between
//! them, and the `Judge` trait that abstracts over any LLM backend.

pub mod error;
pub mod judge;
pub mod result;
pub mod schema;
pub mod value;

pub use error::*;
pub use judge::*;
pub use result::*;
pub use schema::*;
pub use value::*;
