#![deny(missing_docs)]

//! # schemata-core — Foundational Types for schemata
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies — only `serde`, `serde_json`, `thiserror` and
//! `async-trait` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Schemas are opaque.** A [`Schema`] wraps whatever object a schema
//!    library produced. The core never builds or mutates it; adapters only
//!    inspect its type and shape to decide ownership.
//!
//! 2. **One issue model.** Every library's native error representation is
//!    translated into [`Issue`]s at the adapter boundary. Nothing past that
//!    boundary knows which library produced an issue.
//!
//! 3. **One result shape.** [`ValidationResult`] is either `{"data": …}` or
//!    `{"issues": […]}` for every adapter.
//!
//! 4. **Data failures are not errors.** Invalid input data is an expected
//!    outcome carried in [`ValidationResult::Failure`]. [`SchemaError`] is
//!    reserved for system failures: unrecognized schemas, unavailable
//!    libraries, malformed schemas.

pub mod config;
pub mod error;
pub mod issue;
pub mod schema;
pub mod standard;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{ConfigError, Draft, SchemataConfig};
pub use error::{Error, LoadError, SchemaError, ValidationError};
pub use issue::{json_type_name, Issue, PathSegment, ValidationResult};
pub use schema::{Schema, SchemaId};
pub use standard::{StandardObject, StandardSchema};
