#![deny(missing_docs)]

//! # schemata — One Validation Call for Many Schema Libraries
//!
//! Validate data against a schema without knowing which library produced
//! it. The owning library is detected from the schema object itself, its
//! runtime is loaded on first use, and the compiled validator is cached per
//! schema instance.
//!
//! ```ignore
//! let schema = schemata::Schema::new(serde_json::json!({"type": "string"}));
//!
//! let result = schemata::validate(&schema, serde_json::json!("123")).await?;
//! assert!(result.is_success());
//!
//! let value = schemata::assert(&schema, serde_json::json!("123")).await?;
//! ```
//!
//! ## Entry points
//!
//! - [`validate`] returns a [`ValidationResult`]; data that does not conform
//!   is a result, not an error.
//! - [`assert`] returns the validated value or [`Error::Validation`] carrying
//!   every issue.
//! - [`clear_cache`] drops every cached validator and loaded module.
//!
//! The free functions share one process-wide [`Registry`], configured from
//! the environment (see [`SchemataConfig::from_env`]) on first use. Build a
//! [`Registry`] directly for isolated caches or custom adapters.

pub mod registry;
pub mod resolver;

use std::sync::OnceLock;

use serde_json::Value;

pub use registry::{Registry, RegistryBuilder};
pub use resolver::Resolver;
pub use schemata_adapters::{
    coerce, Adapter, BoxValidator, FnValidator, Loader, ModuleCache, ModuleHandle, ModuleId,
    TypedSchema, Validator,
};
pub use schemata_core::{
    ConfigError, Draft, Error, Issue, LoadError, PathSegment, Schema, SchemaError, SchemaId,
    SchemataConfig, StandardSchema, ValidationError, ValidationResult,
};

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry, created on first use.
///
/// An invalid environment configuration is logged and replaced by the
/// defaults.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(|| {
        let config = SchemataConfig::from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "invalid schemata configuration, using defaults");
            SchemataConfig::default()
        });
        Registry::with_config(&config)
    })
}

/// Validate `data` against `schema` with the process-wide registry.
///
/// # Errors
///
/// See [`Registry::validate`].
pub async fn validate(schema: &Schema, data: Value) -> Result<ValidationResult, SchemaError> {
    global().validate(schema, data).await
}

/// Validate `data` against `schema` with the process-wide registry,
/// returning the validated value.
///
/// # Errors
///
/// See [`Registry::assert`].
pub async fn assert(schema: &Schema, data: Value) -> Result<Value, Error> {
    global().assert(schema, data).await
}

/// Clear the process-wide validator and module caches.
pub fn clear_cache() {
    global().clear_cache();
}
