#![deny(missing_docs)]

//! # schemata-adapters — Library Adapters and Module Loading
//!
//! Wraps each supported schema library behind the [`Adapter`] protocol and
//! owns the machinery that loads library runtimes lazily.
//!
//! ## Built-in adapters
//!
//! In priority order, as returned by [`default_adapters`]:
//!
//! | name          | schema object                          | module       |
//! |---------------|----------------------------------------|--------------|
//! | `standard`    | [`StandardObject`](schemata_core::StandardObject) | none |
//! | `serde`       | [`TypedSchema`]                        | none         |
//! | `regex`       | `regex::Regex`                         | none         |
//! | `yaml`        | `serde_yaml::Value` mapping            | `jsonschema` |
//! | `json-schema` | `serde_json::Value` object             | `jsonschema` |
//!
//! Earlier adapters win when more than one would claim a schema.
//!
//! ## Crate Policy
//!
//! - Depends only on `schemata-core` internally.
//! - Native error shapes are translated into issues inside the adapter that
//!   owns them and nowhere else.
//! - Adapters never fall back to one another.

pub mod adapter;
pub mod json_schema;
pub mod loader;
pub mod memo;
pub mod pattern;
pub mod standard;
pub mod typed;
pub mod yaml;

use std::sync::Arc;

use schemata_core::SchemataConfig;

pub use adapter::{coerce, Adapter, BoxValidator, BuildFuture, FnValidator, Validator};
pub use json_schema::{JsonSchemaAdapter, JsonSchemaRuntime};
pub use loader::{Loader, ModuleCache, ModuleHandle, ModuleId};
pub use memo::MemoCache;
pub use pattern::RegexAdapter;
pub use standard::StandardAdapter;
pub use typed::{TypedAdapter, TypedSchema};
pub use yaml::YamlSchemaAdapter;

/// The built-in adapters in priority order.
pub fn default_adapters() -> Vec<Arc<dyn Adapter>> {
    vec![
        Arc::new(StandardAdapter),
        Arc::new(TypedAdapter),
        Arc::new(RegexAdapter),
        Arc::new(YamlSchemaAdapter),
        Arc::new(JsonSchemaAdapter),
    ]
}

/// A module cache with loaders for every module the built-in adapters use.
pub fn default_modules(config: &SchemataConfig) -> ModuleCache {
    let modules = ModuleCache::new();
    modules.register(json_schema::MODULE, json_schema::loader(config));
    modules
}
