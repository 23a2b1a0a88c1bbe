//! # Registry
//!
//! The validate/assert entry points over one [`Resolver`]. Most callers use
//! the process-wide registry through the crate's free functions; a
//! [`Registry`] of their own isolates caches and allows custom adapters or
//! loaders.

use std::future::Future;
use std::sync::Arc;

use schemata_adapters::{
    default_adapters, default_modules, Adapter, BoxValidator, Loader, ModuleCache, ModuleHandle,
    ModuleId,
};
use schemata_core::{Error, LoadError, Schema, SchemaError, SchemataConfig, ValidationResult};
use serde_json::Value;

use crate::resolver::Resolver;

/// Validation entry point with its own caches.
///
/// Cloning shares the caches.
#[derive(Debug, Clone)]
pub struct Registry {
    resolver: Resolver,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry with the built-in adapters and default configuration.
    pub fn new() -> Self {
        Self::with_config(&SchemataConfig::default())
    }

    /// A registry with the built-in adapters configured by `config`.
    pub fn with_config(config: &SchemataConfig) -> Self {
        RegistryBuilder::with_defaults(config).build()
    }

    /// An empty builder: no adapters, no loaders.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The cached validator for `schema`.
    ///
    /// Useful when validating many values against one schema.
    pub async fn resolve(&self, schema: &Schema) -> Result<BoxValidator, SchemaError> {
        self.resolver.resolve(schema).await
    }

    /// Name of the adapter that owns `schema`, if any.
    pub fn detect(&self, schema: &Schema) -> Option<&'static str> {
        self.resolver.detect(schema)
    }

    /// Validate `data` against `schema`.
    ///
    /// Data that does not conform is reported in the returned
    /// [`ValidationResult`], never as an error.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when the schema is unrecognized, its library
    /// cannot be loaded, or the library rejects it.
    pub async fn validate(&self, schema: &Schema, data: Value) -> Result<ValidationResult, SchemaError> {
        let validator = self.resolver.resolve(schema).await?;
        Ok(validator.validate(data).await)
    }

    /// Validate `data` against `schema`, returning the validated value.
    ///
    /// # Errors
    ///
    /// `Error::Validation` carrying every issue when the data does not
    /// conform; `Error::Schema` for the failures of [`Registry::validate`].
    pub async fn assert(&self, schema: &Schema, data: Value) -> Result<Value, Error> {
        let result = self.validate(schema, data).await?;
        result.into_result().map_err(Error::from)
    }

    /// Returns true if a validator for this schema instance is cached.
    pub fn is_resolved(&self, schema: &Schema) -> bool {
        self.resolver.is_resolved(schema)
    }

    /// Discard every cached validator and loaded module.
    pub fn clear_cache(&self) {
        self.resolver.clear();
    }

    /// The module cache, for inspecting or replacing loaders.
    pub fn modules(&self) -> &ModuleCache {
        self.resolver.modules()
    }
}

/// Assembles a [`Registry`] from adapters and module loaders.
#[derive(Default)]
pub struct RegistryBuilder {
    adapters: Vec<Arc<dyn Adapter>>,
    modules: ModuleCache,
}

impl RegistryBuilder {
    /// No adapters, no loaders.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in adapters and their loaders, configured by `config`.
    pub fn with_defaults(config: &SchemataConfig) -> Self {
        Self {
            adapters: default_adapters(),
            modules: default_modules(config),
        }
    }

    /// Append `adapter` at the lowest priority so far.
    pub fn adapter<A: Adapter + 'static>(mut self, adapter: A) -> Self {
        self.adapters.push(Arc::new(adapter));
        self
    }

    /// Insert `adapter` ahead of every adapter added so far.
    pub fn adapter_first<A: Adapter + 'static>(mut self, adapter: A) -> Self {
        self.adapters.insert(0, Arc::new(adapter));
        self
    }

    /// Install or replace the loader for `id`.
    pub fn loader(self, id: ModuleId, loader: Loader) -> Self {
        self.modules.register(id, loader);
        self
    }

    /// Install or replace the loader for `id` from an async closure.
    pub fn loader_fn<F, Fut>(self, id: ModuleId, load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ModuleHandle, LoadError>> + Send + 'static,
    {
        self.modules.register_fn(id, load);
        self
    }

    /// Finish the registry.
    pub fn build(self) -> Registry {
        Registry {
            resolver: Resolver::new(self.adapters, self.modules),
        }
    }
}
