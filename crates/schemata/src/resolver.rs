//! # Resolver
//!
//! Maps a schema instance to a ready validator. Adapters are asked in
//! priority order; the first that claims the schema builds its validator.
//!
//! Built validators are cached per schema instance. The cache key holds a
//! clone of the schema handle, so the instance (and its address) stays alive
//! as long as the entry does. Two structurally equal schemas built
//! separately are distinct keys.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures_util::future::{self, FutureExt};
use schemata_adapters::{coerce, Adapter, BoxValidator, MemoCache, ModuleCache};
use schemata_core::{Schema, SchemaError, SchemaId};

/// Cache key: schema identity, keeping the instance alive.
#[derive(Clone)]
struct SchemaKey {
    id: SchemaId,
    _schema: Schema,
}

impl SchemaKey {
    fn new(schema: &Schema) -> Self {
        Self {
            id: schema.id(),
            _schema: schema.clone(),
        }
    }
}

impl PartialEq for SchemaKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SchemaKey {}

impl Hash for SchemaKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Ordered adapters plus the validator and module caches.
///
/// Cloning shares the caches.
#[derive(Clone)]
pub struct Resolver {
    adapters: Arc<[Arc<dyn Adapter>]>,
    modules: ModuleCache,
    validators: MemoCache<SchemaKey, BoxValidator, SchemaError>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.adapters.iter().map(|a| a.name()).collect();
        f.debug_struct("Resolver")
            .field("adapters", &names)
            .field("modules", &self.modules)
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl Resolver {
    /// Create a resolver over `adapters`, highest priority first.
    pub fn new(adapters: Vec<Arc<dyn Adapter>>, modules: ModuleCache) -> Self {
        Self {
            adapters: adapters.into(),
            modules,
            validators: MemoCache::new(),
        }
    }

    /// The validator for `schema`, building and caching it on first use.
    ///
    /// # Errors
    ///
    /// - `SchemaError::Unrecognized` if no adapter claims the schema.
    /// - `SchemaError::LibraryUnavailable` if the owning library cannot be
    ///   loaded.
    /// - `SchemaError::Compilation` if the library rejects the schema.
    ///
    /// Failures are not cached.
    pub async fn resolve(&self, schema: &Schema) -> Result<BoxValidator, SchemaError> {
        self.validators
            .get_or_load(SchemaKey::new(schema), || {
                for adapter in self.adapters.iter() {
                    if let Some(build) = coerce(adapter, schema, &self.modules) {
                        tracing::debug!(
                            adapter = adapter.name(),
                            schema = schema.type_name(),
                            "adapter claimed schema"
                        );
                        return build;
                    }
                }
                future::ready(Err(SchemaError::Unrecognized {
                    type_name: schema.type_name(),
                }))
                .boxed()
            })
            .await
    }

    /// Name of the adapter that owns `schema`, without building anything.
    pub fn detect(&self, schema: &Schema) -> Option<&'static str> {
        self.adapters
            .iter()
            .find(|adapter| adapter.detect(schema))
            .map(|adapter| adapter.name())
    }

    /// Returns true if a validator for this schema instance is cached.
    pub fn is_resolved(&self, schema: &Schema) -> bool {
        self.validators.is_ready(&SchemaKey::new(schema))
    }

    /// The module cache shared with the adapters.
    pub fn modules(&self) -> &ModuleCache {
        &self.modules
    }

    /// Discard every cached validator and loaded module.
    pub fn clear(&self) {
        self.validators.clear();
        self.modules.clear();
        tracing::info!("schema caches cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_adapters::{default_adapters, default_modules};
    use schemata_core::SchemataConfig;
    use serde_json::json;

    fn resolver() -> Resolver {
        Resolver::new(default_adapters(), default_modules(&SchemataConfig::default()))
    }

    #[tokio::test]
    async fn validators_are_cached_per_instance() {
        let resolver = resolver();
        let schema = Schema::new(json!({"type": "string"}));
        let twin = Schema::new(json!({"type": "string"}));

        let first = resolver.resolve(&schema).await.unwrap();
        let again = resolver.resolve(&schema.clone()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let other = resolver.resolve(&twin).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[tokio::test]
    async fn unrecognized_schemas_are_not_cached() {
        let resolver = resolver();
        let schema = Schema::new(42u64);

        let err = resolver.resolve(&schema).await.err().unwrap();
        assert!(matches!(err, SchemaError::Unrecognized { type_name: "u64" }));
        assert!(!resolver.is_resolved(&schema));
        assert_eq!(resolver.detect(&schema), None);
    }

    #[tokio::test]
    async fn clear_drops_validators_and_modules() {
        let resolver = resolver();
        let schema = Schema::new(json!({"type": "string"}));
        resolver.resolve(&schema).await.unwrap();
        assert!(resolver.is_resolved(&schema));
        assert!(resolver.modules().is_loaded(schemata_adapters::json_schema::MODULE));

        resolver.clear();
        assert!(!resolver.is_resolved(&schema));
        assert!(!resolver.modules().is_loaded(schemata_adapters::json_schema::MODULE));
    }

    #[test]
    fn detect_reports_the_owner() {
        let resolver = resolver();
        assert_eq!(resolver.detect(&Schema::new(json!({"type": "string"}))), Some("json-schema"));
    }
}
