//! Caching of modules and validators: single loads, identity keys, failure
//! handling and explicit resets.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use schemata::{
    Adapter, BoxValidator, FnValidator, LoadError, ModuleCache, ModuleHandle, Registry,
    RegistryBuilder, Schema, SchemaError, SchemataConfig, ValidationResult,
};
use schemata_adapters::json_schema::MODULE;
use schemata_adapters::JsonSchemaRuntime;
use serde_json::{json, Value};

/// Loader for the JSON Schema runtime that counts invocations and can be
/// switched off to simulate a missing library.
#[derive(Clone, Default)]
struct SwitchableLoader {
    calls: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl SwitchableLoader {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn registry(&self) -> Registry {
        let loader = self.clone();
        RegistryBuilder::with_defaults(&SchemataConfig::default())
            .loader_fn(MODULE, move || {
                let loader = loader.clone();
                async move {
                    loader.calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    if loader.unavailable.load(Ordering::SeqCst) {
                        return Err(LoadError::Init {
                            module: MODULE.to_string(),
                            reason: "Cannot find module 'jsonschema'".into(),
                        });
                    }
                    JsonSchemaRuntime::load(&SchemataConfig::default())
                        .await
                        .map(|runtime| Arc::new(runtime) as ModuleHandle)
                }
            })
            .build()
    }
}

#[tokio::test]
async fn module_loads_once_and_cached_validators_survive_an_unavailable_library() {
    let loader = SwitchableLoader::default();
    let registry = loader.registry();
    let schema = Schema::new(json!({"type": "string"}));

    let first = registry.validate(&schema, json!("123")).await.unwrap();
    let second = registry.validate(&schema, json!("123")).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(loader.calls(), 1);

    let twin = Schema::new(json!({"type": "string"}));
    assert!(registry.validate(&twin, json!("123")).await.unwrap().is_success());
    assert_eq!(loader.calls(), 1, "a structurally equal schema reuses the loaded module");

    loader.set_available(false);
    assert!(registry.validate(&schema, json!("123")).await.unwrap().is_success());
    assert!(registry.validate(&twin, json!(1)).await.is_ok());
    assert_eq!(loader.calls(), 1);

    registry.clear_cache();
    let err = registry.validate(&schema, json!("123")).await.err().unwrap();
    assert!(matches!(err, SchemaError::LibraryUnavailable(LoadError::Init { .. })), "{err}");
    assert_eq!(loader.calls(), 2);

    loader.set_available(true);
    assert!(registry.validate(&schema, json!("123")).await.unwrap().is_success());
    assert_eq!(loader.calls(), 3, "a failed load is retried on the next call");
}

#[tokio::test]
async fn concurrent_first_use_loads_the_module_once() {
    let loader = SwitchableLoader::default();
    let registry = loader.registry();
    let a = Schema::new(json!({"type": "string"}));
    let b = Schema::new(json!({"type": "number"}));

    let (ra, rb, ra2) = tokio::join!(
        registry.validate(&a, json!("x")),
        registry.validate(&b, json!(1)),
        registry.validate(&a, json!(2)),
    );
    assert!(ra.unwrap().is_success());
    assert!(rb.unwrap().is_success());
    assert!(!ra2.unwrap().is_success());
    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn concurrent_waiters_share_a_failed_load() {
    let loader = SwitchableLoader::default();
    loader.set_available(false);
    let registry = loader.registry();
    let schema = Schema::new(json!({"type": "string"}));

    let (x, y) = tokio::join!(
        registry.validate(&schema, json!("a")),
        registry.validate(&schema, json!("b")),
    );
    assert_eq!(x.err(), y.err());
    assert_eq!(loader.calls(), 1);
    assert!(!registry.modules().is_loaded(MODULE));
}

/// Adapter claiming `u8` schemas, counting how many validators it builds.
struct Counting {
    name: &'static str,
    builds: Arc<AtomicUsize>,
    fail_first: bool,
}

impl Counting {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            builds: Arc::new(AtomicUsize::new(0)),
            fail_first: false,
        }
    }
}

#[async_trait]
impl Adapter for Counting {
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect(&self, schema: &Schema) -> bool {
        schema.is::<u8>()
    }

    async fn build_validator(
        &self,
        _schema: &Schema,
        _modules: &ModuleCache,
    ) -> Result<BoxValidator, SchemaError> {
        let attempt = self.builds.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        if self.fail_first && attempt == 0 {
            return Err(SchemaError::Compilation {
                adapter: self.name,
                reason: "first build fails".into(),
            });
        }
        let name = self.name;
        Ok(Arc::new(FnValidator::new(move |_data: Value| {
            ValidationResult::success(json!(name))
        })))
    }
}

#[tokio::test]
async fn concurrent_first_use_builds_one_validator() {
    let adapter = Counting::new("counting");
    let builds = Arc::clone(&adapter.builds);
    let registry = Registry::builder().adapter(adapter).build();
    let schema = Schema::new(7u8);

    let (a, b, c) = tokio::join!(
        registry.resolve(&schema),
        registry.resolve(&schema),
        registry.resolve(&schema),
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert!(Arc::ptr_eq(&a, &b) && Arc::ptr_eq(&b, &c));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_builds_are_not_cached() {
    let adapter = Counting {
        fail_first: true,
        ..Counting::new("flaky")
    };
    let builds = Arc::clone(&adapter.builds);
    let registry = Registry::builder().adapter(adapter).build();
    let schema = Schema::new(7u8);

    let err = registry.validate(&schema, json!(null)).await.err().unwrap();
    assert!(matches!(err, SchemaError::Compilation { adapter: "flaky", .. }));

    let ok = registry.validate(&schema, json!(null)).await.unwrap();
    assert_eq!(ok, ValidationResult::success(json!("flaky")));
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn earlier_adapters_win_ties() {
    let registry = Registry::builder()
        .adapter(Counting::new("first"))
        .adapter(Counting::new("second"))
        .build();
    let schema = Schema::new(1u8);

    for _ in 0..3 {
        assert_eq!(registry.detect(&schema), Some("first"));
        let result = registry.validate(&schema, json!(0)).await.unwrap();
        assert_eq!(result.data(), Some(&json!("first")));
    }
}

#[tokio::test]
async fn registries_do_not_share_caches() {
    let loader = SwitchableLoader::default();
    let one = loader.registry();
    let two = loader.registry();
    let schema = Schema::new(json!({"type": "string"}));

    one.validate(&schema, json!("a")).await.unwrap();
    two.validate(&schema, json!("a")).await.unwrap();
    assert_eq!(loader.calls(), 2);

    one.clear_cache();
    assert!(!one.modules().is_loaded(MODULE));
    assert!(two.modules().is_loaded(MODULE));
}
