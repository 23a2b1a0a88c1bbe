//! The process-wide free functions.

use schemata::{Error, Schema, ValidationResult};
use serde_json::json;

#[tokio::test]
async fn free_functions_use_one_shared_registry() {
    assert!(std::ptr::eq(schemata::global(), schemata::global()));

    let schema = Schema::new(json!({"type": "string", "minLength": 2}));
    let ok = schemata::validate(&schema, json!("ok")).await.unwrap();
    assert_eq!(ok, ValidationResult::success(json!("ok")));

    assert!(schemata::global().resolve(&schema).await.is_ok());
    assert_eq!(schemata::global().detect(&schema), Some("json-schema"));
}

#[tokio::test]
async fn assert_reports_every_issue() {
    let schema = Schema::new(json!({"type": "array", "items": {"type": "integer"}}));

    assert_eq!(schemata::assert(&schema, json!([1, 2])).await.unwrap(), json!([1, 2]));
    match schemata::assert(&schema, json!(["a", 2, "c"])).await {
        Err(Error::Validation(e)) => assert_eq!(e.issues().len(), 2),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn clear_cache_forces_a_reload() {
    let schema = Schema::new(json!({"enum": ["a", "b"]}));
    assert!(schemata::validate(&schema, json!("a")).await.unwrap().is_success());
    assert!(schemata::global().is_resolved(&schema));

    schemata::clear_cache();
    assert!(!schemata::global().is_resolved(&schema));

    let result = schemata::validate(&schema, json!("z")).await.unwrap();
    assert_eq!(result.issues().len(), 1);
    assert!(schemata::global().is_resolved(&schema));
}
