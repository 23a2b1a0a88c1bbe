//! Adapter for schemas implementing the [`StandardSchema`] interface.
//!
//! Checked first: a schema that speaks the standard interface is validated
//! through it even if another adapter would also recognize it.

use std::sync::Arc;

use async_trait::async_trait;
use schemata_core::{Schema, SchemaError, StandardObject, StandardSchema, ValidationResult};
use serde_json::Value;

use crate::adapter::{not_owned, Adapter, BoxValidator, Validator};
use crate::loader::ModuleCache;

/// Adapter name.
pub const NAME: &str = "standard";

/// Dispatches to [`StandardSchema::validate`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardAdapter;

struct StandardValidator {
    schema: Arc<dyn StandardSchema>,
}

#[async_trait]
impl Validator for StandardValidator {
    async fn validate(&self, data: Value) -> ValidationResult {
        self.schema.validate(data).await.normalized()
    }
}

#[async_trait]
impl Adapter for StandardAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn detect(&self, schema: &Schema) -> bool {
        schema.is::<StandardObject>()
    }

    async fn build_validator(
        &self,
        schema: &Schema,
        _modules: &ModuleCache,
    ) -> Result<BoxValidator, SchemaError> {
        let object = schema
            .downcast_ref::<StandardObject>()
            .ok_or_else(|| not_owned(NAME, schema))?;
        Ok(Arc::new(StandardValidator {
            schema: Arc::clone(object.schema()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_core::Issue;
    use serde_json::json;

    struct Silent;

    #[async_trait]
    impl StandardSchema for Silent {
        fn vendor(&self) -> &str {
            "silent"
        }

        async fn validate(&self, data: Value) -> ValidationResult {
            if data.is_null() {
                ValidationResult::Failure { issues: Vec::new() }
            } else {
                ValidationResult::success(data)
            }
        }
    }

    #[test]
    fn detects_only_standard_objects() {
        assert!(StandardAdapter.detect(&Schema::standard(Silent)));
        assert!(!StandardAdapter.detect(&Schema::new(json!({"type": "string"}))));
    }

    #[tokio::test]
    async fn empty_failures_are_normalized() {
        let validator = StandardAdapter
            .build_validator(&Schema::standard(Silent), &ModuleCache::new())
            .await
            .unwrap();

        assert_eq!(validator.validate(json!(1)).await, ValidationResult::success(json!(1)));
        assert_eq!(
            validator.validate(Value::Null).await.issues(),
            &[Issue::new("validation failed")]
        );
    }

    #[tokio::test]
    async fn foreign_schema_is_rejected() {
        let err = StandardAdapter
            .build_validator(&Schema::new(3u8), &ModuleCache::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SchemaError::Compilation { adapter: NAME, .. }));
    }
}
