//! Adapter for [`regex::Regex`] used as a string schema.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use schemata_core::{json_type_name, Issue, Schema, SchemaError, ValidationResult};
use serde_json::Value;

use crate::adapter::{not_owned, Adapter, BoxValidator, FnValidator};
use crate::loader::ModuleCache;

/// Adapter name.
pub const NAME: &str = "regex";

/// Accepts strings matching the wrapped pattern.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexAdapter;

fn check(pattern: &Regex, data: Value) -> ValidationResult {
    let message = match &data {
        Value::String(s) if pattern.is_match(s) => None,
        Value::String(_) => Some(format!("Invalid string: must match pattern /{}/", pattern.as_str())),
        other => Some(format!("Expected string, received {}", json_type_name(other))),
    };
    match message {
        Some(message) => ValidationResult::failure(vec![Issue::new(message)]),
        None => ValidationResult::success(data),
    }
}

#[async_trait]
impl Adapter for RegexAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn detect(&self, schema: &Schema) -> bool {
        schema.is::<Regex>()
    }

    async fn build_validator(
        &self,
        schema: &Schema,
        _modules: &ModuleCache,
    ) -> Result<BoxValidator, SchemaError> {
        let pattern = schema
            .downcast_ref::<Regex>()
            .ok_or_else(|| not_owned(NAME, schema))?
            .clone();
        Ok(Arc::new(FnValidator::new(move |data| check(&pattern, data))))
    }
}
