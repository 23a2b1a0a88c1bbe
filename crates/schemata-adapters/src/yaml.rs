//! Adapter for JSON Schema documents written in YAML.
//!
//! A `serde_yaml::Value` mapping carrying JSON Schema keywords is converted
//! to JSON and compiled with the same `jsonschema` module as
//! [`JsonSchemaAdapter`](crate::json_schema::JsonSchemaAdapter).

use async_trait::async_trait;
use schemata_core::{Schema, SchemaError};
use serde_json::Value;

use crate::adapter::{not_owned, Adapter, BoxValidator};
use crate::json_schema::{self, KEYWORDS};
use crate::loader::ModuleCache;

/// Adapter name.
pub const NAME: &str = "yaml";

/// Claims `serde_yaml::Value` mappings that look like JSON Schema.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlSchemaAdapter;

fn looks_like_yaml_schema(value: &serde_yaml::Value) -> bool {
    value.as_mapping().is_some_and(|map| {
        map.keys()
            .filter_map(serde_yaml::Value::as_str)
            .any(|key| KEYWORDS.contains(&key))
    })
}

/// Convert a YAML value into its JSON equivalent. Tags are dropped.
pub fn yaml_to_json(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported mapping key: {other:?}")),
                };
                object.insert(key, yaml_to_json(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

#[async_trait]
impl Adapter for YamlSchemaAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn detect(&self, schema: &Schema) -> bool {
        schema
            .downcast_ref::<serde_yaml::Value>()
            .is_some_and(looks_like_yaml_schema)
    }

    async fn build_validator(
        &self,
        schema: &Schema,
        modules: &ModuleCache,
    ) -> Result<BoxValidator, SchemaError> {
        let yaml = schema
            .downcast_ref::<serde_yaml::Value>()
            .ok_or_else(|| not_owned(NAME, schema))?;
        let document = yaml_to_json(yaml).map_err(|reason| SchemaError::Compilation {
            adapter: NAME,
            reason: format!("YAML-to-JSON conversion failed: {reason}"),
        })?;
        json_schema::build(NAME, &document, modules).await
    }
}
