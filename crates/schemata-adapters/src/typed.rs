//! Adapter for Rust types used as schemas through serde.
//!
//! A [`TypedSchema`] is built from any `T: Serialize + DeserializeOwned`.
//! Validation deserializes the data into `T` and serializes it back, so a
//! successful result carries the value as `T` normalizes it (defaults
//! filled in, unknown fields dropped unless `T` denies them).
//!
//! A failure is reported as one issue located at the field where
//! deserialization stopped.

use std::sync::Arc;

use async_trait::async_trait;
use schemata_core::{Issue, PathSegment, Schema, SchemaError, ValidationResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use serde_path_to_error::Segment;

use crate::adapter::{not_owned, Adapter, BoxValidator, FnValidator};
use crate::loader::ModuleCache;

/// Adapter name.
pub const NAME: &str = "serde";

type Parse = fn(Value) -> Result<Value, Issue>;

/// Schema object for a serde type.
#[derive(Debug, Clone, Copy)]
pub struct TypedSchema {
    target: &'static str,
    parse: Parse,
}

impl TypedSchema {
    /// Schema accepting exactly the values that deserialize into `T`.
    pub fn of<T>() -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        Self {
            target: std::any::type_name::<T>(),
            parse: round_trip::<T>,
        }
    }

    /// Name of the target type.
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Deserialize `data` into the target type and serialize it back.
    ///
    /// # Errors
    ///
    /// Returns the issue at the field where deserialization failed.
    pub fn parse(&self, data: Value) -> Result<Value, Issue> {
        (self.parse)(data)
    }
}

impl From<TypedSchema> for Schema {
    fn from(schema: TypedSchema) -> Self {
        Schema::new(schema)
    }
}

fn round_trip<T>(data: Value) -> Result<Value, Issue>
where
    T: Serialize + DeserializeOwned,
{
    let typed: T = serde_path_to_error::deserialize(data).map_err(|e| {
        let path = e.path().iter().filter_map(path_segment).collect();
        Issue {
            message: e.inner().to_string(),
            path,
        }
    })?;
    serde_json::to_value(typed).map_err(|e| Issue::new(e.to_string()))
}

fn path_segment(segment: &Segment) -> Option<PathSegment> {
    match segment {
        Segment::Seq { index } => Some(PathSegment::Index(*index)),
        Segment::Map { key } => Some(PathSegment::Key(key.clone())),
        _ => None,
    }
}

/// Validates through [`TypedSchema::parse`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TypedAdapter;

#[async_trait]
impl Adapter for TypedAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn detect(&self, schema: &Schema) -> bool {
        schema.is::<TypedSchema>()
    }

    async fn build_validator(
        &self,
        schema: &Schema,
        _modules: &ModuleCache,
    ) -> Result<BoxValidator, SchemaError> {
        let typed = *schema
            .downcast_ref::<TypedSchema>()
            .ok_or_else(|| not_owned(NAME, schema))?;
        Ok(Arc::new(FnValidator::new(move |data| match typed.parse(data) {
            Ok(value) => ValidationResult::success(value),
            Err(issue) => ValidationResult::failure(vec![issue]),
        })))
    }
}
