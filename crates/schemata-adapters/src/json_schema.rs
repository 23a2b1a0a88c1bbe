//! # JSON Schema Adapter
//!
//! Validates against JSON Schema documents given as `serde_json::Value`
//! objects, using the `jsonschema` crate.
//!
//! The `jsonschema` runtime is a module: it is loaded on first use through
//! the [`ModuleCache`] under [`MODULE`]. Loading reads every `*.json` file of
//! the configured resource directory so `$ref`s can point at them. No
//! network requests are made; a `$ref` to anything not loaded locally fails
//! compilation.
//!
//! ## Draft selection
//!
//! A document's own `$schema` wins when it names a known draft. Otherwise
//! the configured draft applies.
//!
//! ## Issues
//!
//! Each `jsonschema` error becomes one [`Issue`] whose path is the instance
//! location of the failure, decoded into key and index segments.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::FutureExt;
use jsonschema::{Retrieve, Uri};
use schemata_core::{Draft, Issue, LoadError, PathSegment, Schema, SchemaError, SchemataConfig, ValidationResult};
use serde_json::Value;

use crate::adapter::{not_owned, Adapter, BoxValidator, Validator};
use crate::loader::{Loader, ModuleCache, ModuleHandle, ModuleId};

/// Adapter name.
pub const NAME: &str = "json-schema";

/// The `jsonschema` runtime module.
pub const MODULE: ModuleId = ModuleId::new("jsonschema");

/// Keywords marking an object as a JSON Schema document.
pub const KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$ref",
    "$defs",
    "definitions",
    "type",
    "enum",
    "const",
    "properties",
    "required",
    "additionalProperties",
    "patternProperties",
    "propertyNames",
    "items",
    "prefixItems",
    "contains",
    "minItems",
    "maxItems",
    "uniqueItems",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "format",
];

/// Returns true if `value` is an object carrying at least one JSON Schema
/// keyword.
pub fn looks_like_json_schema(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| KEYWORDS.iter().any(|k| map.contains_key(*k)))
}

/// Resolves `$ref` URIs against locally loaded resources.
///
/// Tries the full URI first, then its last path segment, so both `$id`s
/// and bare file names resolve.
struct LocalRetriever {
    resources: Arc<HashMap<String, Value>>,
}

impl Retrieve for LocalRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        if let Some(value) = self.resources.get(uri_str) {
            return Ok(value.clone());
        }

        let file_name = uri_str.rsplit('/').next().unwrap_or(uri_str);
        self.resources
            .get(file_name)
            .cloned()
            .ok_or_else(|| format!("schema resource not available locally: {uri_str}").into())
    }
}

/// The loaded `jsonschema` runtime: settings plus `$ref` resources.
#[derive(Debug)]
pub struct JsonSchemaRuntime {
    draft: Draft,
    validate_formats: bool,
    resources: Arc<HashMap<String, Value>>,
}

impl JsonSchemaRuntime {
    /// Prepare the runtime, reading resources from `config.resource_dir`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Init` if the resource directory cannot be read or
    /// holds a file that is not valid JSON.
    pub async fn load(config: &SchemataConfig) -> Result<Self, LoadError> {
        let resources = match &config.resource_dir {
            Some(dir) => read_resources(dir).await.map_err(|reason| LoadError::Init {
                module: MODULE.to_string(),
                reason,
            })?,
            None => HashMap::new(),
        };
        tracing::debug!(resources = resources.len(), "jsonschema resources registered");

        Ok(Self {
            draft: config.json_schema_draft,
            validate_formats: config.validate_formats,
            resources: Arc::new(resources),
        })
    }

    /// Number of registered `$ref` resources, counting each alias.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Compile `document` into a native validator.
    ///
    /// # Errors
    ///
    /// Returns the library's message if the document is not a valid schema
    /// or references an unavailable resource.
    pub fn compile(&self, document: &Value) -> Result<jsonschema::Validator, String> {
        let draft = document
            .get("$schema")
            .and_then(Value::as_str)
            .and_then(Draft::from_meta_schema)
            .unwrap_or(self.draft);

        let mut opts = jsonschema::options();
        opts.with_draft(native_draft(draft));
        opts.should_validate_formats(self.validate_formats);
        opts.with_retriever(LocalRetriever {
            resources: Arc::clone(&self.resources),
        });
        opts.build(document).map_err(|e| e.to_string())
    }
}

fn native_draft(draft: Draft) -> jsonschema::Draft {
    match draft {
        Draft::Draft4 => jsonschema::Draft::Draft4,
        Draft::Draft6 => jsonschema::Draft::Draft6,
        Draft::Draft7 => jsonschema::Draft::Draft7,
        Draft::Draft201909 => jsonschema::Draft::Draft201909,
        Draft::Draft202012 => jsonschema::Draft::Draft202012,
    }
}

async fn read_resources(dir: &Path) -> Result<HashMap<String, Value>, String> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| format!("cannot read {}: {e}", dir.display()))?;

    let mut resources = HashMap::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| format!("cannot read {}: {e}", dir.display()))?
    {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            continue;
        };

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?;

        if let Some(id) = value.get("$id").and_then(Value::as_str) {
            resources.insert(id.to_string(), value.clone());
        }
        resources.insert(file_name, value);
    }
    Ok(resources)
}

/// Loader for [`MODULE`] built from `config`.
pub fn loader(config: &SchemataConfig) -> Loader {
    let config = config.clone();
    Arc::new(move || {
        let config = config.clone();
        async move {
            JsonSchemaRuntime::load(&config)
                .await
                .map(|runtime| Arc::new(runtime) as ModuleHandle)
        }
        .boxed()
    })
}

/// Validator wrapping a compiled `jsonschema` validator.
pub(crate) struct JsonSchemaValidator {
    compiled: jsonschema::Validator,
}

impl JsonSchemaValidator {
    pub(crate) fn new(compiled: jsonschema::Validator) -> Self {
        Self { compiled }
    }

    fn check(&self, data: Value) -> ValidationResult {
        let issues: Vec<Issue> = self
            .compiled
            .iter_errors(&data)
            .map(|e| Issue {
                message: e.to_string(),
                path: PathSegment::from_pointer(&e.instance_path.to_string(), &data),
            })
            .collect();

        if issues.is_empty() {
            ValidationResult::success(data)
        } else {
            ValidationResult::failure(issues)
        }
    }
}

#[async_trait]
impl Validator for JsonSchemaValidator {
    async fn validate(&self, data: Value) -> ValidationResult {
        self.check(data)
    }
}

/// Compile `document` with the `jsonschema` module from `modules`.
pub(crate) async fn build(
    adapter: &'static str,
    document: &Value,
    modules: &ModuleCache,
) -> Result<BoxValidator, SchemaError> {
    let runtime = modules.acquire_as::<JsonSchemaRuntime>(MODULE).await?;
    let compiled = runtime
        .compile(document)
        .map_err(|reason| SchemaError::Compilation { adapter, reason })?;
    Ok(Arc::new(JsonSchemaValidator::new(compiled)))
}

/// Claims `serde_json::Value` objects that look like JSON Schema.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaAdapter;

#[async_trait]
impl Adapter for JsonSchemaAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn detect(&self, schema: &Schema) -> bool {
        schema.downcast_ref::<Value>().is_some_and(looks_like_json_schema)
    }

    async fn build_validator(
        &self,
        schema: &Schema,
        modules: &ModuleCache,
    ) -> Result<BoxValidator, SchemaError> {
        let document = schema
            .downcast_ref::<Value>()
            .ok_or_else(|| not_owned(NAME, schema))?;
        build(NAME, document, modules).await
    }
}
