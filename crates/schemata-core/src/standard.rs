//! # Standard Schema Interface
//!
//! Libraries that want first-class support without a dedicated adapter can
//! implement [`StandardSchema`] on their schema type. Wrapping such a value
//! with [`Schema::standard`](crate::Schema::standard) marks it for the
//! `standard` adapter, which has the highest priority.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::issue::ValidationResult;

/// A schema that knows how to validate data itself.
#[async_trait]
pub trait StandardSchema: Send + Sync + 'static {
    /// Name of the library providing the schema.
    fn vendor(&self) -> &str;

    /// Validate `data`, returning the (possibly coerced) value or the issues.
    async fn validate(&self, data: Value) -> ValidationResult;
}

/// Marker object stored inside a [`Schema`](crate::Schema) built with
/// [`Schema::standard`](crate::Schema::standard).
#[derive(Clone)]
pub struct StandardObject {
    schema: Arc<dyn StandardSchema>,
}

impl StandardObject {
    pub(crate) fn new<S: StandardSchema>(schema: S) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    /// The wrapped schema.
    pub fn schema(&self) -> &Arc<dyn StandardSchema> {
        &self.schema
    }
}

impl fmt::Debug for StandardObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardObject")
            .field("vendor", &self.schema.vendor())
            .finish()
    }
}
