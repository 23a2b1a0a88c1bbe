//! # Opaque Schema Handles
//!
//! A [`Schema`] wraps a schema object produced by any library. Cloning the
//! handle shares the same instance; the instance's identity ([`SchemaId`]) is
//! the address of the shared allocation, so two handles built from
//! structurally equal objects are still distinct schemas.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::standard::{StandardObject, StandardSchema};

/// Identity of a schema instance.
///
/// Only meaningful while some handle to the instance is alive; caches that
/// key on it must retain a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(usize);

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Shared, type-erased handle to a library-specific schema object.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Schema {
    /// Wrap a schema object.
    pub fn new<S>(schema: S) -> Self
    where
        S: Any + Send + Sync,
    {
        Self {
            inner: Arc::new(schema),
            type_name: type_name::<S>(),
        }
    }

    /// Wrap a value implementing [`StandardSchema`].
    pub fn standard<S>(schema: S) -> Self
    where
        S: StandardSchema,
    {
        Self {
            inner: Arc::new(StandardObject::new(schema)),
            type_name: type_name::<S>(),
        }
    }

    /// Borrow the wrapped object if it is an `S`.
    pub fn downcast_ref<S: Any>(&self) -> Option<&S> {
        self.inner.downcast_ref::<S>()
    }

    /// Returns true if the wrapped object is an `S`.
    pub fn is<S: Any>(&self) -> bool {
        self.inner.is::<S>()
    }

    /// Identity of the wrapped instance.
    pub fn id(&self) -> SchemaId {
        SchemaId(Arc::as_ptr(&self.inner) as *const () as usize)
    }

    /// Returns true if both handles share one instance.
    pub fn same_instance(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Type name of the object the caller supplied.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type", &self.type_name)
            .field("id", &self.id())
            .finish()
    }
}

impl From<serde_json::Value> for Schema {
    fn from(document: serde_json::Value) -> Self {
        Self::new(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn clones_share_identity() {
        let schema = Schema::new(json!({"type": "string"}));
        let copy = schema.clone();
        assert_eq!(schema.id(), copy.id());
        assert!(schema.same_instance(&copy));
    }

    #[test]
    fn equal_objects_are_distinct_instances() {
        let a = Schema::new(json!({"type": "string"}));
        let b = Schema::new(json!({"type": "string"}));
        assert_ne!(a.id(), b.id());
        assert!(!a.same_instance(&b));
    }

    #[test]
    fn downcast_matches_wrapped_type() {
        let schema: Schema = json!({"type": "integer"}).into();
        assert!(schema.is::<Value>());
        assert!(!schema.is::<String>());
        assert_eq!(
            schema.downcast_ref::<Value>().and_then(|v| v.get("type")),
            Some(&json!("integer"))
        );
        assert!(schema.type_name().ends_with("Value"));
    }

    #[test]
    fn debug_names_the_type() {
        let schema = Schema::new(42u32);
        assert!(format!("{schema:?}").contains("u32"));
    }
}
