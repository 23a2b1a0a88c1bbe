//! # Adapter Protocol
//!
//! Every supported library is wrapped by one [`Adapter`]: a synchronous
//! ownership test ([`Adapter::detect`]) plus an async factory producing a
//! [`Validator`] bound to one schema ([`Adapter::build_validator`]).
//!
//! [`coerce`] composes the two into the single seam the resolver uses: given
//! a schema it either declines (`None`) or returns the `'static` future
//! constructing the validator. The resolver treats every adapter identically
//! through it, whatever the wrapped library's native API looks like.
//!
//! ## Contract
//!
//! - `detect` is pure, fast and conservative. A false positive silently
//!   routes data to the wrong library.
//! - `build_validator` is only called for schemas `detect` accepted. It
//!   acquires modules, compiles the native routine, and reports malformed
//!   schemas as [`SchemaError::Compilation`] there rather than at
//!   validation time.
//! - Validators translate native errors into [`Issue`](schemata_core::Issue)s
//!   in the library's own order and never report a failure without issues.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use schemata_core::{Schema, SchemaError, ValidationResult};
use serde_json::Value;

use crate::loader::ModuleCache;

/// Async validation routine bound to one schema instance.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Validate `data`, returning the (possibly coerced) value or its issues.
    async fn validate(&self, data: Value) -> ValidationResult;
}

/// Shared validator handle.
pub type BoxValidator = Arc<dyn Validator>;

/// Future constructing a validator.
pub type BuildFuture = BoxFuture<'static, Result<BoxValidator, SchemaError>>;

/// Library-specific detector and validator factory.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Stable adapter name, used in logs and errors.
    fn name(&self) -> &'static str;

    /// Returns true if `schema` belongs to this adapter's library.
    fn detect(&self, schema: &Schema) -> bool;

    /// Prepare a validator for a schema `detect` accepted.
    async fn build_validator(
        &self,
        schema: &Schema,
        modules: &ModuleCache,
    ) -> Result<BoxValidator, SchemaError>;
}

/// Claim-or-decline composition of an adapter.
///
/// Returns `None` when `adapter` does not own `schema`; otherwise the
/// construction future, which owns everything it needs.
pub fn coerce(
    adapter: &Arc<dyn Adapter>,
    schema: &Schema,
    modules: &ModuleCache,
) -> Option<BuildFuture> {
    if !adapter.detect(schema) {
        return None;
    }
    let adapter = Arc::clone(adapter);
    let schema = schema.clone();
    let modules = modules.clone();
    Some(async move { adapter.build_validator(&schema, &modules).await }.boxed())
}

/// Error for a schema handed to an adapter that does not own it.
pub(crate) fn not_owned(adapter: &'static str, schema: &Schema) -> SchemaError {
    SchemaError::Compilation {
        adapter,
        reason: format!("schema of type `{}` is not owned by this adapter", schema.type_name()),
    }
}

/// Validator backed by a synchronous native routine.
pub struct FnValidator<F> {
    check: F,
}

impl<F> FnValidator<F>
where
    F: Fn(Value) -> ValidationResult + Send + Sync,
{
    /// Wrap `check`.
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<F> fmt::Debug for FnValidator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(Value) -> ValidationResult + Send + Sync,
{
    async fn validate(&self, data: Value) -> ValidationResult {
        (self.check)(data)
    }
}
