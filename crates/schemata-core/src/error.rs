//! # Error Types — Structured Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - [`SchemaError`] covers system failures: no adapter owns the schema, the
//!   owning library cannot be loaded, or the library rejects the schema.
//! - [`ValidationError`] aggregates data-validation issues and is only
//!   produced by the throwing `assert` API.
//! - Errors cross shared in-flight futures, so every type here is `Clone`;
//!   underlying causes are captured as strings.

use std::fmt;

use thiserror::Error;

use crate::issue::Issue;

/// Top-level error returned by `assert`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The data did not conform to the schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The schema could not be resolved or compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Failure to resolve a schema to a working validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// No registered adapter claims the schema.
    #[error("unrecognized schema of type `{type_name}`: no registered adapter claims it")]
    Unrecognized {
        /// Type name of the opaque schema object.
        type_name: &'static str,
    },

    /// The library owning the schema could not be loaded.
    #[error("schema library unavailable: {0}")]
    LibraryUnavailable(#[from] LoadError),

    /// The owning library rejected the schema itself.
    #[error("adapter '{adapter}' rejected the schema: {reason}")]
    Compilation {
        /// Name of the adapter that claimed the schema.
        adapter: &'static str,
        /// Library-provided reason.
        reason: String,
    },
}

/// Failure to acquire a library module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// No loader is registered for the module.
    #[error("module '{0}' not found")]
    NotFound(String),

    /// The loader ran and failed.
    #[error("module '{module}' failed to initialize: {reason}")]
    Init {
        /// Module name.
        module: String,
        /// Loader-provided reason.
        reason: String,
    },

    /// The loaded handle is not of the type the caller asked for.
    #[error("module '{module}' does not provide `{expected}`")]
    UnexpectedHandle {
        /// Module name.
        module: String,
        /// Type the caller expected.
        expected: &'static str,
    },
}

/// Aggregate of every issue found while validating one value.
///
/// The message summarizes all issues; [`ValidationError::issues`] exposes
/// the complete list in the library's native order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<Issue>,
}

impl ValidationError {
    /// Build an aggregate from one or more issues.
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// All issues, in order.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consumes self and returns the inner issues.
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.as_slice() {
            [] => f.write_str("validation failed"),
            [only] => write!(f, "{only}"),
            many => {
                write!(f, "{} validation issues: ", many.len())?;
                for (i, issue) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{issue}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_issue_message_is_the_issue() {
        let err = ValidationError::new(vec![Issue::new("Expected string")]);
        assert_eq!(err.to_string(), "Expected string");
    }

    #[test]
    fn multiple_issues_are_summarized_in_order() {
        let err = ValidationError::new(vec![
            Issue::at("is required", ["name"]),
            Issue::at("must be positive", ["age"]),
        ]);
        assert_eq!(
            err.to_string(),
            "2 validation issues: name: is required; age: must be positive"
        );
        assert_eq!(err.issues().len(), 2);
        assert_eq!(err.clone().into_issues()[1].path_string(), "age");
    }

    #[test]
    fn load_errors_surface_as_library_unavailable() {
        let err: SchemaError = LoadError::NotFound("jsonschema".into()).into();
        assert!(matches!(err, SchemaError::LibraryUnavailable(_)));
        assert!(err.to_string().contains("module 'jsonschema' not found"));
    }

    #[test]
    fn top_level_error_is_transparent() {
        let err: Error = ValidationError::new(vec![Issue::new("boom")]).into();
        assert_eq!(err.to_string(), "boom");

        let err: Error = SchemaError::Unrecognized { type_name: "u32" }.into();
        assert!(err.to_string().contains("`u32`"));
    }
}
