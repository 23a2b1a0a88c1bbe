//! # Issue Model
//!
//! Normalized representation of validation failures. Every adapter
//! translates its library's native errors into [`Issue`]s; the resolver and
//! the public API never look past this representation.
//!
//! An issue path is an ordered sequence of object keys and array indices
//! leading from the validated value to the offending sub-value. An empty path
//! means the failure concerns the whole value.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message used when a library reports failure without any detail.
const UNSPECIFIED_FAILURE: &str = "validation failed";

/// One step of an issue path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position within an array.
    Index(usize),
    /// Key within an object.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl PathSegment {
    /// Decode an RFC 6901 JSON pointer into path segments.
    ///
    /// The pointer is walked against `instance` so that tokens addressing an
    /// array element become [`PathSegment::Index`] while object keys that
    /// merely look numeric stay [`PathSegment::Key`]. Tokens that run past
    /// the instance are kept as keys.
    pub fn from_pointer(pointer: &str, instance: &Value) -> Vec<PathSegment> {
        let mut path = Vec::new();
        let mut current = Some(instance);

        for raw in pointer.split('/').skip(1) {
            let token = raw.replace("~1", "/").replace("~0", "~");
            let node = current;
            let segment = match node {
                Some(Value::Array(items)) => match token.parse::<usize>() {
                    Ok(index) => {
                        current = items.get(index);
                        PathSegment::Index(index)
                    }
                    Err(_) => {
                        current = None;
                        PathSegment::Key(token)
                    }
                },
                Some(Value::Object(map)) => {
                    current = map.get(&token);
                    PathSegment::Key(token)
                }
                _ => {
                    current = None;
                    PathSegment::Key(token)
                }
            };
            path.push(segment);
        }

        path
    }
}

/// Render a path as `key.nested[0].field`.
pub(crate) fn display_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Index(i) => {
                let _ = write!(out, "[{i}]");
            }
            PathSegment::Key(k) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(k);
            }
        }
    }
    out
}

/// A single validation failure.
///
/// Equality is structural over message and path so expected issue lists can
/// be compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    /// Human-readable description, as reported by the owning library.
    pub message: String,
    /// Location of the failure within the validated value.
    #[serde(default)]
    pub path: Vec<PathSegment>,
}

impl Issue {
    /// A whole-value issue with an empty path.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// An issue attributed to the sub-value at `path`.
    pub fn at<I, S>(message: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self {
            message: message.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true when the issue concerns the whole value.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The path rendered as `key.nested[0].field`; empty for root issues.
    pub fn path_string(&self) -> String {
        display_path(&self.path)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path_string(), self.message)
        }
    }
}

/// Normalized outcome of validating one value against one schema.
///
/// Serializes as `{"data": …}` on success and `{"issues": […]}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationResult {
    /// The value conforms; `data` may have been coerced by the library.
    Success {
        /// The validated (possibly transformed) value.
        data: Value,
    },
    /// The value does not conform.
    Failure {
        /// Ordered, non-empty list of issues in the library's native order.
        issues: Vec<Issue>,
    },
}

impl ValidationResult {
    /// A success carrying `data`.
    pub fn success(data: Value) -> Self {
        Self::Success { data }
    }

    /// A failure carrying `issues`.
    ///
    /// An empty list is replaced by a single whole-value issue so that a
    /// failure never arrives without at least one issue.
    pub fn failure(issues: Vec<Issue>) -> Self {
        if issues.is_empty() {
            Self::Failure {
                issues: vec![Issue::new(UNSPECIFIED_FAILURE)],
            }
        } else {
            Self::Failure { issues }
        }
    }

    /// Re-establish the non-empty failure invariant on a result produced
    /// outside this crate.
    pub fn normalized(self) -> Self {
        match self {
            Self::Failure { issues } => Self::failure(issues),
            success => success,
        }
    }

    /// Returns true for [`ValidationResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The validated value, if successful.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// The issues; empty on success.
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Success { .. } => &[],
            Self::Failure { issues } => issues,
        }
    }

    /// Convert into a `Result`, aggregating failures into a
    /// [`ValidationError`](crate::ValidationError).
    pub fn into_result(self) -> Result<Value, crate::ValidationError> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Failure { issues } => Err(crate::ValidationError::new(issues)),
        }
    }
}

/// JSON type name of a value, as used in issue messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
