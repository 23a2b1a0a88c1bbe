//! Runtime configuration.
//!
//! Settings for the libraries schemata loads lazily. Defaults work without
//! any environment; override via environment variables or explicit
//! construction.

use std::path::PathBuf;
use std::str::FromStr;

/// JSON Schema draft used when a document does not declare one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Draft {
    /// Draft 4.
    Draft4,
    /// Draft 6.
    Draft6,
    /// Draft 7.
    Draft7,
    /// Draft 2019-09.
    Draft201909,
    /// Draft 2020-12.
    #[default]
    Draft202012,
}

impl Draft {
    /// Draft named by a `$schema` meta-schema URI, if recognized.
    pub fn from_meta_schema(uri: &str) -> Option<Self> {
        let uri = uri.trim_end_matches('#');
        let uri = uri.strip_prefix("https://").or_else(|| uri.strip_prefix("http://"))?;
        match uri {
            "json-schema.org/draft-04/schema" => Some(Self::Draft4),
            "json-schema.org/draft-06/schema" => Some(Self::Draft6),
            "json-schema.org/draft-07/schema" => Some(Self::Draft7),
            "json-schema.org/draft/2019-09/schema" => Some(Self::Draft201909),
            "json-schema.org/draft/2020-12/schema" => Some(Self::Draft202012),
            _ => None,
        }
    }
}

impl FromStr for Draft {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let bare = normalized
            .strip_prefix("draft-")
            .or_else(|| normalized.strip_prefix("draft"))
            .unwrap_or(&normalized);
        match bare {
            "4" | "04" => Ok(Self::Draft4),
            "6" | "06" => Ok(Self::Draft6),
            "7" | "07" => Ok(Self::Draft7),
            "2019-09" | "201909" => Ok(Self::Draft201909),
            "2020-12" | "202012" => Ok(Self::Draft202012),
            _ => Err(ConfigError::InvalidDraft(s.to_string())),
        }
    }
}

/// Configuration for the lazily loaded schema libraries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemataConfig {
    /// Draft applied to JSON Schema documents without a recognized `$schema`.
    pub json_schema_draft: Draft,
    /// Whether `format` keywords are asserted rather than annotated.
    pub validate_formats: bool,
    /// Directory of `*.json` schema resources registered for `$ref` resolution.
    pub resource_dir: Option<PathBuf>,
}

impl SchemataConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SCHEMATA_JSON_SCHEMA_DRAFT` (default: `2020-12`)
    /// - `SCHEMATA_VALIDATE_FORMATS` (default: `false`)
    /// - `SCHEMATA_RESOURCE_DIR` (default: unset)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let json_schema_draft = match lookup("SCHEMATA_JSON_SCHEMA_DRAFT") {
            Some(raw) => raw.parse()?,
            None => Draft::default(),
        };
        let validate_formats = match lookup("SCHEMATA_VALIDATE_FORMATS") {
            Some(raw) => parse_bool("SCHEMATA_VALIDATE_FORMATS", &raw)?,
            None => false,
        };
        let resource_dir = lookup("SCHEMATA_RESOURCE_DIR")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            json_schema_draft,
            validate_formats,
            resource_dir,
        })
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool(var.to_string(), raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The draft name is not a supported JSON Schema draft.
    #[error("unsupported JSON Schema draft: {0}")]
    InvalidDraft(String),
    /// A boolean variable holds something other than a boolean.
    #[error("invalid boolean for {0}: {1}")]
    InvalidBool(String, String),
}
