//! Resolved configuration with provenance
//!
//! `ResolvedConfig::build` turns a caller-supplied fragment into the one
//! authoritative configuration tree for the lane: normalize the input,
//! expand shorthand aliases, resolve file-backed options, merge over the
//! built-in defaults, absolutize coverage paths, derive the dist route,
//! and validate. It runs once per lane, at construction.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use super::options::{
    resolve_options_field, rewrite_coverage_paths, OptionsFileReader, PathResolver,
};
use super::shorthand::expand_shorthand;

/// Schema version for the resolved configuration
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "buildlane/resolved_config@1";

/// Configuration fields that may name a JSON file instead of holding an
/// inline object.
const FILE_BACKED_FIELDS: &[&str] = &["esdocOptions", "jestOptions"];

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config fragment: {0}")]
    Io(String),

    #[error("failed to parse config fragment: {0}")]
    Parse(String),

    #[error("options file '{path}' is not valid JSON: {reason}")]
    MalformedOptions { path: String, reason: String },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Caller-supplied configuration input.
///
/// An explicit tagged variant instead of sniffing the value's runtime
/// shape: a bare string is shorthand for overriding only the entry file
/// and is never matched against the alias table.
#[derive(Debug, Clone)]
pub enum ConfigInput {
    /// Shorthand for `{"mainFile": <path>}`
    MainFile(String),

    /// A (possibly empty) configuration fragment, merged over the defaults
    Fragment(Value),
}

impl Default for ConfigInput {
    fn default() -> Self {
        ConfigInput::Fragment(Value::Object(Map::new()))
    }
}

impl ConfigInput {
    /// Load a fragment from a TOML or JSON file (by extension; TOML when
    /// in doubt). Unlike the file-backed options fields, a fragment file
    /// named on the command line must exist and parse.
    pub fn from_fragment_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let value = if is_json {
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            let parsed: toml::Value =
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
            toml_to_json(parsed)
        };

        Ok(ConfigInput::Fragment(value))
    }
}

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Fragment,
    OptionsFile,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (None for builtin and inline fragments)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin and inline fragments)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// The lane's authoritative configuration, with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration tree
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl ResolvedConfig {
    /// Build the resolved configuration from a caller input.
    pub fn build(
        input: ConfigInput,
        reader: &dyn OptionsFileReader,
        paths: &dyn PathResolver,
    ) -> Result<Self, ConfigError> {
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        let mut fragment = match input {
            ConfigInput::MainFile(main) => {
                let mut map = Map::new();
                map.insert("mainFile".to_string(), Value::String(main));
                Value::Object(map)
            }
            ConfigInput::Fragment(value) => {
                let mut value = match value {
                    Value::Null => Value::Object(Map::new()),
                    object @ Value::Object(_) => object,
                    other => {
                        return Err(ConfigError::Validation(format!(
                            "configuration fragment must be an object, got {}",
                            value_kind(&other)
                        )))
                    }
                };
                expand_shorthand(&mut value);
                value
            }
        };

        let map = fragment
            .as_object_mut()
            .ok_or_else(|| ConfigError::Validation("fragment lost object shape".to_string()))?;
        for field in FILE_BACKED_FIELDS {
            if let Some(file) = resolve_options_field(map, field, reader)? {
                sources.push(ConfigSource {
                    origin: ConfigOrigin::OptionsFile,
                    path: Some(file.path),
                    digest: Some(file.digest),
                });
            }
        }
        if !map.is_empty() {
            sources.insert(
                1,
                ConfigSource {
                    origin: ConfigOrigin::Fragment,
                    path: None,
                    digest: None,
                },
            );
        }

        let defaults = BuiltinDefaults::default();
        let mut merged = merge_layers(vec![defaults.to_value(), fragment]);

        rewrite_coverage_paths(&mut merged, paths);
        Self::derive_routes(&mut merged);
        Self::validate_config(&merged)?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
        })
    }

    /// Insert the dist directory into the dev server's route table: the
    /// route key is the directory with one leading "." stripped, the value
    /// is the directory as configured. The only post-merge mutation.
    fn derive_routes(config: &mut Value) {
        let Some(dist_dir) = config
            .pointer("/dist/dir")
            .and_then(Value::as_str)
            .map(String::from)
        else {
            return;
        };
        let route = dist_dir
            .strip_prefix('.')
            .unwrap_or(&dist_dir)
            .to_string();

        let Some(mut map) = config.as_object_mut() else {
            return;
        };
        for key in ["browserSyncOptions", "server", "routes"] {
            let slot = map
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            map = slot.as_object_mut().unwrap();
        }
        map.insert(route, Value::String(dist_dir));
    }

    /// Validate the structural invariants the lane itself relies on.
    /// Kind mismatches introduced by the merge are otherwise tolerated.
    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        for path in ["/dist/dir", "/dist/file"] {
            match config.pointer(path).and_then(Value::as_str) {
                Some(s) if !s.is_empty() => {}
                _ => {
                    return Err(ConfigError::Validation(format!(
                        "dist.{} must be a non-empty string",
                        path.rsplit('/').next().unwrap_or(path)
                    )))
                }
            }
        }

        if let Some(targets) = config.pointer("/lint/target").and_then(Value::as_array) {
            for target in targets {
                let Some(pattern) = target.as_str() else {
                    return Err(ConfigError::Validation(
                        "lint.target entries must be strings".to_string(),
                    ));
                };
                globset::Glob::new(pattern).map_err(|e| {
                    ConfigError::Validation(format!("lint.target glob '{pattern}': {e}"))
                })?;
            }
        }

        if !config
            .get("tasks")
            .map(Value::is_object)
            .unwrap_or(false)
        {
            return Err(ConfigError::Validation(
                "tasks must be an object mapping task ids to bindings".to_string(),
            ));
        }

        Ok(())
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a config value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Get a config value as bool
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    /// Get a config value as u64
    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(|v| v.as_u64())
    }
}

/// Convert a TOML value to a JSON value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let map: Map<String, Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            Value::Object(map)
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
