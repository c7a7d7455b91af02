// Construction-time configuration for the output transform plugin

use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Default predicate: output files ending in `.js`
pub const DEFAULT_TEST_PATTERN: &str = r"\.js$";

/// Name-matching predicate over output filenames
#[derive(Clone)]
pub struct FilenamePattern(Regex);

impl FilenamePattern {
    /// Compile a pattern string
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| ConfigError::Pattern {
                pattern: pattern.to_string(),
                error: e.to_string(),
            })
    }

    /// Whether `filename` is selected by this pattern
    pub fn is_match(&self, filename: &str) -> bool {
        self.0.is_match(filename)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for FilenamePattern {
    fn default() -> Self {
        Self(Regex::new(DEFAULT_TEST_PATTERN).expect("default pattern is valid"))
    }
}

impl fmt::Debug for FilenamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilenamePattern").field(&self.as_str()).finish()
    }
}

impl From<Regex> for FilenamePattern {
    fn from(regex: Regex) -> Self {
        Self(regex)
    }
}

impl Serialize for FilenamePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilenamePattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Self::new(&pattern).map_err(serde::de::Error::custom)
    }
}

/// Plugin options
///
/// Immutable once the plugin is constructed. `transform_options` is opaque to
/// the plugin and forwarded to the transformer for every selected file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Output filenames to transform
    #[serde(default)]
    pub test: FilenamePattern,

    /// Configuration blob forwarded verbatim to the transformer
    #[serde(default = "empty_object")]
    pub transform_options: Value,

    /// Ask the host to propagate module-level source maps
    #[serde(default)]
    pub source_map: Option<bool>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            test: FilenamePattern::default(),
            transform_options: empty_object(),
            source_map: None,
        }
    }
}

impl PluginOptions {
    /// Replace the filename predicate
    pub fn with_test(mut self, test: FilenamePattern) -> Self {
        self.test = test;
        self
    }

    /// Replace the transformer configuration blob
    pub fn with_transform_options(mut self, options: Value) -> Self {
        self.transform_options = options;
        self
    }

    pub fn with_source_map(mut self, enabled: bool) -> Self {
        self.source_map = Some(enabled);
        self
    }

    /// Whether module-level map propagation was requested
    pub fn wants_module_source_maps(&self) -> bool {
        self.source_map.unwrap_or(false)
    }

    /// Parse options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Parse options from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: "<string>".into(),
            error: e.to_string(),
        })
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.test.as_str().is_empty() {
            return Err(ConfigError::Validation(
                "Filename pattern cannot be empty".into(),
            ));
        }
        if !matches!(self.transform_options, Value::Object(_) | Value::Null) {
            return Err(ConfigError::Validation(
                "transform_options must be a table".into(),
            ));
        }
        Ok(())
    }
}
