// Source-to-source transformation of finalized chunk assets

pub mod engine;
#[cfg(feature = "oxc")]
pub mod oxc;

pub use engine::{report_error, AssetOutcome, AssetTransformEngine, TransformSummary};
#[cfg(feature = "oxc")]
pub use oxc::OxcTransformer;

use crate::error::TransformError;
use crate::source_map::{source_map_to_json, SharedSourceMap};
use serde_json::Value;
use std::sync::Arc;

/// Key under which the input map is overlaid on the configuration blob
pub const INPUT_SOURCE_MAP_KEY: &str = "inputSourceMap";

/// Effective options for one transform call
///
/// Built fresh for every file from the shared base blob plus the input map
/// detected on that file's asset. The base blob is never mutated, so options
/// for one file cannot leak into another.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    filename: String,
    config: Arc<Value>,
    input_source_map: Option<SharedSourceMap>,
}

impl TransformOptions {
    pub fn new(filename: impl Into<String>, config: Arc<Value>) -> Self {
        Self {
            filename: filename.into(),
            config,
            input_source_map: None,
        }
    }

    /// Overlay the map currently describing the input text
    pub fn with_input_source_map(mut self, map: Option<SharedSourceMap>) -> Self {
        self.input_source_map = map;
        self
    }

    /// Output filename being transformed
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The shared configuration blob, without the overlay
    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn input_source_map(&self) -> Option<&SharedSourceMap> {
        self.input_source_map.as_ref()
    }

    /// The blob as a configuration-driven transformer sees it, with the input
    /// map overlaid under `inputSourceMap`
    pub fn to_value(&self) -> Result<Value, TransformError> {
        let mut value = match self.config.as_ref() {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };

        if let (Some(map), Value::Object(fields)) = (&self.input_source_map, &mut value) {
            let json = source_map_to_json(map)?;
            let map_value = serde_json::from_str(&json)
                .map_err(|e| TransformError::InvalidOptions(e.to_string()))?;
            fields.insert(INPUT_SOURCE_MAP_KEY.to_string(), map_value);
        }

        Ok(value)
    }
}

/// Result of one transform call
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub code: String,
    /// Map from `code` back to the input text, if one was produced
    pub map: Option<SharedSourceMap>,
}

/// External source-to-source transformer
///
/// Called synchronously once per selected file. Implementations must not rely
/// on state from previous calls.
pub trait Transformer: Send + Sync {
    fn transform(
        &self,
        source: &str,
        options: &TransformOptions,
    ) -> Result<TransformOutput, TransformError>;
}

impl<F> Transformer for F
where
    F: Fn(&str, &TransformOptions) -> Result<TransformOutput, TransformError> + Send + Sync,
{
    fn transform(
        &self,
        source: &str,
        options: &TransformOptions,
    ) -> Result<TransformOutput, TransformError> {
        self(source, options)
    }
}
