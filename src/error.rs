// Error types for the output transform stage

use thiserror::Error;

/// Unified error type for the output transform plugin
///
/// Per-file variants (`AssetNotFound`, `TransformFailure`, `MapInconsistency`)
/// are recorded on the compilation and never abort a build. The remaining
/// variants are returned from `apply` and stop the build before any asset is
/// touched.
#[derive(Debug, Error)]
pub enum OutputTransformError {
    #[error("Invalid plugin configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Host exposes neither typed hooks nor legacy plugin registration")]
    ProtocolMismatch,

    #[error("Hook registration failed: {0}")]
    Host(#[from] HostError),

    #[error("Asset '{filename}' not found in compilation")]
    AssetNotFound { filename: String },

    #[error("Transform of '{filename}' failed: {source}")]
    TransformFailure {
        filename: String,
        #[source]
        source: TransformError,
    },

    #[error("Source and map of '{filename}' changed between reads")]
    MapInconsistency { filename: String },
}

impl OutputTransformError {
    /// Whether this error must stop the build
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::ProtocolMismatch | Self::Host(_)
        )
    }

    /// Output filename the error is attributable to, if any
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::AssetNotFound { filename }
            | Self::TransformFailure { filename, .. }
            | Self::MapInconsistency { filename } => Some(filename),
            _ => None,
        }
    }
}

/// Errors raised by a source-to-source transformer
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Syntax errors:\n{0}")]
    Syntax(String),

    #[error("Transform errors:\n{0}")]
    Transform(String),

    #[error("Invalid transformer options: {0}")]
    InvalidOptions(String),

    #[error("Source map error: {0}")]
    SourceMap(#[from] sourcemap::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Construction-time configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {error}")]
    Io { path: String, error: String },

    #[error("TOML parsing error in {path}: {error}")]
    Toml { path: String, error: String },

    #[error("Invalid filename pattern '{pattern}': {error}")]
    Pattern { pattern: String, error: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised by the bundler host while registering or running hooks
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Unknown legacy event '{0}'")]
    UnknownEvent(String),

    #[error("Handler shape does not match legacy event '{event}'")]
    HandlerMismatch { event: String },

    #[error("Compilation exposes no registration surface for '{event}'")]
    MissingHooks { event: String },

    #[error("Completion callback for '{event}' was dropped without being invoked")]
    CompletionDropped { event: String },

    #[error("Hook '{event}' was interrupted before completing")]
    Interrupted { event: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            OutputTransformError::AssetNotFound {
                filename: "main.js".to_string()
            }
            .to_string(),
            "Asset 'main.js' not found in compilation"
        );

        assert_eq!(
            TransformError::Syntax("Unexpected token".to_string()).to_string(),
            "Syntax errors:\nUnexpected token"
        );

        assert_eq!(
            OutputTransformError::TransformFailure {
                filename: "vendor.js".to_string(),
                source: TransformError::Transform("bad".to_string()),
            }
            .to_string(),
            "Transform of 'vendor.js' failed: Transform errors:\nbad"
        );
    }

    #[test]
    fn fatality_follows_propagation_policy() {
        assert!(OutputTransformError::ProtocolMismatch.is_fatal());
        assert!(
            OutputTransformError::Configuration(ConfigError::Validation("x".into())).is_fatal()
        );
        assert!(!OutputTransformError::AssetNotFound {
            filename: "a.js".into()
        }
        .is_fatal());
        assert!(!OutputTransformError::MapInconsistency {
            filename: "a.js".into()
        }
        .is_fatal());
    }

    #[test]
    fn from_conversions_work() {
        let err: OutputTransformError = ConfigError::Validation("test".to_string()).into();
        assert!(matches!(err, OutputTransformError::Configuration(_)));

        let err: OutputTransformError = HostError::UnknownEvent("emit".to_string()).into();
        assert!(matches!(err, OutputTransformError::Host(_)));

        let err: TransformError = anyhow::anyhow!("custom").into();
        assert_eq!(err.to_string(), "custom");
    }

    #[test]
    fn filename_is_exposed_for_per_file_errors() {
        let err = OutputTransformError::MapInconsistency {
            filename: "chunk.js".into(),
        };
        assert_eq!(err.filename(), Some("chunk.js"));
        assert_eq!(OutputTransformError::ProtocolMismatch.filename(), None);
    }
}
