//! Post-optimization transform stage for bundler hosts.
//!
//! Once a host has finalized and optimized its chunk assets, this crate runs a
//! source-to-source transformer over the files selected by name, swaps the
//! results back into the compilation and keeps source map provenance intact.
//! It attaches to hosts exposing either typed tap-style hooks or the legacy
//! string-keyed event registry.
//!
//! ```no_run
//! # #[cfg(feature = "oxc")]
//! # async fn build() -> Result<(), Box<dyn std::error::Error>> {
//! use output_transform_plugin::{BuildInput, Compiler, OutputTransformPlugin, PluginOptions};
//!
//! let options = PluginOptions::default()
//!     .with_transform_options(serde_json::json!({ "target": "es2015", "sourceMaps": true }));
//! let plugin = OutputTransformPlugin::new(options);
//!
//! let mut compiler = Compiler::typed();
//! plugin.apply(&mut compiler)?;
//! let compilation = compiler.run(BuildInput::default()).await?;
//! for error in &compilation.context.errors {
//!     eprintln!("{error}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod hooks;
pub mod plugin;
pub mod source_map;
pub mod transform;

pub use compiler::{
    BuildInput, Chunk, Compilation, CompilationContext, CompilationError, Compiler, Module,
    RawSource, SharedSource, Source, SourceMapSource,
};
pub use config::{FilenamePattern, PluginOptions};
pub use error::{ConfigError, HostError, OutputTransformError, TransformError};
pub use hooks::Protocol;
pub use plugin::{OutputTransformPlugin, PLUGIN_NAME};
pub use source_map::SharedSourceMap;
#[cfg(feature = "oxc")]
pub use transform::OxcTransformer;
pub use transform::{TransformOptions, TransformOutput, Transformer};
