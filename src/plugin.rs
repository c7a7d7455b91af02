// OutputTransformPlugin - runs a transformer over finalized chunk assets

use crate::compiler::Compiler;
use crate::config::PluginOptions;
use crate::error::OutputTransformError;
use crate::hooks::{self, Protocol};
use crate::transform::{AssetTransformEngine, Transformer};
use std::sync::Arc;

/// Name the plugin registers its taps under
pub const PLUGIN_NAME: &str = "OutputTransformPlugin";

/// Post-optimization transform stage for a bundler host
///
/// After the host has finalized and optimized every chunk asset, files whose
/// names match `PluginOptions::test` are run through the transformer and
/// replaced in the compilation, composing source maps when the transformer
/// produces one. Per-file failures are recorded on the compilation and leave
/// that file untouched.
pub struct OutputTransformPlugin {
    options: PluginOptions,
    engine: Arc<AssetTransformEngine>,
}

impl OutputTransformPlugin {
    /// Plugin backed by the OXC transformer
    #[cfg(feature = "oxc")]
    pub fn new(options: PluginOptions) -> Self {
        Self::with_transformer(options, crate::transform::OxcTransformer::new())
    }

    /// Plugin backed by a custom transformer
    pub fn with_transformer(options: PluginOptions, transformer: impl Transformer + 'static) -> Self {
        let engine = AssetTransformEngine::new(&options, Box::new(transformer));
        Self {
            options,
            engine: Arc::new(engine),
        }
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Attach to a compiler
    ///
    /// Fails without registering anything when the options are invalid or the
    /// compiler exposes no supported registration protocol.
    pub fn apply(&self, compiler: &mut Compiler) -> Result<Protocol, OutputTransformError> {
        self.options.validate()?;

        let adapter =
            hooks::detect(compiler, PLUGIN_NAME).ok_or(OutputTransformError::ProtocolMismatch)?;
        let protocol = adapter.protocol();

        hooks::attach(
            adapter,
            compiler,
            self.engine.clone(),
            self.options.wants_module_source_maps(),
        )?;

        tracing::info!(
            plugin = PLUGIN_NAME,
            ?protocol,
            test = %self.options.test.as_str(),
            "Applied output transform plugin"
        );
        Ok(protocol)
    }
}
