// Hook adapter: attaches the transform stage to whichever lifecycle protocol
// the host exposes
//
// The protocol is probed once when the plugin is applied. Everything after
// that goes through the `LifecycleAdapter` chosen by the probe.

mod completion;
pub mod legacy;
pub mod typed;

pub use legacy::LegacyAdapter;
pub use typed::TypedAdapter;

use crate::compiler::{
    ChunkAssetsHandler, Compilation, CompilationHandler, Compiler, ModuleHandler,
};
use crate::error::{HostError, OutputTransformError};
use crate::transform::AssetTransformEngine;
use std::sync::Arc;

/// Registration protocol offered by a host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Typed hook objects with tap-style registration
    Typed,
    /// String-keyed events with explicit completion callbacks
    Legacy,
}

/// Lifecycle registration, normalized across protocols
///
/// Handlers passed to `on_chunk_assets_optimized` are synchronous: once they
/// return the stage is done, and the adapter signals completion to the host in
/// whatever way its protocol demands.
pub trait LifecycleAdapter: Send + Sync {
    fn protocol(&self) -> Protocol;

    fn on_compilation_created(
        &self,
        compiler: &mut Compiler,
        handler: CompilationHandler,
    ) -> Result<(), HostError>;

    fn on_module_built(
        &self,
        compilation: &mut Compilation,
        handler: ModuleHandler,
    ) -> Result<(), HostError>;

    fn on_chunk_assets_optimized(
        &self,
        compilation: &mut Compilation,
        handler: ChunkAssetsHandler,
    ) -> Result<(), HostError>;
}

/// Pick the adapter for a host: typed hooks win, the legacy registry is the
/// fallback, anything else cannot be attached to
pub fn detect(compiler: &Compiler, name: &str) -> Option<Arc<dyn LifecycleAdapter>> {
    if compiler.hooks.is_some() {
        Some(Arc::new(TypedAdapter::new(name)))
    } else if compiler.events.is_some() {
        Some(Arc::new(LegacyAdapter))
    } else {
        None
    }
}

/// Wire the transform stage into every compilation the compiler creates
///
/// Per compilation: optionally mark built modules as wanting source maps, then
/// run the engine once chunk assets are optimized. Per-build state lives on the
/// compilation only. A compilation that refuses either registration fails the
/// build with the host error.
pub fn attach(
    adapter: Arc<dyn LifecycleAdapter>,
    compiler: &mut Compiler,
    engine: Arc<AssetTransformEngine>,
    module_source_maps: bool,
) -> Result<(), OutputTransformError> {
    let protocol = adapter.protocol();
    let registrar = adapter.clone();

    adapter.on_compilation_created(
        compiler,
        Box::new(move |compilation| {
            tracing::debug!(?protocol, "Compilation created");

            if module_source_maps {
                registrar.on_module_built(
                    compilation,
                    Box::new(|module| module.use_source_map = true),
                )?;
            }

            let engine = engine.clone();
            registrar.on_chunk_assets_optimized(
                compilation,
                Box::new(move |context, chunks| {
                    engine.optimize_chunk_assets(context, chunks);
                }),
            )
        }),
    )?;

    tracing::debug!(?protocol, "Attached output transform stage");
    Ok(())
}
