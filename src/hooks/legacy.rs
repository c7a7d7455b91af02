// Legacy string-keyed protocol with explicit completion callbacks

use super::completion::Completion;
use super::{LifecycleAdapter, Protocol};
use crate::compiler::tapable::{BUILD_MODULE_EVENT, COMPILATION_EVENT, OPTIMIZE_CHUNK_ASSETS_EVENT};
use crate::compiler::{
    ChunkAssetsHandler, Compilation, CompilationHandler, Compiler, LegacyHandler, ModuleHandler,
};
use crate::error::HostError;

/// Registers through `plugin(event, handler)`
pub struct LegacyAdapter;

impl LifecycleAdapter for LegacyAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Legacy
    }

    fn on_compilation_created(
        &self,
        compiler: &mut Compiler,
        handler: CompilationHandler,
    ) -> Result<(), HostError> {
        let events = compiler.events.as_mut().ok_or_else(|| HostError::MissingHooks {
            event: COMPILATION_EVENT.to_string(),
        })?;
        events.plugin(COMPILATION_EVENT, LegacyHandler::Compilation(handler))
    }

    fn on_module_built(
        &self,
        compilation: &mut Compilation,
        handler: ModuleHandler,
    ) -> Result<(), HostError> {
        let events = compilation.events.as_mut().ok_or_else(|| HostError::MissingHooks {
            event: BUILD_MODULE_EVENT.to_string(),
        })?;
        events.plugin(BUILD_MODULE_EVENT, LegacyHandler::BuildModule(handler))
    }

    fn on_chunk_assets_optimized(
        &self,
        compilation: &mut Compilation,
        handler: ChunkAssetsHandler,
    ) -> Result<(), HostError> {
        let events = compilation.events.as_mut().ok_or_else(|| HostError::MissingHooks {
            event: OPTIMIZE_CHUNK_ASSETS_EVENT.to_string(),
        })?;

        events.plugin(
            OPTIMIZE_CHUNK_ASSETS_EVENT,
            LegacyHandler::OptimizeChunkAssets(Box::new(move |context, chunks, callback| {
                // fires on every exit path, including unwinding out of `handler`
                let completion = Completion::new(OPTIMIZE_CHUNK_ASSETS_EVENT, callback);
                handler(context, chunks);
                completion.complete();
            })),
        )
    }
}
