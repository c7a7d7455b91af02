// Typed tap-style protocol

use super::{LifecycleAdapter, Protocol};
use crate::compiler::{
    ChunkAssetsHandler, Compilation, CompilationHandler, Compiler, ModuleHandler, TapOptions,
};
use crate::error::HostError;

/// Registers through the `hooks` objects, identified by a tap name
pub struct TypedAdapter {
    tap: TapOptions,
}

impl TypedAdapter {
    pub fn new(name: &str) -> Self {
        Self { tap: name.into() }
    }
}

impl LifecycleAdapter for TypedAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Typed
    }

    fn on_compilation_created(
        &self,
        compiler: &mut Compiler,
        handler: CompilationHandler,
    ) -> Result<(), HostError> {
        let hooks = compiler.hooks.as_mut().ok_or_else(|| HostError::MissingHooks {
            event: "compilation".to_string(),
        })?;
        hooks.compilation.tap(self.tap.clone(), handler);
        Ok(())
    }

    fn on_module_built(
        &self,
        compilation: &mut Compilation,
        handler: ModuleHandler,
    ) -> Result<(), HostError> {
        let hooks = compilation.hooks.as_mut().ok_or_else(|| HostError::MissingHooks {
            event: "buildModule".to_string(),
        })?;
        hooks.build_module.tap(self.tap.clone(), handler);
        Ok(())
    }

    fn on_chunk_assets_optimized(
        &self,
        compilation: &mut Compilation,
        handler: ChunkAssetsHandler,
    ) -> Result<(), HostError> {
        let hooks = compilation.hooks.as_mut().ok_or_else(|| HostError::MissingHooks {
            event: "afterOptimizeChunkAssets".to_string(),
        })?;
        // return implies done
        hooks.after_optimize_chunk_assets.tap(self.tap.clone(), handler);
        Ok(())
    }
}
