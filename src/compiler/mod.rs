// Bundler host model
//
// The bundler itself (graph, codegen, minification) is a black box to the
// transform stage. This module models the surface the stage consumes: the
// top-level compiler with one of two registration protocols, the per-build
// compilation, and in-memory output assets.

pub mod compilation;
pub mod source;
pub mod tapable;

pub use compilation::{
    AssetTable, Chunk, Compilation, CompilationContext, CompilationError, Module,
};
pub use source::{RawSource, SharedSource, Source, SourceAndMap, SourceMapSource};
pub use tapable::{
    Callback, ChunkAssetsHandler, CompilationHandler, CompilationHooks, CompilerHooks,
    EventRegistry, LegacyChunkAssetsHandler, LegacyHandler, ModuleHandler, SyncHook, TapOptions,
};

use crate::error::HostError;

/// Everything a build feeds into the optimization stage
#[derive(Debug, Default)]
pub struct BuildInput {
    pub modules: Vec<Module>,
    pub chunks: Vec<Chunk>,
    pub assets: AssetTable,
    pub additional_chunk_assets: Vec<String>,
}

/// Top-level bundler controller
///
/// Current hosts expose typed `hooks`; older hosts only offer the string-keyed
/// `events` registry.
#[derive(Default)]
pub struct Compiler {
    pub hooks: Option<CompilerHooks>,
    pub events: Option<EventRegistry>,
}

impl Compiler {
    /// Host with typed tap-style hooks
    pub fn typed() -> Self {
        Self {
            hooks: Some(CompilerHooks::default()),
            events: None,
        }
    }

    /// Host with legacy `plugin(event, handler)` registration
    pub fn legacy() -> Self {
        Self {
            hooks: None,
            events: Some(EventRegistry::new()),
        }
    }

    /// Host exposing no registration surface at all
    pub fn detached() -> Self {
        Self::default()
    }

    /// Run one build through compilation creation, module building and chunk
    /// asset optimization, returning the compilation ready for emit
    ///
    /// Every call starts from a fresh compilation; nothing carries over from
    /// previous runs.
    pub async fn run(&self, input: BuildInput) -> Result<Compilation, HostError> {
        let BuildInput {
            mut modules,
            chunks,
            assets,
            additional_chunk_assets,
        } = input;

        let mut context = CompilationContext::new(assets);
        context.additional_chunk_assets = additional_chunk_assets;

        let mut compilation = if self.hooks.is_some() {
            Compilation::typed(context)
        } else {
            Compilation::legacy(context)
        };

        if let Some(hooks) = &self.hooks {
            hooks.compilation.call(&mut compilation)?;
        } else if let Some(events) = &self.events {
            for handler in events.compilation_handlers() {
                handler(&mut compilation)?;
            }
        }

        for module in &mut modules {
            compilation.build_module(module);
        }

        compilation.optimize_chunk_assets(&chunks).await?;

        tracing::debug!(
            assets = compilation.context.assets.len(),
            errors = compilation.context.errors.len(),
            "Compilation ready for emit"
        );

        compilation.modules = modules;
        compilation.chunks = chunks;
        Ok(compilation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn typed_run_fires_compilation_hook() {
        let mut compiler = Compiler::typed();
        compiler.hooks.as_mut().unwrap().compilation.tap(
            "marker",
            Box::new(|c: &mut Compilation| -> Result<(), HostError> {
                c.context
                    .assets
                    .insert("marker.js".into(), Arc::new(RawSource::new("")));
                Ok(())
            }),
        );

        let compilation = compiler.run(BuildInput::default()).await.unwrap();
        assert!(compilation.hooks.is_some());
        assert!(compilation.context.assets.contains_key("marker.js"));
    }

    #[tokio::test]
    async fn legacy_run_creates_legacy_compilation() {
        let compiler = Compiler::legacy();
        let compilation = compiler
            .run(BuildInput {
                modules: vec![Module::new("./a.js")],
                chunks: vec![Chunk::new("main", ["main.js"])],
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(compilation.hooks.is_none());
        assert!(compilation.events.is_some());
        assert_eq!(compilation.modules.len(), 1);
        assert!(!compilation.modules[0].use_source_map);
        assert_eq!(compilation.chunks[0].files, vec!["main.js"]);
    }

    #[tokio::test]
    async fn failing_compilation_handler_aborts_run() {
        let mut compiler = Compiler::legacy();
        compiler
            .events
            .as_mut()
            .unwrap()
            .plugin(
                tapable::COMPILATION_EVENT,
                LegacyHandler::Compilation(Box::new(
                    |_: &mut Compilation| -> Result<(), HostError> {
                        Err(HostError::MissingHooks {
                            event: "build-module".into(),
                        })
                    },
                )),
            )
            .unwrap();

        let err = compiler.run(BuildInput::default()).await.unwrap_err();
        assert!(matches!(err, HostError::MissingHooks { .. }));
    }

    #[tokio::test]
    async fn runs_do_not_share_compilations() {
        let compiler = Compiler::typed();
        let mut input = BuildInput::default();
        input
            .assets
            .insert("a.js".into(), Arc::new(RawSource::new("a")));
        let first = compiler.run(input).await.unwrap();
        let second = compiler.run(BuildInput::default()).await.unwrap();

        assert_eq!(first.context.assets.len(), 1);
        assert!(second.context.assets.is_empty());
    }
}
