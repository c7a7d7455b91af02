// Host registration surfaces: typed tap-style hooks and the legacy
// string-keyed event registry

use super::compilation::{Chunk, Compilation, CompilationContext, Module};
use crate::error::HostError;

/// Handler fired when a compilation is created
///
/// An error aborts the build.
pub type CompilationHandler = Box<dyn Fn(&mut Compilation) -> Result<(), HostError> + Send + Sync>;

/// Handler fired after a module is built
pub type ModuleHandler = Box<dyn Fn(&mut Module) + Send + Sync>;

/// Handler fired once chunk assets are optimized (typed protocol)
pub type ChunkAssetsHandler = Box<dyn Fn(&mut CompilationContext, &[Chunk]) + Send + Sync>;

/// Completion callback handed to legacy asynchronous handlers
///
/// `None` signals success; the host waits for this before emitting.
pub type Callback = Box<dyn FnOnce(Option<HostError>) + Send>;

/// Handler fired once chunk assets are optimized (legacy protocol)
pub type LegacyChunkAssetsHandler =
    Box<dyn Fn(&mut CompilationContext, &[Chunk], Callback) + Send + Sync>;

/// Legacy event names
pub const COMPILATION_EVENT: &str = "compilation";
pub const BUILD_MODULE_EVENT: &str = "build-module";
pub const OPTIMIZE_CHUNK_ASSETS_EVENT: &str = "optimize-chunk-assets";

const KNOWN_EVENTS: &[&str] = &[
    COMPILATION_EVENT,
    BUILD_MODULE_EVENT,
    OPTIMIZE_CHUNK_ASSETS_EVENT,
];

/// Registration handle for a typed tap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapOptions {
    /// Plugin name, used for diagnostics
    pub name: String,

    /// Lower stages run first; equal stages keep registration order
    pub stage: i32,
}

impl From<&str> for TapOptions {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stage: 0,
        }
    }
}

struct Tap<F: ?Sized> {
    options: TapOptions,
    handler: Box<F>,
}

/// Synchronous typed hook: handlers run in stage order, return implies done
pub struct SyncHook<F: ?Sized> {
    taps: Vec<Tap<F>>,
}

impl<F: ?Sized> SyncHook<F> {
    pub fn new() -> Self {
        Self { taps: Vec::new() }
    }

    /// Register a handler
    pub fn tap(&mut self, options: impl Into<TapOptions>, handler: Box<F>) {
        let options = options.into();
        tracing::debug!(plugin = %options.name, stage = options.stage, "Tapped hook");

        // keep registration order within a stage
        let index = self
            .taps
            .iter()
            .position(|t| t.options.stage > options.stage)
            .unwrap_or(self.taps.len());
        self.taps.insert(index, Tap { options, handler });
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Names of registered taps, in call order
    pub fn tap_names(&self) -> Vec<&str> {
        self.taps.iter().map(|t| t.options.name.as_str()).collect()
    }

    fn handlers(&self) -> impl Iterator<Item = &F> {
        self.taps.iter().map(|t| t.handler.as_ref())
    }
}

impl<F: ?Sized> Default for SyncHook<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncHook<dyn Fn(&mut Compilation) -> Result<(), HostError> + Send + Sync> {
    /// Stops at the first failing handler
    pub fn call(&self, compilation: &mut Compilation) -> Result<(), HostError> {
        for handler in self.handlers() {
            handler(compilation)?;
        }
        Ok(())
    }
}

impl SyncHook<dyn Fn(&mut Module) + Send + Sync> {
    pub fn call(&self, module: &mut Module) {
        for handler in self.handlers() {
            handler(module);
        }
    }
}

impl SyncHook<dyn Fn(&mut CompilationContext, &[Chunk]) + Send + Sync> {
    pub fn call(&self, context: &mut CompilationContext, chunks: &[Chunk]) {
        for handler in self.handlers() {
            handler(context, chunks);
        }
    }
}

/// Typed hooks exposed by the top-level compiler
#[derive(Default)]
pub struct CompilerHooks {
    pub compilation: SyncHook<dyn Fn(&mut Compilation) -> Result<(), HostError> + Send + Sync>,
}

/// Typed hooks exposed by a compilation
#[derive(Default)]
pub struct CompilationHooks {
    pub build_module: SyncHook<dyn Fn(&mut Module) + Send + Sync>,
    pub after_optimize_chunk_assets: SyncHook<dyn Fn(&mut CompilationContext, &[Chunk]) + Send + Sync>,
}

/// Handler shapes accepted by the legacy registry
pub enum LegacyHandler {
    Compilation(CompilationHandler),
    BuildModule(ModuleHandler),
    OptimizeChunkAssets(LegacyChunkAssetsHandler),
}

impl LegacyHandler {
    /// The event this handler shape belongs to
    pub fn event(&self) -> &'static str {
        match self {
            Self::Compilation(_) => COMPILATION_EVENT,
            Self::BuildModule(_) => BUILD_MODULE_EVENT,
            Self::OptimizeChunkAssets(_) => OPTIMIZE_CHUNK_ASSETS_EVENT,
        }
    }
}

/// Legacy `plugin(eventName, handler)` registration surface
#[derive(Default)]
pub struct EventRegistry {
    handlers: Vec<LegacyHandler>,
    registrations: usize,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a string event name
    pub fn plugin(&mut self, event: &str, handler: LegacyHandler) -> Result<(), HostError> {
        self.registrations += 1;

        if !KNOWN_EVENTS.contains(&event) {
            return Err(HostError::UnknownEvent(event.to_string()));
        }
        if handler.event() != event {
            return Err(HostError::HandlerMismatch {
                event: event.to_string(),
            });
        }

        tracing::debug!(event, "Registered legacy plugin handler");
        self.handlers.push(handler);
        Ok(())
    }

    /// Number of `plugin` calls made, accepted or not
    pub fn registration_count(&self) -> usize {
        self.registrations
    }

    pub fn compilation_handlers(&self) -> impl Iterator<Item = &CompilationHandler> {
        self.handlers.iter().filter_map(|h| match h {
            LegacyHandler::Compilation(f) => Some(f),
            _ => None,
        })
    }

    pub fn build_module_handlers(&self) -> impl Iterator<Item = &ModuleHandler> {
        self.handlers.iter().filter_map(|h| match h {
            LegacyHandler::BuildModule(f) => Some(f),
            _ => None,
        })
    }

    pub fn optimize_chunk_assets_handlers(
        &self,
    ) -> impl Iterator<Item = &LegacyChunkAssetsHandler> {
        self.handlers.iter().filter_map(|h| match h {
            LegacyHandler::OptimizeChunkAssets(f) => Some(f),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn taps_run_in_stage_order() {
        let mut hook: SyncHook<dyn Fn(&mut Module) + Send + Sync> = SyncHook::new();
        hook.tap("late", Box::new(|_| {}));
        hook.tap(
            TapOptions {
                name: "early".to_string(),
                stage: -10,
            },
            Box::new(|_| {}),
        );
        hook.tap("late-too", Box::new(|_| {}));

        assert_eq!(hook.tap_names(), vec!["early", "late", "late-too"]);
        assert_eq!(hook.len(), 3);
    }

    #[test]
    fn module_hook_calls_every_tap() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut hook: SyncHook<dyn Fn(&mut Module) + Send + Sync> = SyncHook::new();
        for _ in 0..2 {
            let calls = calls.clone();
            hook.tap(
                "counter",
                Box::new(move |m: &mut Module| {
                    m.use_source_map = true;
                    calls.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        let mut module = Module::new("./src/index.js");
        hook.call(&mut module);
        assert!(module.use_source_map);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn registry_rejects_unknown_events() {
        let mut registry = EventRegistry::new();
        let err = registry
            .plugin("emit", LegacyHandler::BuildModule(Box::new(|_| {})))
            .unwrap_err();
        assert!(matches!(err, HostError::UnknownEvent(name) if name == "emit"));
        assert_eq!(registry.registration_count(), 1);
    }

    #[test]
    fn registry_rejects_mismatched_handler() {
        let mut registry = EventRegistry::new();
        let err = registry
            .plugin(
                OPTIMIZE_CHUNK_ASSETS_EVENT,
                LegacyHandler::BuildModule(Box::new(|_| {})),
            )
            .unwrap_err();
        assert!(matches!(err, HostError::HandlerMismatch { .. }));
        assert_eq!(registry.optimize_chunk_assets_handlers().count(), 0);
    }

    #[test]
    fn registry_groups_handlers_by_event() {
        let mut registry = EventRegistry::new();
        registry
            .plugin(BUILD_MODULE_EVENT, LegacyHandler::BuildModule(Box::new(|_| {})))
            .unwrap();
        registry
            .plugin(
                OPTIMIZE_CHUNK_ASSETS_EVENT,
                LegacyHandler::OptimizeChunkAssets(Box::new(|_, _, done| done(None))),
            )
            .unwrap();

        assert_eq!(registry.build_module_handlers().count(), 1);
        assert_eq!(registry.optimize_chunk_assets_handlers().count(), 1);
        assert_eq!(registry.compilation_handlers().count(), 0);
        assert_eq!(registry.registration_count(), 2);
    }
}
