// Per-build compilation state

use super::source::SharedSource;
use super::tapable::{CompilationHooks, EventRegistry, OPTIMIZE_CHUNK_ASSETS_EVENT};
use crate::error::{HostError, OutputTransformError};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::oneshot;

/// Output filename -> asset
pub type AssetTable = HashMap<String, SharedSource>;

/// A group of output files produced from one or more modules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    pub name: String,
    /// Output filenames, in emission order
    pub files: Vec<String>,
}

impl Chunk {
    pub fn new<I, S>(name: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

/// A built input module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub identifier: String,
    /// Read by code generation to decide whether module maps are emitted
    pub use_source_map: bool,
}

impl Module {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            use_source_map: false,
        }
    }
}

/// Non-fatal error recorded on a compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    /// Output file the error is attributable to
    pub filename: Option<String>,
    pub message: String,
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filename {
            Some(filename) => write!(f, "{}: {}", filename, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl From<&OutputTransformError> for CompilationError {
    fn from(error: &OutputTransformError) -> Self {
        Self {
            filename: error.filename().map(str::to_string),
            message: error.to_string(),
        }
    }
}

/// The part of a compilation hooks may read and mutate
#[derive(Debug, Default)]
pub struct CompilationContext {
    pub assets: AssetTable,
    pub errors: Vec<CompilationError>,
    /// Output files not owned by any chunk
    pub additional_chunk_assets: Vec<String>,
}

impl CompilationContext {
    pub fn new(assets: AssetTable) -> Self {
        Self {
            assets,
            ..Default::default()
        }
    }
}

/// One build's compilation
///
/// Exactly one of `hooks` and `events` is populated, matching the protocol of
/// the compiler that created it.
pub struct Compilation {
    pub hooks: Option<CompilationHooks>,
    pub events: Option<EventRegistry>,
    pub context: CompilationContext,
    pub modules: Vec<Module>,
    pub chunks: Vec<Chunk>,
}

impl Compilation {
    /// Compilation exposing typed hooks
    pub fn typed(context: CompilationContext) -> Self {
        Self {
            hooks: Some(CompilationHooks::default()),
            events: None,
            context,
            modules: Vec::new(),
            chunks: Vec::new(),
        }
    }

    /// Compilation exposing the legacy event registry
    pub fn legacy(context: CompilationContext) -> Self {
        Self {
            hooks: None,
            events: Some(EventRegistry::new()),
            context,
            modules: Vec::new(),
            chunks: Vec::new(),
        }
    }

    /// Fire module-built handlers for one module
    pub fn build_module(&self, module: &mut Module) {
        if let Some(hooks) = &self.hooks {
            hooks.build_module.call(module);
        } else if let Some(events) = &self.events {
            for handler in events.build_module_handlers() {
                handler(module);
            }
        }
    }

    /// Fire chunk-assets-optimized handlers and wait until every one of them
    /// has completed
    pub async fn optimize_chunk_assets(&mut self, chunks: &[Chunk]) -> Result<(), HostError> {
        if let Some(hooks) = &self.hooks {
            hooks.after_optimize_chunk_assets.call(&mut self.context, chunks);
            return Ok(());
        }

        let Some(events) = &self.events else {
            return Ok(());
        };

        for handler in events.optimize_chunk_assets_handlers() {
            let (tx, rx) = oneshot::channel();
            handler(
                &mut self.context,
                chunks,
                Box::new(move |err| {
                    let _ = tx.send(err);
                }),
            );

            match rx.await {
                Ok(None) => {}
                Ok(Some(err)) => return Err(err),
                Err(_) => {
                    return Err(HostError::CompletionDropped {
                        event: OPTIMIZE_CHUNK_ASSETS_EVENT.to_string(),
                    })
                }
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Compilation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compilation")
            .field("typed", &self.hooks.is_some())
            .field("assets", &self.context.assets.len())
            .field("errors", &self.context.errors)
            .finish()
    }
}
