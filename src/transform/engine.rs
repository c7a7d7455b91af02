// Asset transform engine: selects finalized chunk files and replaces them with
// transformed output

use super::{TransformOptions, Transformer};
use crate::compiler::{
    Chunk, CompilationContext, CompilationError, RawSource, SharedSource, Source, SourceAndMap,
    SourceMapSource,
};
use crate::config::{FilenamePattern, PluginOptions};
use crate::error::OutputTransformError;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// What happened to one selected asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Replaced by a map-carrying asset
    Mapped,
    /// Replaced by a plain-text asset
    Unmapped,
}

/// Counts for one optimization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformSummary {
    pub selected: usize,
    pub mapped: usize,
    pub unmapped: usize,
    pub failed: usize,
}

impl TransformSummary {
    pub fn transformed(&self) -> usize {
        self.mapped + self.unmapped
    }
}

/// Applies a transformer to the chunk assets selected by a filename pattern
pub struct AssetTransformEngine {
    test: FilenamePattern,
    base_options: Arc<Value>,
    transformer: Box<dyn Transformer>,
}

impl AssetTransformEngine {
    pub fn new(options: &PluginOptions, transformer: Box<dyn Transformer>) -> Self {
        Self {
            test: options.test.clone(),
            base_options: Arc::new(options.transform_options.clone()),
            transformer,
        }
    }

    /// Deduplicated chunk files plus chunk-independent files, filtered by the
    /// pattern. First occurrence wins the position.
    pub fn select_files(&self, context: &CompilationContext, chunks: &[Chunk]) -> Vec<String> {
        let mut seen = HashSet::new();

        chunks
            .iter()
            .flat_map(|chunk| chunk.files.iter())
            .chain(context.additional_chunk_assets.iter())
            .filter(|file| self.test.is_match(file))
            .filter(|file| seen.insert(file.as_str()))
            .cloned()
            .collect()
    }

    /// Transform every selected file, recording per-file failures on the
    /// compilation instead of returning them
    pub fn optimize_chunk_assets(
        &self,
        context: &mut CompilationContext,
        chunks: &[Chunk],
    ) -> TransformSummary {
        let files = self.select_files(context, chunks);
        let mut summary = TransformSummary {
            selected: files.len(),
            ..Default::default()
        };

        for filename in &files {
            match self.transform_asset(context, filename) {
                Ok(AssetOutcome::Mapped) => summary.mapped += 1,
                Ok(AssetOutcome::Unmapped) => summary.unmapped += 1,
                Err(err) => {
                    summary.failed += 1;
                    report_error(context, err);
                }
            }
        }

        tracing::info!(
            selected = summary.selected,
            transformed = summary.transformed(),
            failed = summary.failed,
            "Chunk asset transform pass finished"
        );
        summary
    }

    /// Transform a single asset in place
    ///
    /// On error the asset table is left untouched.
    pub fn transform_asset(
        &self,
        context: &mut CompilationContext,
        filename: &str,
    ) -> Result<AssetOutcome, OutputTransformError> {
        let asset = context.assets.get(filename).cloned().ok_or_else(|| {
            OutputTransformError::AssetNotFound {
                filename: filename.to_string(),
            }
        })?;

        let SourceAndMap {
            source,
            map: input_map,
        } = extract_source_and_map(asset.as_ref(), filename)?;

        tracing::debug!(
            file = %filename,
            size = source.len(),
            has_input_map = input_map.is_some(),
            "Transforming asset"
        );

        let options = TransformOptions::new(filename, self.base_options.clone())
            .with_input_source_map(input_map.clone());

        let output = self
            .transformer
            .transform(&source, &options)
            .map_err(|source| OutputTransformError::TransformFailure {
                filename: filename.to_string(),
                source,
            })?;

        let (replacement, outcome) = match output.map {
            Some(map) => {
                let asset: SharedSource = Arc::new(SourceMapSource::new(
                    output.code,
                    filename,
                    map,
                    source,
                    input_map,
                ));
                (asset, AssetOutcome::Mapped)
            }
            // no map produced: the output is unmapped from here on
            None => {
                let asset: SharedSource = Arc::new(RawSource::new(output.code));
                (asset, AssetOutcome::Unmapped)
            }
        };

        context.assets.insert(filename.to_string(), replacement);
        Ok(outcome)
    }
}

/// Read source and map so that the map describes exactly the text returned
fn extract_source_and_map(
    asset: &dyn Source,
    filename: &str,
) -> Result<SourceAndMap, OutputTransformError> {
    if let Some(both) = asset.source_and_map() {
        return Ok(both);
    }

    let source = asset.source().into_owned();
    let map = asset.map();

    // the separate accessors are only consistent if the text did not move
    // underneath the map read
    if map.is_some() && asset.source() != source.as_str() {
        return Err(OutputTransformError::MapInconsistency {
            filename: filename.to_string(),
        });
    }

    Ok(SourceAndMap { source, map })
}

/// Record a per-file failure on the compilation
pub fn report_error(context: &mut CompilationContext, error: OutputTransformError) {
    tracing::warn!(
        file = error.filename().unwrap_or("<none>"),
        error = %error,
        "Chunk asset left untransformed"
    );
    context.errors.push(CompilationError::from(&error));
}
