// OXC-backed transformer: parse, lower, print with an optional source map

use super::{TransformOptions, TransformOutput, Transformer};
use crate::error::TransformError;
use crate::source_map::parse_source_map;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions as OxcTransformOptions, Transformer as OxcPass};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Keys of the configuration blob this transformer understands; anything else
/// in the blob is ignored
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OxcConfig {
    /// Lowering preset, e.g. `es2015`
    target: Option<String>,
    /// Produce a source map for the output
    source_maps: bool,
}

impl OxcConfig {
    fn from_value(value: &Value) -> Result<Self, TransformError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(value).map_err(|e| TransformError::InvalidOptions(e.to_string()))
    }
}

/// Transformer backed by the OXC toolchain
///
/// The input map on `TransformOptions` is not consumed here: the produced map
/// describes the output in terms of the input text, and chaining to earlier
/// maps is done by the asset that receives the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcTransformer;

impl OxcTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for OxcTransformer {
    fn transform(
        &self,
        source: &str,
        options: &TransformOptions,
    ) -> Result<TransformOutput, TransformError> {
        let config = OxcConfig::from_value(options.config())?;

        let filename = options.filename();
        let source_type = SourceType::from_path(filename).unwrap_or_else(|_| SourceType::mjs());

        let allocator = Allocator::default();

        let parse_result = Parser::new(&allocator, source, source_type).parse();
        if !parse_result.errors.is_empty() {
            let errors: Vec<String> = parse_result.errors.iter().map(|e| e.to_string()).collect();
            return Err(TransformError::Syntax(errors.join("\n")));
        }
        let mut program = parse_result.program;

        let pass_options = match config.target.as_deref() {
            Some(target) => OxcTransformOptions::from_target(target)
                .map_err(|e| TransformError::InvalidOptions(e.to_string()))?,
            None => OxcTransformOptions::default(),
        };

        let scoping = SemanticBuilder::new()
            .build(&program)
            .semantic
            .into_scoping();
        let pass_result = OxcPass::new(&allocator, Path::new(filename), &pass_options)
            .build_with_scoping(scoping, &mut program);
        if !pass_result.errors.is_empty() {
            let errors: Vec<String> = pass_result.errors.iter().map(|e| e.to_string()).collect();
            return Err(TransformError::Transform(errors.join("\n")));
        }

        let codegen_options = CodegenOptions {
            source_map_path: config.source_maps.then(|| PathBuf::from(filename)),
            ..CodegenOptions::default()
        };
        let codegen = Codegen::new().with_options(codegen_options).build(&program);

        let map = codegen
            .map
            .map(|map| parse_source_map(&map.to_json_string()))
            .transpose()?;

        tracing::debug!(
            file = %filename,
            target = config.target.as_deref().unwrap_or("esnext"),
            has_map = map.is_some(),
            "OXC transform finished"
        );

        Ok(TransformOutput {
            code: codegen.code,
            map,
        })
    }
}
