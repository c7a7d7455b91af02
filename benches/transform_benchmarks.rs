use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use output_transform_plugin::compiler::AssetTable;
use output_transform_plugin::transform::AssetTransformEngine;
use output_transform_plugin::{
    BuildInput, Chunk, CompilationContext, Compiler, OutputTransformPlugin, PluginOptions,
    RawSource, SharedSource, TransformError, TransformOptions, TransformOutput,
};
use serde_json::json;
use std::hint::black_box;
use std::sync::Arc;

const CHUNK_SIZES: [usize; 3] = [1, 16, 128];

fn identity(source: &str, _: &TransformOptions) -> Result<TransformOutput, TransformError> {
    Ok(TransformOutput {
        code: source.to_string(),
        map: None,
    })
}

fn chunk_file(i: usize) -> String {
    format!(
        "function handler{i}(event) {{\n  const payload = {{ id: {i}, kind: event.type }};\n  return Object.assign({{}}, payload, event.detail);\n}}\n"
    )
}

/// One chunk with `count` script files plus a stylesheet that is never selected
fn build_input(count: usize) -> (Vec<Chunk>, AssetTable) {
    let mut assets = AssetTable::new();
    let mut files = Vec::with_capacity(count + 1);
    for i in 0..count {
        let name = format!("chunk-{i}.js");
        let asset: SharedSource = Arc::new(RawSource::new(chunk_file(i)));
        assets.insert(name.clone(), asset);
        files.push(name);
    }
    let css: SharedSource = Arc::new(RawSource::new("body{margin:0}"));
    assets.insert("main.css".to_string(), css);
    files.push("main.css".to_string());

    (vec![Chunk::new("main", files)], assets)
}

fn bench_engine_pass(c: &mut Criterion) {
    let engine = AssetTransformEngine::new(&PluginOptions::default(), Box::new(identity));

    let mut group = c.benchmark_group("engine_pass_identity");
    for count in CHUNK_SIZES {
        let (chunks, assets) = build_input(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter_batched(
                || CompilationContext::new(assets.clone()),
                |mut context| black_box(engine.optimize_chunk_assets(&mut context, &chunks)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_oxc_build(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to construct benchmark runtime");

    let options = PluginOptions::default()
        .with_transform_options(json!({ "target": "es2015", "sourceMaps": true }));
    let mut compiler = Compiler::typed();
    OutputTransformPlugin::new(options)
        .apply(&mut compiler)
        .expect("plugin should attach");

    let mut group = c.benchmark_group("oxc_build");
    group.sample_size(20);
    for count in CHUNK_SIZES {
        let (chunks, assets) = build_input(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter_batched(
                || BuildInput {
                    chunks: chunks.clone(),
                    assets: assets.clone(),
                    ..Default::default()
                },
                |input| {
                    let compilation = runtime
                        .block_on(compiler.run(input))
                        .expect("build should finish");
                    assert!(compilation.context.errors.is_empty());
                    black_box(compilation)
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_engine_pass, bench_oxc_build);
criterion_main!(benches);
