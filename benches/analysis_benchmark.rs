//! Benchmarks for the analysis pipeline
//!
//! - Parsing and lowering to the typed AST
//! - Index construction
//! - Scope resolution
//! - CST snapshot copy
//! - Completion at a dangling member access
//!
//! Run with: cargo bench --bench analysis_benchmark

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use jsinsight::backend::Analysis;
use jsinsight::config::AnalysisConfig;
use jsinsight::ir::index::build_index;
use jsinsight::ir::transforms::scope_resolver::resolve;
use jsinsight::parsers::javascript::parse_program;
use jsinsight::snapshot::SnapshotParser;

/// Module-sized source with nested functions, blocks and object literals.
fn generate_test_javascript(function_count: usize) -> String {
    let mut code = String::from("const registry = { size: 0, items: [] };\n");
    for i in 0..function_count {
        code.push_str(&format!(
            r#"
function handler{i}(event, options) {{
  let total = 0;
  for (let j = 0; j < event.items.length; j++) {{
    const item = event.items[j];
    if (item.enabled) {{
      var last = item;
      total += item.weight * options.scale;
    }}
  }}
  try {{
    registry.items.push({{ id: {i}, total, last }});
  }} catch (err) {{
    console.error(err);
  }}
  return (value) => total + value;
}}
"#
        ));
    }
    code.push_str("registry.");
    code
}

fn bench_parse_and_lower(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_and_lower");
    for size in [10, 100, 500] {
        let code = generate_test_javascript(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &code, |b, code| {
            b.iter(|| black_box(parse_program(black_box(code)).unwrap()));
        });
    }
    group.finish();
}

fn bench_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");
    for size in [10, 100, 500] {
        let code = generate_test_javascript(size);
        let parsed = parse_program(&code).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &code, |b, code| {
            b.iter(|| black_box(build_index(&parsed.program, code)));
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for size in [10, 100, 500] {
        let code = generate_test_javascript(size);
        let parsed = parse_program(&code).unwrap();
        let index = build_index(&parsed.program, &code);
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| black_box(resolve(&parsed.program, &index)));
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut parser = SnapshotParser::new().unwrap();
    let code = generate_test_javascript(100);
    c.bench_function("snapshot_100", |b| {
        b.iter(|| black_box(parser.parse(black_box(code.as_bytes()))));
    });
}

fn bench_completion(c: &mut Criterion) {
    let code = generate_test_javascript(100);
    let analysis = Analysis::build(&code, 0, &AnalysisConfig::default()).unwrap();
    let row = code.lines().count() - 1;
    let col = code.lines().last().map_or(0, str::len);
    c.bench_function("complete_member_100", |b| {
        b.iter(|| black_box(analysis.complete_at(row, col, None)));
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets =
        bench_parse_and_lower,
        bench_build_index,
        bench_resolve,
        bench_snapshot,
        bench_completion
);

criterion_main!(benches);
