//! Lowering throughput (bytes/sec) over synthetic sources.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use esdown_core::{LoweringOptions, SourceInput, lower_source, lower_sources};

const SMALL_SOURCE: &str = r#"
var {a, b} = foo();
let [first, , third, ...others] = list;
const {config: {host, port}, retries} = load();
[x, y] = [y, x];
"#;

fn generate_source(functions: usize, sites_per_function: usize) -> String {
    let mut source = String::new();
    for f in 0..functions {
        source.push_str(&format!("function f{f}(input) {{\n"));
        for s in 0..sites_per_function {
            source.push_str(&format!(
                "  let {{a{s}, b{s}: [c{s}, ...d{s}]}} = input.get({s});\n"
            ));
            source.push_str(&format!("  [p{s}, q{s}] = [q{s}, p{s}];\n"));
        }
        source.push_str("  return input;\n}\n");
    }
    source
}

fn bench_lower_small(c: &mut Criterion) {
    let options = LoweringOptions::default();
    c.bench_function("lower_small", |b| {
        b.iter(|| black_box(lower_source("bench.js", SMALL_SOURCE, &options)))
    });
}

fn bench_lower_throughput(c: &mut Criterion) {
    let options = LoweringOptions::default();
    let mut group = c.benchmark_group("lowering_throughput");

    for (functions, sites) in [(10, 5), (50, 5), (100, 10)] {
        let source = generate_source(functions, sites);
        let label = format!("{functions}fn_{sites}site");
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("lower", &label), &source, |b, source| {
            b.iter(|| black_box(lower_source("bench.js", source, &options)))
        });
    }

    group.finish();
}

fn bench_lower_many_files(c: &mut Criterion) {
    let options = LoweringOptions::default();
    let inputs: Vec<SourceInput> = (0..32)
        .map(|i| SourceInput::new(format!("file{i}.js"), generate_source(10, 5)))
        .collect();
    let bytes: usize = inputs.iter().map(|input| input.text.len()).sum();

    let mut group = c.benchmark_group("lowering_parallel");
    group.throughput(Throughput::Bytes(bytes as u64));
    group.bench_function("lower_sources_32", |b| {
        b.iter(|| black_box(lower_sources(&inputs, &options)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_lower_small,
    bench_lower_throughput,
    bench_lower_many_files
);
criterion_main!(benches);
