//! Log format codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ngxlog_bench::{combined_lines, json_lines, random_combined_record};
use ngxlog_codec::{compile, CompiledFormat, COMBINED_FORMAT};

const JSON_FORMAT: &str = r#"escape=json;{"key":"$key","value":"$value"}"#;

/// Benchmark template compilation.
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    group.bench_function("combined", |b| {
        b.iter(|| {
            let format = compile(black_box(COMBINED_FORMAT)).unwrap();
            black_box(format);
        });
    });

    group.bench_function("json", |b| {
        b.iter(|| {
            let format = compile(black_box(JSON_FORMAT)).unwrap();
            black_box(format);
        });
    });

    group.finish();
}

/// Benchmark parsing.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for count in [1usize, 100] {
        let lines = combined_lines(count);
        let bytes: usize = lines.iter().map(String::len).sum();
        group.throughput(Throughput::Bytes(bytes as u64));
        group.bench_with_input(BenchmarkId::new("combined", count), &lines, |b, lines| {
            let format = CompiledFormat::combined();
            b.iter(|| {
                for line in lines {
                    black_box(format.parse(black_box(line)).unwrap());
                }
            });
        });
    }

    let format = compile(JSON_FORMAT).unwrap();
    let lines = json_lines(&format, 100);
    group.bench_with_input(BenchmarkId::new("json", 100), &lines, |b, lines| {
        b.iter(|| {
            for line in lines {
                black_box(format.parse(black_box(line)).unwrap());
            }
        });
    });

    group.bench_function("template_as_data", |b| {
        b.iter(|| black_box(ngxlog_codec::parse(black_box(COMBINED_FORMAT)).unwrap()));
    });

    group.finish();
}

/// Benchmark rendering.
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    group.bench_function("combined", |b| {
        let record = random_combined_record(&mut rand::thread_rng());
        let format = CompiledFormat::combined();
        b.iter(|| black_box(format.render(black_box(&record))));
    });

    group.bench_function("render_to_reused_buffer", |b| {
        let record = random_combined_record(&mut rand::thread_rng());
        let format = CompiledFormat::combined();
        let mut out = String::with_capacity(256);
        b.iter(|| {
            out.clear();
            format.render_to(black_box(&record), &mut out).unwrap();
            black_box(&out);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_parse, bench_render);
criterion_main!(benches);
