//! `IdentifierTable` interning throughput.
//!
//! Every identifier token the lexer produces passes through this table, so
//! per-probe latency dominates lexer throughput (spec.md §4.5). Run with:
//! `cargo bench --bench identifier_bench`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cppc_util::IdentifierTable;

fn bench_intern_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern_miss");
    group.throughput(Throughput::Elements(1));
    group.bench_function("new_spelling", |b| {
        let table = IdentifierTable::new();
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            black_box(table.get(&format!("identifier_{counter}")))
        });
    });
    group.finish();
}

fn bench_intern_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern_hit");
    group.throughput(Throughput::Elements(1));
    for len in [4usize, 16, 64] {
        let spelling = "x".repeat(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &spelling, |b, spelling| {
            let table = IdentifierTable::new();
            table.get(spelling);
            b.iter(|| black_box(table.get(spelling)));
        });
    }
    group.finish();
}

fn bench_keyword_like_workload(c: &mut Criterion) {
    const KEYWORDS: &[&str] =
        &["if", "else", "while", "for", "int", "char", "struct", "return", "void", "static"];
    c.bench_function("keyword_workload", |b| {
        let table = IdentifierTable::new();
        for kw in KEYWORDS {
            table.get(kw);
        }
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % KEYWORDS.len();
            black_box(table.get(KEYWORDS[i]))
        });
    });
}

criterion_group!(benches, bench_intern_miss, bench_intern_hit, bench_keyword_like_workload);
criterion_main!(benches);
