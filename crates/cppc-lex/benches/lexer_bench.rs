//! Lexer throughput benchmarks.
//!
//! The hot path is `Lexer::lex` driven to exhaustion; per-byte cost here
//! dominates everything downstream (spec.md §4.6). Run with:
//! `cargo bench --bench lexer_bench`.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use cppc_lex::{Lexer, StubPreprocessor, Token, TokenKind};
use cppc_util::{Handler, IdentifierTable, LangOptions, SourceLocation};

fn lex_token_count(source: &str) -> usize {
    let mut buf = source.as_bytes().to_vec();
    buf.push(0);
    let handler = Handler::new(LangOptions::new());
    let identifiers = IdentifierTable::new();
    let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
    let mut pp = StubPreprocessor::new();
    let mut count = 0;
    loop {
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        count += 1;
        if tok.is(TokenKind::Eof) {
            break;
        }
    }
    count
}

fn bench_lexer_identifiers_and_keywords(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let source = "int x = 42; int add(int a, int b) { return a + b; }";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("short_decl", |b| b.iter(|| lex_token_count(black_box("int x = 42;"))));

    group.bench_function("function_with_body", |b| b.iter(|| lex_token_count(black_box(source))));

    group.finish();
}

fn bench_lexer_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_complex");

    let source = r#"
        #include <stdio.h>

        struct point {
            int x;
            int y;
        };

        enum color { RED, GREEN, BLUE };

        int distance(struct point a, struct point b) {
            int dx = a.x - b.x;
            int dy = a.y - b.y;
            return dx * dx + dy * dy;
        }

        int main(void) {
            struct point origin = { 0, 0 };
            printf("%d\n", distance(origin, origin));
            return 0;
        }
    "#;

    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("complex_source", |b| b.iter(|| lex_token_count(black_box(source))));

    group.finish();
}

fn bench_lexer_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_strings");

    group.bench_function("short_string", |b| b.iter(|| lex_token_count(black_box(r#"char *s = "hello";"#))));

    group.bench_function("long_string", |b| {
        let source = r#"char *s = "This is a longer string that contains some text for benchmarking purposes.";"#;
        b.iter(|| lex_token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_numbers");

    group.bench_function("integer", |b| b.iter(|| lex_token_count(black_box("int x = 123456;"))));

    group.bench_function("float", |b| b.iter(|| lex_token_count(black_box("double x = 3.14159;"))));

    group.bench_function("hex", |b| b.iter(|| lex_token_count(black_box("unsigned x = 0xDEADBEEF;"))));

    group.finish();
}

fn bench_lexer_trigraphs_and_splices(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_cleaning");

    group.bench_function("trigraph_heavy", |b| {
        b.iter(|| lex_token_count(black_box("??=define X 1\nint a??(10??) = {0};")))
    });

    group.bench_function("line_splice_heavy", |b| {
        b.iter(|| lex_token_count(black_box("int ab\\\ncd = 1\\\n0;")))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_identifiers_and_keywords,
    bench_lexer_complex,
    bench_lexer_strings,
    bench_lexer_numbers,
    bench_lexer_trigraphs_and_splices
);
criterion_main!(benches);
