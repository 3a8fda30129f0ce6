use bazigate::config::normalize_base_url;
use bazigate::extract::extract;
use bazigate::schema::{result_schema, to_prompt_template, to_response_schema};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const PLAIN: &str = r#"{"bazi":{"year":"戊寅","month":"庚申","day":"丙午","hour":"乙未"},"recommendations":[]}"#;
const FENCED: &str = "```json\n{\"bazi\":{\"year\":\"戊寅\",\"month\":\"庚申\",\"day\":\"丙午\",\"hour\":\"乙未\"},\"recommendations\":[]}\n```";

fn bench_extract(c: &mut Criterion) {
    c.bench_function("extract_plain", |b| b.iter(|| extract(black_box(PLAIN))));

    c.bench_function("extract_fenced", |b| b.iter(|| extract(black_box(FENCED))));

    c.bench_function("extract_invalid", |b| {
        b.iter(|| extract(black_box("抱歉，我无法回答这个问题")))
    });
}

fn bench_normalize_base_url(c: &mut Criterion) {
    c.bench_function("normalize_trailing_slash", |b| {
        b.iter(|| normalize_base_url(black_box("https://api.example.com/")))
    });

    c.bench_function("normalize_already_normalized", |b| {
        b.iter(|| normalize_base_url(black_box("https://api.example.com/v1")))
    });
}

fn bench_schema_render(c: &mut Criterion) {
    c.bench_function("render_prompt_template", |b| {
        b.iter(|| to_prompt_template(black_box(result_schema())))
    });

    c.bench_function("render_response_schema", |b| {
        b.iter(|| to_response_schema(black_box(result_schema())))
    });
}

criterion_group!(
    benches,
    bench_extract,
    bench_normalize_base_url,
    bench_schema_render
);
criterion_main!(benches);
