//! Resolution performance benchmarks
//!
//! Measures the non-I/O paths: fallback resolution, error classification and
//! config parsing. Probes are excluded since they are dominated by the network.
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use modelroute::{
    ModelConfig, ModelResolver, Provider, ProviderFailure, Task, classify, config::Config,
};
use std::hint::black_box;

/// Benchmark resolution with different numbers of hosted providers configured
///
/// With no keys the walk visits every provider before reaching Ollama.
fn bench_resolve(c: &mut Criterion) {
    let cases = [
        ("ollama_only", ""),
        ("openai_first", "[providers.openai]\napi_key = \"sk-bench\"\n"),
        (
            "google_only",
            "[providers.google-genai]\napi_key = \"g-bench\"\n",
        ),
    ];

    let mut group = c.benchmark_group("resolve");

    for (name, toml) in cases {
        let config: Config = toml.parse().expect("bench config should parse");
        let resolver = ModelResolver::new(&config).expect("resolver should build");
        group.bench_with_input(BenchmarkId::from_parameter(name), &resolver, |b, r| {
            b.iter(|| r.resolve(black_box(Task::Planner), None));
        });
    }

    group.finish();
}

/// Benchmark the explicit-config short circuit
fn bench_resolve_explicit(c: &mut Criterion) {
    let config = Config::default();
    let resolver = ModelResolver::new(&config).expect("resolver should build");
    let explicit = ModelConfig::new(Provider::Anthropic, "claude-sonnet-4-0").with_api_key("k");

    c.bench_function("resolve_explicit", |b| {
        b.iter(|| resolver.resolve(black_box(Task::Reviewer), Some(&explicit)));
    });
}

/// Benchmark classification across the pattern priority list
///
/// Unknown messages scan every pattern, so they are the worst case.
fn bench_classify(c: &mut Criterion) {
    let messages = [
        ("connection_refused", "connect ECONNREFUSED 127.0.0.1:11434"),
        ("model_not_found", "model not found, try pulling it first"),
        ("timeout", "request timed out after 30s"),
        (
            "unknown",
            "the upstream returned an unexpected payload while decoding the chunked stream",
        ),
    ];

    let mut group = c.benchmark_group("classify");

    for (name, message) in messages {
        let failure = ProviderFailure::from(message);
        group.bench_with_input(BenchmarkId::from_parameter(name), &failure, |b, f| {
            b.iter(|| classify(black_box(f)));
        });
    }

    group.finish();
}

/// Benchmark configuration parsing and validation
///
/// Called once at startup.
fn bench_config_parsing(c: &mut Criterion) {
    let toml_str = r#"
[server]
host = "127.0.0.1"
port = 3000

[providers.anthropic]
api_key = "sk-ant-bench"

[providers.ollama]
base_url = "http://localhost:11434"

[tasks]
planner = "anthropic:claude-sonnet-4-0"
summarizer = "ollama:deepseek-r1:1.5b"

[probe]
timeout_seconds = 5
"#;

    c.bench_function("config_parsing", |b| {
        b.iter(|| black_box(toml_str).parse::<Config>());
    });
}

criterion_group!(
    benches,
    bench_resolve,
    bench_resolve_explicit,
    bench_classify,
    bench_config_parsing,
);
criterion_main!(benches);
