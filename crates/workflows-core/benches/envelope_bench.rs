//! Criterion benchmarks for the inbound message decoder and URL composer.
//!
//! Every message the embedded page posts goes through `decode_message` on
//! the surface's event thread, so its cost is paid once per UI update.
//!
//! Run with:
//! ```bash
//! cargo bench --package workflows-core --bench envelope_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use workflows_core::{compose_load_url, decode_message, DecodingOptions};

// ── Message fixtures ──────────────────────────────────────────────────────────

fn make_step() -> Value {
    json!({"entity": "step", "value": {"id": "s1", "workflowId": "wf-1", "done": true}})
}

fn make_workflow(step_count: usize) -> Value {
    let steps: Vec<Value> = (0..step_count)
        .map(|i| json!({"id": format!("s{i}"), "name": format!("Step {i}"), "done": i % 2 == 0}))
        .collect();
    json!({"entity": "workflow", "value": {"id": "wf-1", "status": "in_progress", "steps": steps}})
}

fn make_unknown_fields() -> Value {
    json!({"entity": "step", "value": {"id": "s1", "score": 0.93, "tags": ["a", "b"], "meta": {"k": "v"}}})
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_decode(c: &mut Criterion) {
    let options = DecodingOptions::default();
    let mut group = c.benchmark_group("decode_message");

    group.bench_function("step", |b| {
        let body = make_step();
        b.iter(|| decode_message(black_box(&body), &options))
    });

    group.bench_function("step_with_unknown_fields", |b| {
        let body = make_unknown_fields();
        b.iter(|| decode_message(black_box(&body), &options))
    });

    for steps in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::new("workflow", steps), &steps, |b, &n| {
            let body = make_workflow(n);
            b.iter(|| decode_message(black_box(&body), &options))
        });
    }

    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    c.bench_function("compose_load_url", |b| {
        b.iter(|| {
            compose_load_url(
                black_box("https://view.example.com/session/xyz?token=abc&lang=es"),
                black_box(true),
            )
        })
    });
}

criterion_group!(benches, bench_decode, bench_compose);
criterion_main!(benches);
