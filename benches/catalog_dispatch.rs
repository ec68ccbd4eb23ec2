//! Catalog generation and dispatch benchmark.
//!
//! Measures tools/list generation per tier and facade dispatch latency
//! against the built-in catalog using Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use decibel_mcp::catalog;
use decibel_mcp::facade::DetailTier;
use decibel_mcp::tools::DispatchContext;
use serde_json::json;

fn bench_catalog(c: &mut Criterion) {
    let kernel = catalog::builtin().unwrap();

    let mut group = c.benchmark_group("mcp_tool_definitions");
    for tier in [DetailTier::Full, DetailTier::Compact, DetailTier::Micro] {
        group.bench_with_input(BenchmarkId::from_parameter(tier), &tier, |b, &t| {
            b.iter(|| kernel.mcp_tool_definitions(black_box(t)));
        });
    }
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let kernel = catalog::builtin().unwrap();
    let ctx = DispatchContext::default();

    let mut group = c.benchmark_group("dispatch");
    group.bench_function("facade_status", |b| {
        b.iter(|| {
            rt.block_on(kernel.dispatch(
                "kernel",
                black_box(json!({"action": "status"})),
                &ctx,
            ))
        });
    });
    group.bench_function("unknown_action", |b| {
        b.iter(|| {
            rt.block_on(kernel.dispatch(
                "sentinel",
                black_box(json!({"action": "delete"})),
                &ctx,
            ))
        });
    });
    group.bench_function("schema_rejection", |b| {
        b.iter(|| {
            rt.block_on(kernel.dispatch(
                "sentinel",
                black_box(json!({"action": "create", "priority": "urgent"})),
                &ctx,
            ))
        });
    });
    group.finish();
}

criterion_group!(benches, bench_catalog, bench_dispatch);
criterion_main!(benches);
