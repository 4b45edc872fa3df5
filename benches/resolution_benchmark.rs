//! Resolution benchmarks
//!
//! Graph construction, context rebinding and forcing of the factorial programs.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tracelang::programs::{self, FactorialVariant};
use tracelang::{Engine, Rebinder};

const FACTORIAL_ARGS: &[i64] = &[4, 8, 16];

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.throughput(Throughput::Elements(1));

    for variant in FactorialVariant::ALL {
        group.bench_with_input(
            BenchmarkId::new("program", variant),
            &variant,
            |b, variant| b.iter(|| black_box(variant.program())),
        );
    }

    group.finish();
}

fn bench_factorial(c: &mut Criterion) {
    let mut group = c.benchmark_group("factorial");
    group.throughput(Throughput::Elements(1));
    let engine = Engine::default();

    for variant in FactorialVariant::ALL {
        let program = variant.program();
        for &n in FACTORIAL_ARGS {
            group.bench_with_input(
                BenchmarkId::new(variant.name(), n),
                &n,
                |b, &n| {
                    // a fresh call node each time, otherwise the memo answers
                    b.iter(|| black_box(engine.evaluate(&programs::factorial(&program, black_box(n)))))
                },
            );
        }
    }

    group.finish();
}

fn bench_rebind(c: &mut Criterion) {
    let program = programs::factorial_dynamic_structure();
    let context = match program.as_context() {
        Some(context) => context.clone(),
        None => return,
    };

    c.bench_function("rebind/copy", |b| b.iter(|| black_box(context.copy())));
    c.bench_function("rebind/walk", |b| {
        let rebinder = Rebinder::new(None, context.clone());
        let bindings: Vec<_> = context.literal().values().cloned().collect();
        b.iter(|| {
            for value in &bindings {
                black_box(rebinder.rebind(value));
            }
        })
    });
}

criterion_group!(benches, bench_build, bench_factorial, bench_rebind);
criterion_main!(benches);
