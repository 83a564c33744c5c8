//! Benchmarks for expectation registration and evaluation.

#![allow(
    clippy::min_ident_chars,
    clippy::expect_used,
    missing_docs,
    reason = "Benchmarks use standard loop variables and fail fast on setup errors"
)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use exemplar_core::{ExpectationRegistry, ObjectSpace, Reflect as _, Value};
use exemplar_fixtures::ClassPeFixtures;
use std::hint::black_box;
use std::time::Duration;

fn bench_class_pe_run(c: &mut Criterion) {
    let mut fixtures = ClassPeFixtures::setup().expect("class fixtures");
    let registry = fixtures.register_examples().expect("class examples");

    c.bench_function("class_pe_evaluate", |b| {
        b.iter(|| black_box(registry.evaluate(fixtures.space_mut())));
    });
}

fn bench_registry_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_evaluate");

    for size in [10usize, 100, 1000] {
        let mut space = ObjectSpace::new();
        let class = space.define_class(Some("A"), None).expect("class");
        let instance = Value::Object(space.new_instance(class).expect("instance"));
        let singleton = space.identity_descriptor(&instance).expect("singleton");

        let mut registry = ExpectationRegistry::new();
        for index in 0..size {
            let receiver = instance.clone();
            registry.register(
                format!("singleton {index}"),
                singleton.clone(),
                move |objects: &mut ObjectSpace| objects.identity_descriptor(&receiver),
            );
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let passed = registry.run_all(&mut space).filter(|outcome| outcome.passed()).count();
                black_box(passed)
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(2))
        .warm_up_time(Duration::from_millis(500))
        .sample_size(10);
    targets = bench_class_pe_run,
             bench_registry_size
}
criterion_main!(benches);
