//! Benchmarks for the injector

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use type_injector::{Constructible, Injector, TypeKey, interface};

#[allow(dead_code)]
struct SmallService {
    value: i32,
}

#[allow(dead_code)]
struct MediumService {
    name: String,
    values: Vec<i32>,
}

#[allow(dead_code)]
struct Composite {
    small: Arc<SmallService>,
    medium: Arc<MediumService>,
}

impl Constructible for Composite {}

trait Named: Send + Sync {
    fn name(&self) -> &str;
}
interface!(Named);

impl Named for MediumService {
    fn name(&self) -> &str {
        &self.name
    }
}

fn medium() -> MediumService {
    MediumService {
        name: "test".to_string(),
        values: vec![1, 2, 3, 4, 5],
    }
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("map_small", |b| {
        b.iter(|| {
            let injector = Injector::new();
            injector.map(SmallService { value: 42 });
            black_box(injector)
        })
    });

    group.bench_function("map_to_interface", |b| {
        b.iter(|| {
            let injector = Injector::new();
            injector.map_to::<dyn Named>(Arc::new(medium()));
            black_box(injector)
        })
    });

    group.bench_function("provide", |b| {
        b.iter(|| {
            let injector = Injector::new();
            injector.provide(|| Arc::new(SmallService { value: 42 }));
            black_box(injector)
        })
    });

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.throughput(Throughput::Elements(1));

    let injector = Injector::new();
    injector
        .map(SmallService { value: 42 })
        .map_to::<dyn Named>(Arc::new(medium()));

    group.bench_function("resolve_concrete", |b| {
        b.iter(|| black_box(injector.resolve::<SmallService>().unwrap()))
    });

    group.bench_function("resolve_interface", |b| {
        b.iter(|| black_box(injector.resolve::<dyn Named>().unwrap()))
    });

    group.bench_function("get_not_found", |b| {
        b.iter(|| black_box(injector.get(TypeKey::of::<MediumService>())))
    });

    let child = injector.child().child().child();
    group.bench_function("resolve_from_depth_3", |b| {
        b.iter(|| black_box(child.resolve::<SmallService>().unwrap()))
    });

    group.finish();
}

fn bench_invoke(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoke");
    group.throughput(Throughput::Elements(1));

    let injector = Injector::new();
    injector
        .map(SmallService { value: 42 })
        .map(medium())
        .provide(|small: Arc<SmallService>, medium: Arc<MediumService>| {
            Arc::new(Composite { small, medium })
        });

    group.bench_function("invoke_two_params", |b| {
        b.iter(|| {
            let out = injector
                .invoke(|s: Arc<SmallService>, m: Arc<MediumService>| s.value + m.values.len() as i32)
                .unwrap();
            black_box(out)
        })
    });

    group.bench_function("construct_from_provider", |b| {
        b.iter(|| black_box(injector.construct::<Composite>().unwrap()))
    });

    group.bench_function("construct_later_100", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..100)
                .map(|_| injector.construct_later::<Composite>())
                .collect();
            injector.finish_construct().unwrap();
            black_box(handles)
        })
    });

    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    let injector = Injector::new();
    injector.map(SmallService { value: 42 });

    group.bench_function("resolve_4_threads", |b| {
        b.iter(|| {
            std::thread::scope(|scope| {
                for _ in 0..4 {
                    scope.spawn(|| {
                        for _ in 0..100 {
                            black_box(injector.resolve::<SmallService>().unwrap());
                        }
                    });
                }
            })
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_registration,
    bench_resolution,
    bench_invoke,
    bench_concurrent
);
criterion_main!(benches);
