use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use ferrous_beans::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

#[derive(Default)]
struct Leaf {
    data: Vec<u64>,
}

#[derive(Default)]
struct Left {
    right: Autowired<Right>,
}

#[derive(Default)]
struct Right {
    left: Autowired<Left>,
}

fn cyclic_factory() -> DefaultBeanFactory {
    let factory = DefaultBeanFactory::new();
    factory.register(
        BeanDefinition::builder::<Left, _>(Left::default)
            .autowire::<Right, _>("right", |l, r| l.right.set(r))
            .build(),
    );
    factory.register(
        BeanDefinition::builder::<Right, _>(Right::default)
            .autowire::<Left, _>("left", |r, l| r.left.set(l))
            .build(),
    );
    factory
}

fn bench_singleton_hit(c: &mut Criterion) {
    let factory = DefaultBeanFactory::new();
    factory.register_bean_definition("leaf", BeanDefinition::of::<Leaf>());
    let _ = factory.get_bean("leaf").unwrap();

    c.bench_function("singleton_hit_by_name", |b| {
        b.iter(|| black_box(factory.get_bean(black_box("leaf")).unwrap()))
    });

    c.bench_function("singleton_hit_typed", |b| {
        b.iter(|| black_box(factory.get_bean_as::<Leaf>("leaf").unwrap()))
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let factory = DefaultBeanFactory::new();
                factory.register_bean_definition(
                    "leaf",
                    BeanDefinition::builder::<Leaf, _>(|| Leaf { data: (0..1000).collect() }).build(),
                );
                factory
            },
            |factory| black_box(factory.get_bean_as::<Leaf>("leaf").unwrap().data.len()),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("cycle_cold", |b| {
        b.iter_batched(
            cyclic_factory,
            |factory| black_box(factory.get_bean("left").unwrap()),
            BatchSize::SmallInput,
        )
    });
}

fn bench_by_type_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("by_type_scan");

    for size in [10usize, 100, 1000] {
        let factory = DefaultBeanFactory::new();
        for i in 0..size {
            factory.register_bean_definition(format!("filler{}", i), BeanDefinition::of::<u64>());
        }
        factory.register_bean_definition("leaf", BeanDefinition::of::<Leaf>());
        let _ = factory.get_bean("leaf").unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &factory, |b, factory| {
            b.iter(|| black_box(factory.get_bean_of_type::<Leaf>().unwrap()))
        });
    }
    group.finish();
}

fn bench_proxied_call(c: &mut Criterion) {
    trait Counter: Send + Sync {
        fn bump(&self) -> u64;
    }

    #[derive(Default)]
    struct CounterService;

    impl Counter for CounterService {
        fn bump(&self) -> u64 {
            1
        }
    }

    struct CounterProxy {
        inner: Arc<dyn Counter>,
        interceptor: Interceptor,
    }

    impl Counter for CounterProxy {
        fn bump(&self) -> u64 {
            self.interceptor.invoke("bump", || self.inner.bump())
        }
    }

    struct Silent;
    impl Advice for Silent {}

    let factory = DefaultBeanFactory::builder()
        .post_processor(AutoProxyCreator::new().with_advice(vec![Arc::new(Silent) as Arc<dyn Advice>]))
        .build();
    factory.register(
        BeanDefinition::builder::<CounterService, _>(CounterService::default)
            .provides_intercepted::<dyn Counter, _, _>(
                |c| c as Arc<dyn Counter>,
                |inner, interceptor| Arc::new(CounterProxy { inner, interceptor }) as Arc<dyn Counter>,
            )
            .build(),
    );
    let counter = factory.get_bean_of_trait::<dyn Counter>().unwrap();

    c.bench_function("proxied_call", |b| b.iter(|| black_box(counter.bump())));
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_by_type_scan,
    bench_proxied_call
);
criterion_main!(benches);
