//! Dispatch Performance Benchmarks
//!
//! Measures how fast the two global dispatchers scan their rule lists for
//! scalars, composites, façades and arrays.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jbridge::jvm::{JObject, Primitive, PrimitiveKind};
use jbridge::{
    to_host, to_managed, Action, Converter, ConverterRegistry, Hints, HostValue, Predicate,
    Priority,
};
use num_bigint::BigInt;

// ============================================================================
// Host to Managed
// ============================================================================

fn bench_scalars_to_managed(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_managed_scalars");
    let hints = Hints::new();

    let cases = [
        ("none", HostValue::None),
        ("bool", HostValue::Bool(true)),
        ("int", HostValue::from(42)),
        ("long", HostValue::from(1_i64 << 40)),
        ("bigint", HostValue::Int(BigInt::from(i64::MAX) * BigInt::from(1000))),
        ("float", HostValue::Float(0.5)),
        ("str", HostValue::str("hello")),
    ];

    for (name, value) in cases.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), value, |b, value| {
            b.iter(|| black_box(to_managed(black_box(value), &hints)))
        });
    }

    group.bench_function("int_hinted_byte", |b| {
        let hints = Hints::of_type("byte");
        let value = HostValue::from(7);
        b.iter(|| black_box(to_managed(black_box(&value), &hints)))
    });

    group.finish();
}

fn bench_composites_to_managed(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_managed_composites");
    let hints = Hints::new();

    for size in [10, 100, 1000] {
        let list = HostValue::list((0..size).map(HostValue::from).collect());
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("list", size), &list, |b, list| {
            b.iter(|| black_box(to_managed(black_box(list), &hints)))
        });

        let dict = HostValue::dict(
            (0..size).map(|i| (HostValue::str(format!("k{}", i)), HostValue::from(i))),
        );
        group.bench_with_input(BenchmarkId::new("dict", size), &dict, |b, dict| {
            b.iter(|| black_box(to_managed(black_box(dict), &hints)))
        });
    }

    group.finish();
}

// ============================================================================
// Managed to Host
// ============================================================================

fn bench_to_host(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_host");

    let cases = [
        ("integer", JObject::integer(42)),
        ("double", JObject::double(0.25)),
        ("string", JObject::string("hello")),
        ("list", JObject::array_list()),
        ("map", JObject::linked_hash_map()),
        ("opaque", JObject::new_object()),
    ];

    for (name, obj) in cases.iter() {
        let value = HostValue::Java(obj.clone());
        group.bench_with_input(BenchmarkId::from_parameter(name), &value, |b, value| {
            b.iter(|| black_box(to_host(black_box(value), true)))
        });
    }

    group.finish();
}

fn bench_arrays_to_host(c: &mut Criterion) {
    let mut group = c.benchmark_group("arrays_to_host");

    for size in [16, 256, 4096] {
        let values: Vec<Primitive> = (0..size).map(|i| Primitive::Double(i as f64)).collect();
        let Ok(array) = JObject::primitive_array(PrimitiveKind::Double, &values) else {
            continue;
        };
        let value = HostValue::Java(array);
        group.throughput(Throughput::Bytes((size * 8) as u64));
        group.bench_with_input(BenchmarkId::new("double_ndarray", size), &value, |b, value| {
            b.iter(|| black_box(to_host(black_box(value), false)))
        });
    }

    group.finish();
}

// ============================================================================
// Rule Engine
// ============================================================================

fn bench_registry_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_scan");

    for rules in [8, 64, 512] {
        let registry: ConverterRegistry<i64, i64> = ConverterRegistry::new("bench");
        registry.insert(
            Converter::new("fallback", Predicate::always(), Action::plain(|v: &i64| Ok(*v)))
                .with_priority(Priority::LAST),
        );
        for i in 0..rules {
            registry.insert(
                Converter::new(
                    format!("never {}", i),
                    Predicate::plain(|v: &i64| *v < 0),
                    Action::plain(|v: &i64| Ok(-v)),
                )
                .with_priority(Priority::from(i as f64)),
            );
        }

        let hints = Hints::new();
        group.bench_with_input(BenchmarkId::from_parameter(rules), &registry, |b, registry| {
            b.iter(|| black_box(registry.convert(black_box(&7), &hints)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scalars_to_managed,
    bench_composites_to_managed,
    bench_to_host,
    bench_arrays_to_host,
    bench_registry_scan,
);

criterion_main!(benches);
