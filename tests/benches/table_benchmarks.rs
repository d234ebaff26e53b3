//! # NIC Table Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | Hash functions | one index per HMAC algorithm and for XOR |
//! | Counting filter | add/query/remove cycle at several k |
//! | Tables | FIB longest-prefix lookup, CS prefix-expanding insert |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nicsim_tables::{
    BankSpec, HmacAlgorithm, HmacHash, MemoryLog, Name, NicConfigBuilder, NicTables, TableKind,
    XorHash,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn bench_hash_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash-functions");
    let mut rng = StdRng::seed_from_u64(1);
    let name = Name::parse("/video/hd/segment/000042").wire_bytes();

    for algorithm in HmacAlgorithm::ALL {
        let hash = HmacHash::create(1 << 16, algorithm, &mut rng);
        group.bench_function(BenchmarkId::new("hmac", algorithm.name()), |b| {
            b.iter(|| black_box(hash.evaluate(black_box(&name), "FIB1")))
        });
    }

    let xor = nicsim_tables::domain::HashFunction::from(XorHash::random(1 << 16, &mut rng));
    group.bench_function("xor", |b| {
        b.iter(|| black_box(xor.evaluate(black_box(&name), "FIB1")))
    });

    group.finish();
}

fn bench_counting_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("counting-filter");
    group.measurement_time(Duration::from_secs(5));

    let names: Vec<Vec<u8>> = (0..1000)
        .map(|i| Name::parse(&format!("/bench/{}", i)).wire_bytes())
        .collect();

    for k in [1, 4, 8] {
        let mut rng = StdRng::seed_from_u64(k as u64);
        let spec: BankSpec = format!("65536,{}", k).parse().unwrap();
        let mut filter = spec.build(&mut rng).unwrap();

        group.throughput(Throughput::Elements(names.len() as u64));
        group.bench_with_input(BenchmarkId::new("add_query_remove", k), &names, |b, names| {
            b.iter(|| {
                for name in names {
                    filter.add(name, "PIT1");
                }
                for name in names {
                    black_box(filter.query(name, "PIT1"));
                }
                for name in names {
                    filter.remove(name, "PIT1");
                }
            })
        });
    }

    group.finish();
}

fn bench_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("tables");

    let config = NicConfigBuilder::new()
        .bank("bf1", "65536,4")
        .bank("bf2", "65536,4")
        .bank("bf3", "1024")
        .seed(9)
        .build()
        .unwrap();
    let tables = NicTables::from_config(&config).unwrap();
    let mut log = MemoryLog::new();

    for i in 0..256 {
        let prefix = Name::parse(&format!("/site{}/video", i));
        tables.insert(TableKind::Fib, &prefix, &mut log).unwrap();
    }

    let deep = Name::parse("/site17/video/hd/part/7/chunk/3");
    group.bench_function("fib_lpm_lookup", |b| {
        b.iter(|| {
            black_box(tables.table(TableKind::Fib).find(black_box(&deep)));
        })
    });

    let content = Name::parse("/site3/video/hd/part/7/chunk/3");
    group.bench_function("cs_insert_erase", |b| {
        b.iter(|| {
            let table = tables.table(TableKind::Cs);
            black_box(table.insert(&content));
            black_box(table.erase(&content));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_hash_functions, bench_counting_filter, bench_tables);
criterion_main!(benches);
