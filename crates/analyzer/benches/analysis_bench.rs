//! 집계/분석 벤치마크
//!
//! 이벤트 추가 비용과, 집계가 끝난 상태에서 스냅샷을 만드는 비용을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use heapscope_analyzer::{JvmRun, RunStore, find_bottlenecks};
use heapscope_core::config::AnalysisConfig;
use heapscope_core::event::{EventType, GcEvent};

fn events(count: u64) -> Vec<GcEvent> {
    (0..count)
        .map(|i| {
            // 10번에 한 번은 인접 이벤트와 붙어 병목을 만듦
            let timestamp = i * 1000 + if i % 10 == 0 { 990 } else { 0 };
            GcEvent::new(EventType::ParNew, timestamp, "bench").with_duration(20 + i % 7)
        })
        .collect()
}

fn bench_add(c: &mut Criterion) {
    let events = events(10_000);

    let mut group = c.benchmark_group("run_store");
    group.throughput(Throughput::Elements(events.len() as u64));
    group.bench_function("add_10000", |b| {
        b.iter(|| {
            let store = RunStore::default();
            for event in black_box(&events) {
                store.add(event.clone());
            }
            store
        })
    });
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let store = RunStore::default();
    for event in events(10_000) {
        store.add(event);
    }
    let config = AnalysisConfig::default();

    c.bench_function("jvm_run_from_store_10000", |b| {
        b.iter(|| JvmRun::from_store(black_box(&store), None, &config).unwrap())
    });
}

fn bench_bottlenecks(c: &mut Criterion) {
    let events = events(10_000);
    c.bench_function("find_bottlenecks_10000", |b| {
        b.iter(|| find_bottlenecks(black_box(&events), 90))
    });
}

criterion_group!(benches, bench_add, bench_build, bench_bottlenecks);
criterion_main!(benches);
