//! 이벤트 레지스트리 벤치마크
//!
//! 계열별 대표 줄의 식별/파싱 처리량과, 패턴 표 끝까지 가는 UNKNOWN 줄의
//! 최악 경로를 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use heapscope_core::pipeline::EventParser;
use heapscope_log_parser::parser::EventRegistry;

/// CMS ParNew (패턴 표 중간)
const PAR_NEW: &str = "1.234: [GC (Allocation Failure) 1.234: [ParNew: 17472K->1968K(19648K), 0.0225213 secs] 17472K->1968K(63360K), 0.0226000 secs] [Times: user=0.04 sys=0.00, real=0.02 secs]";

/// G1 상세 요약이 붙은 young pause (패턴 표 후반)
const G1_YOUNG: &str = "0.171: [GC pause (G1 Evacuation Pause) (young), 0.0028000 secs][Eden: 1024.0K(1024.0K)->0.0B(1024.0K) Survivors: 0.0B->1024.0K Heap: 1024.0K(1024.0K)->400.0K(2048.0K)] [Times: user=0.01 sys=0.00, real=0.00 secs]";

/// unified G1 young pause (패턴 표 앞부분)
const UNIFIED_YOUNG: &str =
    "[0.100s][info][gc] GC(0) Pause Young (Normal) (G1 Evacuation Pause) 24M->4M(256M) 3.254ms";

/// 어떤 패턴과도 맞지 않는 줄 (표 전체 탐색)
const UNKNOWN: &str = "12.500: something the registry has never seen before";

fn bench_parse_line(c: &mut Criterion) {
    let registry = EventRegistry::global();

    let mut group = c.benchmark_group("parse_line");
    group.throughput(Throughput::Elements(1));

    for (name, line) in [
        ("par_new", PAR_NEW),
        ("g1_young", G1_YOUNG),
        ("unified_young", UNIFIED_YOUNG),
        ("unknown", UNKNOWN),
    ] {
        group.bench_with_input(BenchmarkId::new("line", name), &line, |b, &line| {
            b.iter(|| registry.parse_line(black_box(line)))
        });
    }

    group.finish();
}

fn bench_identify(c: &mut Criterion) {
    let registry = EventRegistry::global();

    let mut group = c.benchmark_group("identify");
    group.throughput(Throughput::Elements(1));

    group.bench_function("par_new", |b| b.iter(|| registry.identify(black_box(PAR_NEW))));
    group.bench_function("unknown", |b| b.iter(|| registry.identify(black_box(UNKNOWN))));

    group.finish();
}

fn bench_parse_lines(c: &mut Criterion) {
    let registry = EventRegistry::global();
    let lines: Vec<&str> = [PAR_NEW, G1_YOUNG, UNIFIED_YOUNG, UNKNOWN]
        .iter()
        .cycle()
        .take(1000)
        .copied()
        .collect();

    let mut group = c.benchmark_group("parse_lines");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("mixed_1000", |b| {
        b.iter(|| registry.parse_lines(black_box(&lines), 1000))
    });
    group.finish();
}

fn bench_registry_build(c: &mut Criterion) {
    c.bench_function("registry_build", |b| b.iter(EventRegistry::new));
}

criterion_group!(
    benches,
    bench_parse_line,
    bench_identify,
    bench_parse_lines,
    bench_registry_build
);
criterion_main!(benches);
