//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! 익스포터는 설치하지 않습니다. 레코더가 없으면 모든 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `heapscope_`
//! - 단계명: `preprocess_`, `parser_`, `analyzer_`, `pipeline_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(heapscope_core::metrics::PARSER_UNIDENTIFIED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 이벤트 종류 레이블 키 (`PAR_NEW`, `G1_YOUNG_PAUSE` 등)
pub const LABEL_EVENT_TYPE: &str = "event_type";

/// 전처리 액션 레이블 키 (`unloading_class`, `g1_detail` 등)
pub const LABEL_ACTION: &str = "action";

// ─── Preprocess 메트릭 ──────────────────────────────────────────────

/// Preprocess: 읽은 원시 줄 수 (counter)
pub const PREPROCESS_LINES_READ_TOTAL: &str = "heapscope_preprocess_lines_read_total";

/// Preprocess: 버린 줄 수 (counter, label: action)
pub const PREPROCESS_LINES_DISCARDED_TOTAL: &str = "heapscope_preprocess_lines_discarded_total";

/// Preprocess: 다른 줄에 합쳐진 줄 수 (counter, label: action)
pub const PREPROCESS_LINES_MERGED_TOTAL: &str = "heapscope_preprocess_lines_merged_total";

// ─── Parser 메트릭 ──────────────────────────────────────────────────

/// Parser: 파싱된 이벤트 수 (counter, label: event_type)
pub const PARSER_EVENTS_TOTAL: &str = "heapscope_parser_events_total";

/// Parser: 인식하지 못한 줄 수 (counter)
pub const PARSER_UNIDENTIFIED_TOTAL: &str = "heapscope_parser_unidentified_total";

/// Parser: 숫자 변환 실패로 UNKNOWN으로 강등된 줄 수 (counter, label: event_type)
pub const PARSER_DEMOTED_TOTAL: &str = "heapscope_parser_demoted_total";

// ─── Analyzer 메트릭 ────────────────────────────────────────────────

/// Analyzer: 저장소에 추가된 이벤트 수 (counter)
pub const ANALYZER_EVENTS_ADDED_TOTAL: &str = "heapscope_analyzer_events_added_total";

// ─── Pipeline 메트릭 ────────────────────────────────────────────────

/// Pipeline: 로그 한 개 처리 소요 시간 (histogram, 초)
pub const PIPELINE_RUN_DURATION_SECONDS: &str = "heapscope_pipeline_run_duration_seconds";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 로그 처리 소요 시간 히스토그램 버킷 (초)
///
/// 1ms ~ 120s 범위 (수백 MB 로그 포함)
pub const RUN_DURATION_BUCKETS: [f64; 9] = [0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 120.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // Preprocess
    describe_counter!(
        PREPROCESS_LINES_READ_TOTAL,
        "Total number of raw GC log lines read by the preprocessor"
    );
    describe_counter!(
        PREPROCESS_LINES_DISCARDED_TOTAL,
        "Total number of raw lines discarded as noise or detail output"
    );
    describe_counter!(
        PREPROCESS_LINES_MERGED_TOTAL,
        "Total number of raw lines merged into another logical line"
    );

    // Parser
    describe_counter!(
        PARSER_EVENTS_TOTAL,
        "Total number of GC events parsed, by event type"
    );
    describe_counter!(
        PARSER_UNIDENTIFIED_TOTAL,
        "Total number of normalized lines no event pattern recognized"
    );
    describe_counter!(
        PARSER_DEMOTED_TOTAL,
        "Total number of matched lines demoted to UNKNOWN after a numeric conversion failure"
    );

    // Analyzer
    describe_counter!(
        ANALYZER_EVENTS_ADDED_TOTAL,
        "Total number of events added to run stores"
    );

    // Pipeline
    describe_histogram!(
        PIPELINE_RUN_DURATION_SECONDS,
        "Time to preprocess and parse one GC log in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        PREPROCESS_LINES_READ_TOTAL,
        PREPROCESS_LINES_DISCARDED_TOTAL,
        PREPROCESS_LINES_MERGED_TOTAL,
        PARSER_EVENTS_TOTAL,
        PARSER_UNIDENTIFIED_TOTAL,
        PARSER_DEMOTED_TOTAL,
        ANALYZER_EVENTS_ADDED_TOTAL,
        PIPELINE_RUN_DURATION_SECONDS,
    ];

    #[test]
    fn all_metrics_start_with_heapscope_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("heapscope_"),
                "Metric '{}' does not start with 'heapscope_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in ALL_METRIC_NAMES
            .iter()
            .filter(|n| !n.ends_with("_seconds"))
        {
            assert!(name.ends_with("_total"), "counter '{}' lacks _total", name);
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [LABEL_EVENT_TYPE, LABEL_ACTION] {
            assert_eq!(label.to_lowercase(), label);
        }
    }

    #[test]
    fn run_duration_buckets_are_sorted() {
        let buckets = RUN_DURATION_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }
}
