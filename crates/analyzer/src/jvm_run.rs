//! 실행 단위 분석 결과 스냅샷

use std::collections::BTreeSet;

use heapscope_core::config::AnalysisConfig;
use heapscope_core::event::{CollectorFamily, EventType, GcEvent};
use heapscope_core::units::Memory;
use serde::Serialize;
use tracing::info;

use crate::analysis::{AnalysisKey, analyze, is_partial_log};
use crate::bottleneck::{BottleneckEntry, find_bottlenecks};
use crate::error::AnalyzerError;
use crate::options::JvmOptions;
use crate::store::{RunStore, SafepointSummary, StoppedTimeSummary, UnidentifiedLine};

/// 읽기 전용 실행 요약
///
/// 집계가 끝난 [`RunStore`]에서 한 번 만듭니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JvmRun {
    pub first_timestamp: Option<u64>,
    pub last_timestamp: Option<u64>,
    pub max_pause: u64,
    pub total_pause: u64,
    pub blocking_event_count: usize,
    pub event_types: BTreeSet<EventType>,
    pub collectors: BTreeSet<CollectorFamily>,
    pub max_heap_occupancy: Option<Memory>,
    pub max_heap_after_gc: Option<Memory>,
    pub max_heap_space: Option<Memory>,
    pub max_perm_occupancy: Option<Memory>,
    pub max_perm_space: Option<Memory>,
    pub bottlenecks: Vec<BottleneckEntry>,
    pub analysis: Vec<AnalysisKey>,
    /// GC로 멈추지 않은 시간의 비율 (%)
    pub throughput: u64,
    pub safepoint_metrics: Vec<SafepointSummary>,
    pub stopped_time: StoppedTimeSummary,
    pub unidentified_count: usize,
    pub unidentified_lines: Vec<UnidentifiedLine>,
    /// 점검에 사용한 옵션 문자열
    pub jvm_options: Option<String>,
    pub jvm_version: Option<String>,
    pub physical_memory: Option<Memory>,
}

impl JvmRun {
    /// 집계된 상태에서 스냅샷을 만듭니다.
    ///
    /// 옵션 문자열은 `jvm_options`, 설정의 `analysis.jvm_options`, 로그 헤더의
    /// `CommandLine flags:` 순으로 찾습니다.
    pub fn from_store(
        store: &RunStore,
        jvm_options: Option<&str>,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalyzerError> {
        validate(config)?;

        let jvm_options = jvm_options
            .map(str::to_owned)
            .or_else(|| config.jvm_options.clone())
            .or_else(|| store.jvm_options_from_log())
            .filter(|options| !options.trim().is_empty());
        let options = jvm_options.as_deref().map(JvmOptions::parse).unwrap_or_default();

        let blocking = store.blocking_events(None);
        let total_pause = store.total_pause();
        let first_timestamp = store.first_timestamp();
        let run_start = if is_partial_log(first_timestamp, config.first_timestamp_threshold_secs) {
            first_timestamp.unwrap_or(0)
        } else {
            0
        };

        let run = Self {
            first_timestamp,
            last_timestamp: store.last_timestamp(),
            max_pause: store.max_pause(),
            total_pause,
            blocking_event_count: blocking.len(),
            event_types: store.event_types(),
            collectors: store.collectors(),
            max_heap_occupancy: store.max_heap_occupancy(),
            max_heap_after_gc: store.max_heap_after_gc(),
            max_heap_space: store.max_heap_space(),
            max_perm_occupancy: store.max_perm_occupancy(),
            max_perm_space: store.max_perm_space(),
            bottlenecks: find_bottlenecks(&blocking, config.throughput_threshold),
            analysis: analyze(store, &options, config.first_timestamp_threshold_secs),
            throughput: run_throughput(&blocking, total_pause, run_start),
            safepoint_metrics: store.safepoint_metrics(),
            stopped_time: store.stopped_time(),
            unidentified_count: store.unidentified_count(),
            unidentified_lines: store.unidentified_lines(),
            jvm_options,
            jvm_version: store.jvm_version(),
            physical_memory: store.physical_memory(),
        };

        info!(
            blocking_events = run.blocking_event_count,
            max_pause_ms = run.max_pause,
            total_pause_ms = run.total_pause,
            throughput = run.throughput,
            warnings = run.analysis.len(),
            unidentified = run.unidentified_count,
            "jvm run built"
        );
        Ok(run)
    }

    /// 병목 구간에 속한 이벤트 수 (구분자 제외)
    pub fn bottleneck_event_count(&self) -> usize {
        self.bottlenecks.iter().filter(|e| !e.is_ellipsis()).count()
    }
}

/// 이벤트 목록을 집계해 스냅샷을 만듭니다.
pub fn build_run<I>(
    events: I,
    jvm_options: Option<&str>,
    config: &AnalysisConfig,
) -> Result<JvmRun, AnalyzerError>
where
    I: IntoIterator<Item = GcEvent>,
{
    let store = RunStore::default();
    for event in events {
        store.add(event);
    }
    JvmRun::from_store(&store, jvm_options, config)
}

fn validate(config: &AnalysisConfig) -> Result<(), AnalyzerError> {
    if config.throughput_threshold > 100 {
        return Err(AnalyzerError::Config {
            field: "analysis.throughput_threshold".to_owned(),
            reason: format!("must be at most 100, got {}", config.throughput_threshold),
        });
    }
    Ok(())
}

/// 실행 전체의 처리율 (%, 0 방향 절삭)
///
/// 차단 이벤트가 없으면 100입니다. 벽시계 시간은 `run_start`부터 마지막 차단
/// 이벤트가 끝난 시각까지입니다.
pub fn run_throughput(blocking: &[GcEvent], total_pause: u64, run_start: u64) -> u64 {
    let Some(wall_end) = blocking.iter().map(GcEvent::end).max() else {
        return 100;
    };
    let wall = wall_end.saturating_sub(run_start);
    if wall == 0 {
        return 100;
    }
    let running = u128::from(wall.saturating_sub(total_pause));
    u64::try_from(running * 100 / u128::from(wall)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapscope_core::event::EventData;

    fn pause(event_type: EventType, timestamp: u64, duration: u64) -> GcEvent {
        GcEvent::new(event_type, timestamp, format!("{timestamp}")).with_duration(duration)
    }

    #[test]
    fn empty_run() {
        let run = build_run(Vec::new(), None, &AnalysisConfig::default()).unwrap();
        assert_eq!(run.throughput, 100);
        assert_eq!(run.first_timestamp, None);
        assert_eq!(run.blocking_event_count, 0);
        assert!(run.bottlenecks.is_empty());
        assert!(run.analysis.is_empty());
    }

    #[test]
    fn two_pause_scenario() {
        let events = vec![
            pause(EventType::ParNew, 0, 50),
            pause(EventType::ParNew, 1000, 500),
        ];
        let run = build_run(events, None, &AnalysisConfig::default()).unwrap();

        assert_eq!(run.max_pause, 500);
        assert_eq!(run.total_pause, 550);
        assert_eq!(run.bottleneck_event_count(), 2);
        // wall = 1500, (1500 - 550) / 1500 = 63%
        assert_eq!(run.throughput, 63);
    }

    #[test]
    fn partial_log_threshold_boundary() {
        let config = AnalysisConfig::default();

        let not_partial =
            build_run(vec![pause(EventType::ParNew, 59_999, 10)], None, &config).unwrap();
        assert!(!not_partial.analysis.contains(&AnalysisKey::PartialLog));

        let partial = build_run(vec![pause(EventType::ParNew, 60_001, 10)], None, &config).unwrap();
        assert!(partial.analysis.contains(&AnalysisKey::PartialLog));
    }

    #[test]
    fn partial_log_measures_from_first_event() {
        let events = vec![
            pause(EventType::ParallelScavenge, 100_000, 100),
            pause(EventType::ParallelScavenge, 100_900, 100),
        ];
        let run = build_run(events, None, &AnalysisConfig::default()).unwrap();
        // wall = 101_000 - 100_000 = 1000, pause 200
        assert_eq!(run.throughput, 80);
    }

    #[test]
    fn options_fall_back_to_log_header() {
        let events = vec![
            GcEvent::new(EventType::HeaderCommandLineFlags, 0, "flags")
                .with_data(EventData::JvmOptions("-Xms512m -Xmx1g".to_owned())),
            pause(EventType::ParNew, 100, 5),
        ];

        let from_log = build_run(events.clone(), None, &AnalysisConfig::default()).unwrap();
        assert_eq!(from_log.jvm_options.as_deref(), Some("-Xms512m -Xmx1g"));
        assert_eq!(
            from_log.analysis,
            vec![AnalysisKey::HeapMinNotEqualMax, AnalysisKey::ThreadStackSizeNotSet]
        );

        let explicit = build_run(
            events,
            Some("-Xms1g -Xmx1g -Xss512k"),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert!(explicit.analysis.is_empty());
    }

    #[test]
    fn config_options_used_when_argument_missing() {
        let config = AnalysisConfig {
            jvm_options: Some("-Xss4m".to_owned()),
            ..AnalysisConfig::default()
        };
        let run = build_run(Vec::new(), None, &config).unwrap();
        assert_eq!(run.analysis, vec![AnalysisKey::ThreadStackSizeLarge]);
    }

    #[test]
    fn threshold_above_100_is_rejected() {
        let config = AnalysisConfig {
            throughput_threshold: 101,
            ..AnalysisConfig::default()
        };
        let err = build_run(Vec::new(), None, &config).unwrap_err();
        assert!(err.to_string().contains("throughput_threshold"));
    }

    #[test]
    fn throughput_edge_cases() {
        assert_eq!(run_throughput(&[], 0, 0), 100);
        let instant = [pause(EventType::ParNew, 0, 0)];
        assert_eq!(run_throughput(&instant, 0, 0), 100);
        // 정지 시간이 벽시계보다 길면 0
        let overlapping = [pause(EventType::ParNew, 0, 10)];
        assert_eq!(run_throughput(&overlapping, 50, 0), 0);
    }

    #[test]
    fn run_serializes_to_json() {
        let run = build_run(
            vec![pause(EventType::G1YoungPause, 1000, 20)],
            None,
            &AnalysisConfig::default(),
        )
        .unwrap();
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["max_pause"], 20);
        assert_eq!(json["event_types"][0], "G1_YOUNG_PAUSE");
        assert_eq!(json["collectors"][0], "G1");
    }
}
