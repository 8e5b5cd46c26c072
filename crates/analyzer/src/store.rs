//! 실행 단위 이벤트 집계
//!
//! [`RunStore`]는 분석 한 번마다 새로 만드는 집계 컨텍스트입니다.
//! 이벤트를 받을 때 누적 통계를 갱신하므로 조회가 이벤트 전체를 다시 훑지 않습니다.
//!
//! writer 하나와 reader 여럿이 동시에 접근할 수 있습니다. 잠금은 조회 한 번
//! 동안만 잡고, 차단 이벤트 정렬처럼 오래 걸리는 작업은 잠금을 푼 뒤 수행합니다.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use heapscope_core::event::{CollectorFamily, EventData, EventType, GcEvent, SafepointTrigger};
use heapscope_core::metrics as m;
use heapscope_core::pipeline::EventSink;
use heapscope_core::units::{Memory, micros_to_millis, nanos_to_millis};
use metrics::counter;
use serde::Serialize;
use tracing::debug;

/// 보관할 인식 불가 줄의 기본 상한
pub const DEFAULT_MAX_UNIDENTIFIED_LINES: usize = 1000;

/// 명시적 GC 호출 원인
const EXPLICIT_GC_TRIGGER: &str = "System.gc()";

/// 안전점 트리거별 요약 (나노초)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafepointSummary {
    pub trigger: SafepointTrigger,
    pub count: u64,
    pub total_ns: u64,
    pub max_ns: u64,
}

impl SafepointSummary {
    fn new(trigger: SafepointTrigger) -> Self {
        Self {
            trigger,
            count: 0,
            total_ns: 0,
            max_ns: 0,
        }
    }

    fn record(&mut self, total_ns: u64) {
        self.count += 1;
        self.total_ns = self.total_ns.saturating_add(total_ns);
        self.max_ns = self.max_ns.max(total_ns);
    }

    /// 보고용 합계 (ms, round-half-to-even)
    pub fn total_millis(&self) -> u64 {
        nanos_to_millis(self.total_ns)
    }

    pub fn max_millis(&self) -> u64 {
        nanos_to_millis(self.max_ns)
    }
}

/// 인식하지 못한 줄과 고정된 시각
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnidentifiedLine {
    pub timestamp: u64,
    pub line: String,
}

/// 애플리케이션 정지 시간 통계 (마이크로초)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoppedTimeSummary {
    pub count: u64,
    pub total_us: u64,
    pub max_us: u64,
    /// 스레드를 멈추는 데 걸린 시간의 합
    pub time_to_stop_us: u64,
}

impl StoppedTimeSummary {
    fn record(&mut self, stopped_us: u64, time_to_stop_us: u64) {
        self.count += 1;
        self.total_us = self.total_us.saturating_add(stopped_us);
        self.max_us = self.max_us.max(stopped_us);
        self.time_to_stop_us = self.time_to_stop_us.saturating_add(time_to_stop_us);
    }

    /// 보고용 합계 (ms, round-half-to-even)
    pub fn total_millis(&self) -> u64 {
        micros_to_millis(self.total_us)
    }

    pub fn max_millis(&self) -> u64 {
        micros_to_millis(self.max_us)
    }
}

#[derive(Debug, Default)]
struct RunState {
    /// 삽입 순서의 차단 이벤트
    blocking: Vec<GcEvent>,
    event_count: usize,
    max_pause: u64,
    total_pause: u64,
    event_types: BTreeSet<EventType>,
    collectors: BTreeSet<CollectorFamily>,
    first_timestamp: Option<u64>,
    last_timestamp: Option<u64>,
    /// 타임스탬프 없는 UNKNOWN 줄을 고정할 직전 이벤트 시각
    anchor: u64,
    max_heap_occupancy: Option<Memory>,
    max_heap_after_gc: Option<Memory>,
    max_heap_space: Option<Memory>,
    max_perm_occupancy: Option<Memory>,
    max_perm_space: Option<Memory>,
    safepoints: BTreeMap<SafepointTrigger, SafepointSummary>,
    stopped: StoppedTimeSummary,
    unidentified_count: usize,
    unidentified_lines: Vec<UnidentifiedLine>,
    jvm_options: Option<String>,
    jvm_version: Option<String>,
    physical_memory: Option<Memory>,
    explicit_gc_count: usize,
    gc_time_limit_exceeded: bool,
}

impl RunState {
    fn ingest(&mut self, mut event: GcEvent, max_unidentified: usize) {
        self.event_count += 1;
        let event_type = event.event_type;

        if !event.has_own_timestamp() {
            debug!(anchor = self.anchor, "unknown line anchored to prior event");
            event.timestamp = self.anchor;
        }

        match &event.data {
            EventData::Collector(family) => {
                self.collectors.insert(*family);
            }
            EventData::JvmOptions(options) => {
                self.jvm_options.get_or_insert_with(|| options.clone());
            }
            EventData::Version(version) => {
                self.jvm_version.get_or_insert_with(|| version.clone());
            }
            EventData::PhysicalMemory(memory) => {
                self.physical_memory.get_or_insert(*memory);
            }
            EventData::Safepoint(data) => {
                self.safepoints
                    .entry(data.trigger.clone())
                    .or_insert_with(|| SafepointSummary::new(data.trigger.clone()))
                    .record(data.total_ns);
            }
            EventData::StoppedTime {
                stopped_us,
                time_to_stop_us,
            } => self.stopped.record(*stopped_us, *time_to_stop_us),
            EventData::Unidentified { .. } => {
                self.unidentified_count += 1;
                if self.unidentified_lines.len() < max_unidentified {
                    self.unidentified_lines.push(UnidentifiedLine {
                        timestamp: event.timestamp,
                        line: event.log_entry.clone(),
                    });
                }
            }
            _ => {}
        }

        if let Some(combined) = event.combined() {
            raise(&mut self.max_heap_occupancy, combined.init);
            raise(&mut self.max_heap_after_gc, combined.end);
            raise(&mut self.max_heap_space, combined.capacity);
        }
        if let Some(perm) = event.perm() {
            raise(&mut self.max_perm_occupancy, perm.init);
            raise(&mut self.max_perm_space, perm.capacity);
        }

        if event.trigger.as_deref() == Some(EXPLICIT_GC_TRIGGER) {
            self.explicit_gc_count += 1;
        }
        if event.log_entry.contains("GCTimeLimit") {
            self.gc_time_limit_exceeded = true;
        }

        if event_type != EventType::Unknown {
            self.event_types.insert(event_type);
        }
        // 헤더는 타임라인 밖
        if event_type.is_header() {
            return;
        }
        self.anchor = event.timestamp;
        if event_type == EventType::Unknown {
            return;
        }

        if let Some(collector) = event_type.collector() {
            self.collectors.insert(collector);
        }
        self.first_timestamp = Some(
            self.first_timestamp
                .map_or(event.timestamp, |first| first.min(event.timestamp)),
        );
        self.last_timestamp = Some(
            self.last_timestamp
                .map_or(event.timestamp, |last| last.max(event.timestamp)),
        );

        if event.is_blocking() {
            self.max_pause = self.max_pause.max(event.duration);
            self.total_pause = self.total_pause.saturating_add(event.duration);
            self.blocking.push(event);
        }
    }
}

/// 정확한 바이트 양으로 비교해 최대값을 갱신합니다.
fn raise(slot: &mut Option<Memory>, value: Memory) {
    if slot.is_none_or(|current| value > current) {
        *slot = Some(value);
    }
}

/// 실행 단위 이벤트 집계기
///
/// # 사용 예시
/// ```ignore
/// use heapscope_analyzer::RunStore;
///
/// let store = RunStore::new(1000);
/// for event in outcome.events {
///     store.add(event);
/// }
/// println!("max pause {}ms", store.max_pause());
/// ```
#[derive(Debug)]
pub struct RunStore {
    state: RwLock<RunState>,
    max_unidentified: usize,
}

impl RunStore {
    /// 인식 불가 줄 보관 상한을 지정해 빈 집계기를 만듭니다.
    pub fn new(max_unidentified: usize) -> Self {
        Self {
            state: RwLock::new(RunState::default()),
            max_unidentified,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RunState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RunState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 이벤트 하나를 집계합니다.
    ///
    /// 자체 타임스탬프가 없는 UNKNOWN 이벤트는 직전 이벤트의 시각에 고정됩니다.
    pub fn add(&self, event: GcEvent) {
        counter!(m::ANALYZER_EVENTS_ADDED_TOTAL, m::LABEL_EVENT_TYPE => event.event_type.name())
            .increment(1);
        self.write().ingest(event, self.max_unidentified);
    }

    /// 받은 이벤트 수 (헤더, UNKNOWN 포함)
    pub fn event_count(&self) -> usize {
        self.read().event_count
    }

    /// 가장 긴 차단 이벤트의 시간 (ms)
    pub fn max_pause(&self) -> u64 {
        self.read().max_pause
    }

    /// 차단 이벤트 시간의 합 (ms)
    pub fn total_pause(&self) -> u64 {
        self.read().total_pause
    }

    pub fn blocking_event_count(&self) -> usize {
        self.read().blocking.len()
    }

    /// 시간순으로 정렬된 차단 이벤트
    ///
    /// 같은 타임스탬프는 받은 순서를 유지합니다. `types`가 주어지면 해당
    /// 종류만 돌려줍니다.
    pub fn blocking_events(&self, types: Option<&[EventType]>) -> Vec<GcEvent> {
        let mut events: Vec<GcEvent> = {
            let state = self.read();
            state
                .blocking
                .iter()
                .filter(|event| types.is_none_or(|types| types.contains(&event.event_type)))
                .cloned()
                .collect()
        };
        events.sort_by_key(|event| event.timestamp);
        events
    }

    /// 안전점 요약 (전체 시간 내림차순, 같으면 트리거 순)
    pub fn safepoint_metrics(&self) -> Vec<SafepointSummary> {
        let mut metrics: Vec<SafepointSummary> = self.read().safepoints.values().cloned().collect();
        metrics.sort_by(|a, b| {
            b.total_ns
                .cmp(&a.total_ns)
                .then_with(|| a.trigger.cmp(&b.trigger))
        });
        metrics
    }

    /// 관측된 이벤트 종류 (헤더 포함, UNKNOWN 제외)
    pub fn event_types(&self) -> BTreeSet<EventType> {
        self.read().event_types.clone()
    }

    /// 타임라인 첫 이벤트 시각 (ms). 헤더와 UNKNOWN은 제외합니다.
    pub fn first_timestamp(&self) -> Option<u64> {
        self.read().first_timestamp
    }

    pub fn last_timestamp(&self) -> Option<u64> {
        self.read().last_timestamp
    }

    /// GC 전 힙 점유율 최대값
    pub fn max_heap_occupancy(&self) -> Option<Memory> {
        self.read().max_heap_occupancy
    }

    /// GC 후 힙 점유율 최대값
    pub fn max_heap_after_gc(&self) -> Option<Memory> {
        self.read().max_heap_after_gc
    }

    /// 힙 용량 최대값
    pub fn max_heap_space(&self) -> Option<Memory> {
        self.read().max_heap_space
    }

    pub fn max_perm_occupancy(&self) -> Option<Memory> {
        self.read().max_perm_occupancy
    }

    pub fn max_perm_space(&self) -> Option<Memory> {
        self.read().max_perm_space
    }

    pub fn stopped_time(&self) -> StoppedTimeSummary {
        self.read().stopped
    }

    pub fn unidentified_count(&self) -> usize {
        self.read().unidentified_count
    }

    /// 보관된 인식 불가 줄 (상한까지)
    pub fn unidentified_lines(&self) -> Vec<UnidentifiedLine> {
        self.read().unidentified_lines.clone()
    }

    /// 이벤트 종류와 `Using ...` 헤더에서 얻은 컬렉터 계열
    pub fn collectors(&self) -> BTreeSet<CollectorFamily> {
        self.read().collectors.clone()
    }

    /// 로그 헤더의 `CommandLine flags:` 값
    pub fn jvm_options_from_log(&self) -> Option<String> {
        self.read().jvm_options.clone()
    }

    pub fn jvm_version(&self) -> Option<String> {
        self.read().jvm_version.clone()
    }

    pub fn physical_memory(&self) -> Option<Memory> {
        self.read().physical_memory
    }

    /// `System.gc()`로 시작된 이벤트 수
    pub fn explicit_gc_count(&self) -> usize {
        self.read().explicit_gc_count
    }

    /// GC 시간 한도 경고가 기록되었는지 여부
    pub fn gc_time_limit_exceeded(&self) -> bool {
        self.read().gc_time_limit_exceeded
    }
}

impl Default for RunStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNIDENTIFIED_LINES)
    }
}

impl EventSink for RunStore {
    fn accept(&self, event: GcEvent) {
        self.add(event);
    }
}
