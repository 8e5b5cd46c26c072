//! 병목 구간 탐지
//!
//! 시간순 차단 이벤트의 인접 쌍 (prior, current)마다 처리율을 계산합니다.
//!
//! ```text
//! interval   = (current.timestamp + current.duration) - prior.timestamp
//! throughput = 100 * (interval - current.duration - prior.duration) / interval
//! ```
//!
//! 처리율이 기준 미만인 쌍이 병목입니다. 이어지는 병목 쌍은 하나의 구간으로
//! 합치고, 떨어진 구간 사이에는 [`BottleneckEntry::Ellipsis`]를 넣습니다.

use heapscope_core::event::GcEvent;
use serde::Serialize;
use tracing::debug;

/// 병목 보고서의 한 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BottleneckEntry {
    /// 병목 구간에 속한 차단 이벤트
    Event(GcEvent),
    /// 서로 떨어진 병목 구간 사이의 구분자
    Ellipsis,
}

impl BottleneckEntry {
    pub fn event(&self) -> Option<&GcEvent> {
        match self {
            Self::Event(event) => Some(event),
            Self::Ellipsis => None,
        }
    }

    pub fn is_ellipsis(&self) -> bool {
        matches!(self, Self::Ellipsis)
    }
}

/// 인접한 두 차단 이벤트 사이의 처리율 (%, 0 방향 절삭)
///
/// 구간 길이가 0 이하이면 처리율을 정의할 수 없으므로 `None`입니다.
/// 두 이벤트가 겹치면 음수가 될 수 있습니다.
pub fn pair_throughput(prior: &GcEvent, current: &GcEvent) -> Option<i64> {
    let interval = i128::from(current.end()) - i128::from(prior.timestamp);
    if interval <= 0 {
        return None;
    }
    let paused = i128::from(current.duration) + i128::from(prior.duration);
    let throughput = 100 * (interval - paused) / interval;
    // 양수 쪽은 100을 넘지 않으므로 음수 쪽만 넘칠 수 있음
    Some(i64::try_from(throughput).unwrap_or(i64::MIN))
}

/// 쌍이 병목인지 판별합니다.
pub fn is_bottleneck(prior: &GcEvent, current: &GcEvent, threshold: u32) -> bool {
    pair_throughput(prior, current).is_some_and(|throughput| throughput < i64::from(threshold))
}

/// 시간순 차단 이벤트에서 병목 구간을 찾습니다.
///
/// `events`는 [`RunStore::blocking_events`](crate::RunStore::blocking_events)처럼
/// 타임스탬프 순으로 정렬되어 있어야 합니다.
pub fn find_bottlenecks(events: &[GcEvent], threshold: u32) -> Vec<BottleneckEntry> {
    let mut entries = Vec::new();
    // 현재 구간의 마지막 이벤트 인덱스
    let mut window_end: Option<usize> = None;
    let mut windows = 0usize;

    for (index, pair) in events.windows(2).enumerate() {
        let (prior, current) = (&pair[0], &pair[1]);
        if !is_bottleneck(prior, current, threshold) {
            continue;
        }

        match window_end {
            Some(end) if end == index => {}
            Some(_) => {
                entries.push(BottleneckEntry::Ellipsis);
                entries.push(BottleneckEntry::Event(prior.clone()));
                windows += 1;
            }
            None => {
                entries.push(BottleneckEntry::Event(prior.clone()));
                windows += 1;
            }
        }
        entries.push(BottleneckEntry::Event(current.clone()));
        window_end = Some(index + 1);
    }

    debug!(
        blocking_events = events.len(),
        threshold,
        windows,
        "bottleneck scan completed"
    );
    entries
}
