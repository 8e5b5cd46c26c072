//! unified logging (JDK9+ `-Xlog:gc`) 이벤트
//!
//! 시간은 밀리초 (`3.254ms`), 타임스탬프는 uptime 데코레이터 그대로입니다.
//! 컬렉터 계열은 이벤트 종류가 아니라 `Using ...` 헤더에서 정해집니다.

use heapscope_core::error::ParseError;
use heapscope_core::event::{EventType, GcEvent};
use regex::Captures;

use super::extract::{timed_event, unified_event};
use super::{EventPattern, unified_gc};
use crate::grammar::{UNIFIED_MILLIS, UNIFIED_TRIGGER, occupancy};

/// JDK17+ 의 `(Evacuation Failure)` 표시 (선택)
const EVACUATION_FAILURE: &str = r"(?: \((?:Evacuation Failure|To-space exhausted)\))?";

pub(super) fn patterns() -> Vec<EventPattern> {
    let combined = occupancy("combined");
    let dur = format!(r"(?P<dur>{UNIFIED_MILLIS})ms");

    vec![
        EventPattern::new(
            EventType::UnifiedG1MixedPause,
            &unified_gc(&format!(
                r"Pause (?:Young \(Mixed\)|Mixed) \((?P<trigger>{UNIFIED_TRIGGER})\){EVACUATION_FAILURE} {combined} {dur}"
            )),
            unified_event,
        ),
        // JDK9/10 은 `Pause Young (G1 ...)`, JDK11+ 은 `Pause Young (Normal) (...)`
        EventPattern::new(
            EventType::UnifiedG1YoungPause,
            &unified_gc(&format!(
                r"Pause (?:Young \((?:Normal|Concurrent Start|Prepare Mixed)\) \((?P<trigger>{UNIFIED_TRIGGER})\)|(?:Young|Initial Mark) \((?P<g1_trigger>G1 [^()]+)\)){EVACUATION_FAILURE} {combined} {dur}"
            )),
            g1_young_pause,
        ),
        EventPattern::new(
            EventType::UnifiedYoung,
            &unified_gc(&format!(
                r"Pause Young \((?P<trigger>{UNIFIED_TRIGGER})\) {combined} {dur}"
            )),
            unified_event,
        ),
        EventPattern::new(
            EventType::UnifiedFull,
            &unified_gc(&format!(
                r"Pause Full \((?P<trigger>{UNIFIED_TRIGGER})\) {combined} {dur}"
            )),
            unified_event,
        ),
        EventPattern::new(
            EventType::UnifiedRemark,
            &unified_gc(&format!(r"Pause Remark(?: {combined})? {dur}")),
            unified_event,
        ),
        EventPattern::new(
            EventType::UnifiedCleanup,
            &unified_gc(&format!(r"Pause Cleanup(?: {combined})? {dur}")),
            unified_event,
        ),
        // 동시 단계는 비차단이므로 시간을 기록하지 않습니다.
        EventPattern::new(
            EventType::UnifiedConcurrent,
            &unified_gc(&format!(
                r"Concurrent [A-Za-z ]+?(?: \([^)]*\))*(?: {UNIFIED_MILLIS}ms)?"
            )),
            timed_event,
        ),
    ]
}

fn g1_young_pause(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    let event = unified_event(event_type, caps, line)?;
    Ok(match caps.name("g1_trigger") {
        Some(trigger) => event.with_trigger(Some(trigger.as_str().to_owned())),
        None => event,
    })
}
