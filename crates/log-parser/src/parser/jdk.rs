//! JDK 공통 이벤트 -- 애플리케이션 정지/실행 시간과 안전점
//!
//! 모두 비차단 이벤트이며, 안전점과 정지 시간 집계에 사용됩니다.

use heapscope_core::error::ParseError;
use heapscope_core::event::{EventData, EventType, GcEvent, SafepointData, SafepointTrigger};
use heapscope_core::units::{secs_to_micros, secs_to_millis};
use regex::Captures;

use super::extract::{group, integer, timestamp};
use super::{EventPattern, classic, unified};
use crate::grammar::{DURATION, TIMESTAMP};

const NANOS_PER_MILLI: u64 = 1_000_000;

fn stopped_body() -> String {
    format!(
        r"Total time for which application threads were stopped: (?P<stopped>{DURATION}) seconds(?:, Stopping threads took: (?P<tts>{DURATION}) seconds)?"
    )
}

fn concurrent_body() -> String {
    format!(r"Application time: (?P<concurrent>{DURATION}) seconds")
}

pub(super) fn patterns() -> Vec<EventPattern> {
    vec![
        EventPattern::new(
            EventType::ApplicationStoppedTime,
            &classic(&stopped_body()),
            stopped_time,
        ),
        EventPattern::new(
            EventType::ApplicationStoppedTime,
            &unified(r"safepoint", &stopped_body()),
            stopped_time,
        ),
        EventPattern::new(
            EventType::ApplicationConcurrentTime,
            &classic(&concurrent_body()),
            concurrent_time,
        ),
        EventPattern::new(
            EventType::ApplicationConcurrentTime,
            &unified(r"safepoint", &concurrent_body()),
            concurrent_time,
        ),
        // JDK8 -XX:+PrintSafepointStatistics
        EventPattern::new(
            EventType::Safepoint,
            &format!(
                r"^\s*(?P<ts>{TIMESTAMP}): (?P<trigger>[A-Za-z_][A-Za-z0-9_ ]*?)\s+\[\s*\d+\s+\d+\s+\d+\s*\]\s+\[\s*(?P<spin>\d+)\s+(?P<block>\d+)\s+(?P<sync>\d+)\s+(?P<cleanup>\d+)\s+(?P<vmop>\d+)\s*\]\s+\d+\s*$"
            ),
            jdk8_safepoint,
        ),
        EventPattern::new(
            EventType::UnifiedSafepoint,
            &unified(
                r"safepoint",
                r#"Safepoint "(?P<trigger>[^"]+)", Time since last: \d+ ns, Reaching safepoint: (?P<reaching>\d+) ns, (?:Cleanup: (?P<cleanup>\d+) ns, )?At safepoint: (?P<at>\d+) ns, Total: (?P<total>\d+) ns"#,
            ),
            unified_safepoint,
        ),
    ]
}

fn stopped_time(event_type: EventType, caps: &Captures<'_>, line: &str) -> Result<GcEvent, ParseError> {
    let stopped = group(caps, "stopped")?;
    let time_to_stop_us = caps
        .name("tts")
        .map_or(Ok(0), |m| secs_to_micros(m.as_str()))?;
    Ok(GcEvent::new(event_type, timestamp(caps)?, line)
        .with_duration(secs_to_millis(stopped)?)
        .with_data(EventData::StoppedTime {
            stopped_us: secs_to_micros(stopped)?,
            time_to_stop_us,
        }))
}

fn concurrent_time(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    let concurrent = group(caps, "concurrent")?;
    Ok(GcEvent::new(event_type, timestamp(caps)?, line).with_data(EventData::ConcurrentTime {
        concurrent_us: secs_to_micros(concurrent)?,
    }))
}

/// 밀리초 그룹 값을 나노초로
fn millis_as_nanos(caps: &Captures<'_>, name: &str) -> Result<u64, ParseError> {
    let millis = integer(caps, name)?;
    millis
        .checked_mul(NANOS_PER_MILLI)
        .ok_or_else(|| ParseError::number(group(caps, name).unwrap_or_default(), "overflow"))
}

fn checked_sum(values: &[u64]) -> Result<u64, ParseError> {
    values
        .iter()
        .try_fold(0u64, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| ParseError::number(&format!("{values:?}"), "overflow"))
}

/// JDK8 통계의 `sync`는 spin/block을 포함한 도달 시간입니다.
fn jdk8_safepoint(event_type: EventType, caps: &Captures<'_>, line: &str) -> Result<GcEvent, ParseError> {
    let reaching_ns = millis_as_nanos(caps, "sync")?;
    let cleanup_ns = millis_as_nanos(caps, "cleanup")?;
    let at_safepoint_ns = millis_as_nanos(caps, "vmop")?;
    let total_ns = checked_sum(&[reaching_ns, cleanup_ns, at_safepoint_ns])?;
    safepoint_event(
        event_type,
        caps,
        line,
        SafepointData {
            trigger: SafepointTrigger::from_name(group(caps, "trigger")?.trim()),
            reaching_ns,
            cleanup_ns,
            at_safepoint_ns,
            total_ns,
        },
    )
}

fn unified_safepoint(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    let cleanup_ns = if caps.name("cleanup").is_some() {
        integer(caps, "cleanup")?
    } else {
        0
    };
    safepoint_event(
        event_type,
        caps,
        line,
        SafepointData {
            trigger: SafepointTrigger::from_name(group(caps, "trigger")?),
            reaching_ns: integer(caps, "reaching")?,
            cleanup_ns,
            at_safepoint_ns: integer(caps, "at")?,
            total_ns: integer(caps, "total")?,
        },
    )
}

fn safepoint_event(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
    data: SafepointData,
) -> Result<GcEvent, ParseError> {
    Ok(GcEvent::new(event_type, timestamp(caps)?, line)
        .with_duration(data.total_ns / NANOS_PER_MILLI)
        .with_data(EventData::Safepoint(data)))
}
