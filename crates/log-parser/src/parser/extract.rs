//! 캡처 그룹 -> 이벤트 필드 변환
//!
//! 패턴들은 같은 그룹 이름 규칙을 따릅니다.
//!
//! | 그룹 | 의미 |
//! |------|------|
//! | `ts` | 고전 로그 타임스탬프 (초) |
//! | `uptime` / `uptime_ms` | unified 로그 uptime (초 / 밀리초) |
//! | `dur` | 이벤트 시간 (고전: 초, unified: 밀리초) |
//! | `trigger` | GC 원인 |
//! | `{name}_init`, `{name}_end`, `{name}_cap` | 점유율 (`young`, `old`, `combined`, `heap`, `perm`) |

use heapscope_core::error::ParseError;
use heapscope_core::event::{EventData, EventType, GcEvent, Occupancy};
use heapscope_core::units::{Memory, secs_to_millis, truncate_millis};
use regex::Captures;

/// 필수 그룹 값
pub(crate) fn group<'h>(caps: &Captures<'h>, name: &str) -> Result<&'h str, ParseError> {
    caps.name(name)
        .map(|m| m.as_str())
        .ok_or_else(|| ParseError::MissingGroup(name.to_owned()))
}

/// 10진 정수 그룹 값
pub(crate) fn integer(caps: &Captures<'_>, name: &str) -> Result<u64, ParseError> {
    let text = group(caps, name)?;
    text.parse::<u64>()
        .map_err(|e| ParseError::number(text, e.to_string()))
}

/// JVM 시작 이후 밀리초 (`ts`, `uptime`, `uptime_ms` 중 하나)
pub(crate) fn timestamp(caps: &Captures<'_>) -> Result<u64, ParseError> {
    if let Some(ts) = caps.name("ts").or_else(|| caps.name("uptime")) {
        return secs_to_millis(ts.as_str());
    }
    if caps.name("uptime_ms").is_some() {
        return integer(caps, "uptime_ms");
    }
    Err(ParseError::MissingGroup("ts".to_owned()))
}

/// 초 단위 `dur` 그룹을 밀리초로 (없으면 0)
pub(crate) fn duration_secs(caps: &Captures<'_>) -> Result<u64, ParseError> {
    caps.name("dur")
        .map_or(Ok(0), |m| secs_to_millis(m.as_str()))
}

/// 밀리초 단위 `dur` 그룹을 정수 밀리초로 (없으면 0)
pub(crate) fn duration_millis(caps: &Captures<'_>) -> Result<u64, ParseError> {
    caps.name("dur")
        .map_or(Ok(0), |m| truncate_millis(m.as_str()))
}

pub(crate) fn trigger(caps: &Captures<'_>) -> Option<String> {
    caps.name("trigger").map(|m| m.as_str().trim().to_owned())
}

/// `{name}_init`, `{name}_end`, `{name}_cap` 그룹의 점유율. 그룹이 없으면 `None`.
pub(crate) fn occupancy(caps: &Captures<'_>, name: &str) -> Result<Option<Occupancy>, ParseError> {
    let init_group = format!("{name}_init");
    let Some(init) = caps.name(&init_group) else {
        return Ok(None);
    };
    let end = group(caps, &format!("{name}_end"))?;
    let capacity = group(caps, &format!("{name}_cap"))?;
    Ok(Some(Occupancy::new(
        Memory::parse(init.as_str())?,
        Memory::parse(end)?,
        Memory::parse(capacity)?,
    )))
}

/// young/old/combined 점유율
///
/// 한 세대만 보고된 경우 나머지는 combined에서 빼서 유도합니다.
pub(crate) fn generational(caps: &Captures<'_>) -> Result<EventData, ParseError> {
    let combined = occupancy(caps, "combined")?
        .ok_or_else(|| ParseError::MissingGroup("combined_init".to_owned()))?;
    let perm = occupancy(caps, "perm")?;

    let (young, old) = match (occupancy(caps, "young")?, occupancy(caps, "old")?) {
        (Some(young), Some(old)) => (young, old),
        (Some(young), None) => (young, combined.minus(&young)),
        (None, Some(old)) => (combined.minus(&old), old),
        (None, None) => return Err(ParseError::MissingGroup("young_init".to_owned())),
    };

    Ok(EventData::Generational {
        young,
        old,
        combined,
        perm,
    })
}

/// 힙 전체 점유율. G1 상세 출력(`heap`)이 있으면 우선합니다.
pub(crate) fn heap(caps: &Captures<'_>) -> Result<EventData, ParseError> {
    let combined = match occupancy(caps, "heap")? {
        Some(heap) => Some(heap),
        None => occupancy(caps, "combined")?,
    };
    let perm = occupancy(caps, "perm")?;
    Ok(combined.map_or(EventData::None, |combined| EventData::Heap { combined, perm }))
}

// --- 공통 추출기 ---

/// 세대별 점유율을 가진 고전 이벤트 (serial, parallel, CMS)
pub(crate) fn generational_event(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    Ok(GcEvent::new(event_type, timestamp(caps)?, line)
        .with_duration(duration_secs(caps)?)
        .with_trigger(trigger(caps))
        .with_data(generational(caps)?))
}

/// 힙 전체 점유율을 가진 고전 이벤트 (G1)
pub(crate) fn heap_event(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    Ok(GcEvent::new(event_type, timestamp(caps)?, line)
        .with_duration(duration_secs(caps)?)
        .with_trigger(trigger(caps))
        .with_data(heap(caps)?))
}

/// 메모리 정보가 없는 고전 이벤트 (remark, 동시 단계)
pub(crate) fn timed_event(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    Ok(GcEvent::new(event_type, timestamp(caps)?, line)
        .with_duration(duration_secs(caps)?)
        .with_trigger(trigger(caps)))
}

/// unified 로그 이벤트 (밀리초 단위 시간, 힙 점유율 선택)
pub(crate) fn unified_event(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    Ok(GcEvent::new(event_type, timestamp(caps)?, line)
        .with_duration(duration_millis(caps)?)
        .with_trigger(trigger(caps))
        .with_data(heap(caps)?))
}

/// 잘린 이벤트 (타임스탬프만)
pub(crate) fn truncated_event(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    Ok(GcEvent::new(event_type, timestamp(caps)?, line))
}
