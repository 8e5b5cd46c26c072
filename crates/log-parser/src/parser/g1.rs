//! G1 컬렉터 (JDK7/8 고전 로그)
//!
//! `-XX:+PrintGCDetails` 출력은 전처리 단계에서 `[Eden: ... Heap: ...]` 요약이 붙은
//! 한 줄로 합쳐집니다. 요약이 있으면 힙 점유율은 요약 값을 사용합니다.

use heapscope_core::event::EventType;

use super::extract::{heap_event, timed_event};
use super::{EventPattern, classic};
use crate::grammar::{DURATION, SIZE, TRIGGER, occupancy, perm_block};

/// `[Eden: ... Heap: 8192.0K(16.0M)->2600.0K(16.0M)]` 요약 (선택)
fn details() -> String {
    let perm = perm_block();
    format!(
        r"(?:\[Eden: .*? Heap: (?P<heap_init>{SIZE})\({SIZE}\)->(?P<heap_end>{SIZE})\((?P<heap_cap>{SIZE})\)\]{perm})?"
    )
}

/// `GC pause (...) (young|mixed)` 형태의 일시정지
fn pause(kind: &str) -> String {
    let combined = occupancy("combined");
    let details = details();
    classic(&format!(
        r"\[GC pause(?: \((?P<trigger>System\.gc\(\)|[A-Za-z][A-Za-z0-9 ._-]*)\))? \({kind}\)(?: \((?:initial-mark|to-space exhausted|to-space overflow)\))*(?:--)?(?: {combined})?, (?P<dur>{DURATION}) secs\]{details}"
    ))
}

pub(super) fn patterns() -> Vec<EventPattern> {
    let combined = occupancy("combined");
    let details = details();

    vec![
        EventPattern::new(EventType::G1MixedPause, &pause("mixed"), heap_event),
        EventPattern::new(EventType::G1YoungPause, &pause("young"), heap_event),
        EventPattern::new(
            EventType::G1FullGc,
            &classic(&format!(
                r"\[Full GC{TRIGGER} +{combined}, (?P<dur>{DURATION}) secs\]{details}"
            )),
            heap_event,
        ),
        EventPattern::new(
            EventType::G1Remark,
            &classic(&format!(r"\[GC remark(?:,| .*,) (?P<dur>{DURATION}) secs\]")),
            timed_event,
        ),
        EventPattern::new(
            EventType::G1Cleanup,
            &classic(&format!(
                r"\[GC cleanup(?: {combined})?, (?P<dur>{DURATION}) secs\]"
            )),
            heap_event,
        ),
        EventPattern::new(
            EventType::G1Concurrent,
            &classic(&format!(r"\[GC concurrent-[a-z-]+(?:, {DURATION} secs)?\]")),
            timed_event,
        ),
    ]
}
