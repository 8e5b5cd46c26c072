//! 이벤트 레지스트리 -- 정규화된 줄의 이벤트 종류 식별 및 파싱
//!
//! [`EventRegistry`]는 `(EventType, Regex, guard, extractor)` 항목의 순서 있는
//! 정적 테이블입니다. 줄 전체가 일치하는 첫 번째 항목이 이벤트 종류를 결정하므로
//! 더 구체적인 패턴이 앞에 옵니다.
//!
//! # 계열별 순서
//! 1. 로그 헤더 ([`header`])
//! 2. unified 로그 ([`unified`])
//! 3. JDK 공통 ([`jdk`])
//! 4. Serial ([`serial`]), CMS ([`cms`]), Parallel ([`parallel`]), G1 ([`g1`])
//! 5. 잘린 GC 줄 (`Truncated`)
//!
//! 어느 항목과도 일치하지 않는 줄은 `Unknown` 이벤트가 됩니다 (실패가 아님).
//!
//! # 사용 예시
//! ```
//! use heapscope_core::event::EventType;
//! use heapscope_core::pipeline::EventParser;
//! use heapscope_log_parser::parser::EventRegistry;
//!
//! let line = "1.234: [GC 1.234: [ParNew: 17472K->1968K(19648K), 0.0225213 secs] 17472K->1968K(63360K), 0.0226 secs]";
//! let registry = EventRegistry::global();
//! assert_eq!(registry.identify(line), EventType::ParNew);
//! assert_eq!(registry.parse_line(line).duration, 22);
//! ```

pub mod cms;
pub mod extract;
pub mod g1;
pub mod header;
pub mod jdk;
pub mod parallel;
pub mod serial;
pub mod unified;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use heapscope_core::error::ParseError;
use heapscope_core::event::{EventType, GcEvent};
use heapscope_core::metrics as m;
use heapscope_core::pipeline::EventParser;
use metrics::counter;
use regex::{Captures, Regex};
use tracing::debug;

use crate::grammar::{TIMES_BLOCK, TIMESTAMP, UNIFIED_UPTIME, unified_gc_prefix, unified_prefix};

/// 캡처 그룹을 이벤트로 바꾸는 함수
pub type Extractor = fn(EventType, &Captures<'_>, &str) -> Result<GcEvent, ParseError>;

/// 정규식 외에 추가로 확인하는 조건
pub type Guard = fn(&str) -> bool;

/// 레지스트리 항목
pub struct EventPattern {
    event_type: EventType,
    regex: Regex,
    guard: Option<Guard>,
    extract: Extractor,
}

impl EventPattern {
    /// 새 항목을 만듭니다.
    ///
    /// 패턴은 컴파일 시점에 고정된 문자열이므로 컴파일 실패는 프로그래밍 오류입니다.
    pub fn new(event_type: EventType, pattern: &str, extract: Extractor) -> Self {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid {event_type} pattern: {e}"));
        Self {
            event_type,
            regex,
            guard: None,
            extract,
        }
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// 줄이 이 항목과 일치하는지 확인합니다.
    pub fn matches(&self, line: &str) -> bool {
        self.guard.is_none_or(|guard| guard(line)) && self.regex.is_match(line)
    }

    fn captures<'h>(&self, line: &'h str) -> Option<Captures<'h>> {
        if self.guard.is_some_and(|guard| !guard(line)) {
            return None;
        }
        self.regex.captures(line)
    }
}

impl fmt::Debug for EventPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPattern")
            .field("event_type", &self.event_type)
            .field("pattern", &self.regex.as_str())
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

// --- 패턴 조립 도우미 ---

/// 고전 로그 줄: `secs.millis: {body}` + 선택적인 `[Times: ...]`
pub(crate) fn classic(body: &str) -> String {
    format!(r"^(?P<ts>{TIMESTAMP}): {body}{TIMES_BLOCK}\s*$")
}

/// unified `[gc]` 태그 줄: `[uptime][level][gc] GC(n) {body}`
pub(crate) fn unified_gc(body: &str) -> String {
    let prefix = unified_gc_prefix();
    format!(r"{prefix}{body}\s*$")
}

/// unified 줄 (태그 지정)
pub(crate) fn unified(tags: &str, body: &str) -> String {
    let prefix = unified_prefix(tags);
    format!(r"{prefix}{body}\s*$")
}

/// 인식하지 못한 줄 앞의 타임스탬프 (`secs.millis: ` 또는 unified uptime)
fn leading_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^(?:(?P<ts>{TIMESTAMP}): |{UNIFIED_UPTIME})"))
            .expect("valid leading timestamp regex")
    })
}

fn truncated() -> EventPattern {
    EventPattern::new(
        EventType::Truncated,
        &format!(r"^(?P<ts>{TIMESTAMP}): \[(?:Full GC|GC).*$"),
        extract::truncated_event,
    )
    .with_guard(ends_inside_open_event)
}

/// 줄 끝에서 닫히지 않은 `[`가 남아 있는지 검사합니다.
///
/// 젊은 세대 단계는 끝났지만 뒤따르는 `[CMS`가 열린 채 잘린 조각도 포함합니다.
fn ends_inside_open_event(line: &str) -> bool {
    let depth = line.bytes().fold(0i64, |depth, b| match b {
        b'[' => depth + 1,
        b']' => depth - 1,
        _ => depth,
    });
    depth > 0
}

/// 순서 있는 이벤트 패턴 테이블
#[derive(Debug)]
pub struct EventRegistry {
    patterns: Vec<EventPattern>,
}

impl EventRegistry {
    /// 기본 패턴 테이블로 레지스트리를 만듭니다.
    ///
    /// 정규식 컴파일 비용이 있으므로 보통은 [`EventRegistry::global`]을 사용합니다.
    pub fn new() -> Self {
        let mut patterns = Vec::new();
        patterns.extend(header::patterns());
        patterns.extend(unified::patterns());
        patterns.extend(jdk::patterns());
        patterns.extend(serial::patterns());
        patterns.extend(cms::patterns());
        patterns.extend(parallel::patterns());
        patterns.extend(g1::patterns());
        patterns.push(truncated());
        Self { patterns }
    }

    /// 프로세스 전역 레지스트리 (최초 호출 시 한 번 컴파일)
    pub fn global() -> &'static EventRegistry {
        static REGISTRY: OnceLock<EventRegistry> = OnceLock::new();
        REGISTRY.get_or_init(EventRegistry::new)
    }

    /// 등록된 패턴 (시도 순서)
    pub fn patterns(&self) -> &[EventPattern] {
        &self.patterns
    }

    /// 정규화된 줄 전체를 파싱합니다.
    ///
    /// 인식하지 못한 원본 줄은 `max_unidentified`개까지만 보관하고 개수는 정확히 셉니다.
    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S], max_unidentified: usize) -> ParseOutcome {
        let mut outcome = ParseOutcome::new(max_unidentified);
        for line in lines {
            outcome.push(self.parse_line(line.as_ref()));
        }
        outcome
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventParser for EventRegistry {
    fn identify(&self, line: &str) -> EventType {
        self.patterns
            .iter()
            .find(|pattern| pattern.matches(line))
            .map_or(EventType::Unknown, EventPattern::event_type)
    }

    fn parse(&self, event_type: EventType, line: &str) -> GcEvent {
        self.patterns
            .iter()
            .filter(|pattern| pattern.event_type == event_type)
            .find_map(|pattern| {
                pattern
                    .captures(line)
                    .map(|caps| extract_event(pattern, &caps, line))
            })
            .unwrap_or_else(|| unknown(line))
    }

    fn parse_line(&self, line: &str) -> GcEvent {
        self.patterns
            .iter()
            .find_map(|pattern| {
                pattern
                    .captures(line)
                    .map(|caps| extract_event(pattern, &caps, line))
            })
            .unwrap_or_else(|| unknown(line))
    }
}

/// 추출에 실패한 줄은 부분적으로 채우지 않고 UNKNOWN으로 강등합니다.
fn extract_event(pattern: &EventPattern, caps: &Captures<'_>, line: &str) -> GcEvent {
    match (pattern.extract)(pattern.event_type, caps, line) {
        Ok(event) => event,
        Err(e) => {
            debug!(
                event_type = %pattern.event_type,
                error = %e,
                "matched line demoted to UNKNOWN"
            );
            counter!(m::PARSER_DEMOTED_TOTAL, m::LABEL_EVENT_TYPE => pattern.event_type.name())
                .increment(1);
            unknown(line)
        }
    }
}

/// 인식하지 못한 줄. 앞에 타임스탬프가 있으면 보존합니다.
fn unknown(line: &str) -> GcEvent {
    let timestamp = leading_timestamp_re()
        .captures(line)
        .and_then(|caps| extract::timestamp(&caps).ok());
    GcEvent::unknown(timestamp, line)
}

/// 파싱된 이벤트 메트릭을 기록합니다.
pub(crate) fn record_event(event: &GcEvent) {
    counter!(m::PARSER_EVENTS_TOTAL, m::LABEL_EVENT_TYPE => event.event_type.name()).increment(1);
    if event.event_type == EventType::Unknown {
        counter!(m::PARSER_UNIDENTIFIED_TOTAL).increment(1);
    }
}

/// [`EventRegistry::parse_lines`] 결과
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// 입력 순서의 모든 이벤트 (UNKNOWN 포함)
    pub events: Vec<GcEvent>,
    /// 인식하지 못한 원본 줄 (상한까지)
    pub unidentified: Vec<String>,
    /// 인식하지 못한 줄의 정확한 개수
    pub unidentified_count: usize,
    /// 관측된 이벤트 종류 (UNKNOWN 제외)
    pub event_types: BTreeSet<EventType>,
    max_unidentified: usize,
}

impl ParseOutcome {
    pub fn new(max_unidentified: usize) -> Self {
        Self {
            max_unidentified,
            ..Self::default()
        }
    }

    /// 이벤트 하나를 기록합니다.
    pub fn push(&mut self, event: GcEvent) {
        record_event(&event);

        if event.event_type == EventType::Unknown {
            self.unidentified_count += 1;
            if self.unidentified.len() < self.max_unidentified {
                self.unidentified.push(event.log_entry.clone());
            }
        } else {
            self.event_types.insert(event.event_type);
        }
        self.events.push(event);
    }

    /// 인식한 이벤트 수
    pub fn identified_count(&self) -> usize {
        self.events.len() - self.unidentified_count
    }
}
