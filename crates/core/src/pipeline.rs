//! 파이프라인 trait -- 단계 간 확장 포인트 정의

use crate::event::{EventType, GcEvent};

/// 정규화된 로그 줄을 이벤트로 바꾸는 trait
///
/// 새로운 이벤트 레지스트리를 추가하려면 이 trait을 구현합니다.
pub trait EventParser: Send + Sync {
    /// 줄의 이벤트 종류를 식별합니다. 인식하지 못하면 [`EventType::Unknown`].
    fn identify(&self, line: &str) -> EventType;

    /// 식별된 종류로 줄을 파싱합니다.
    ///
    /// 숫자 변환에 실패하면 부분적으로 채운 이벤트 대신 UNKNOWN 이벤트를 돌려줍니다.
    fn parse(&self, event_type: EventType, line: &str) -> GcEvent;

    /// 식별과 파싱을 한 번에 수행합니다.
    fn parse_line(&self, line: &str) -> GcEvent {
        self.parse(self.identify(line), line)
    }
}

/// 이벤트를 받아 보관/집계하는 trait
pub trait EventSink: Send + Sync {
    /// 이벤트 하나를 받습니다.
    fn accept(&self, event: GcEvent);
}
