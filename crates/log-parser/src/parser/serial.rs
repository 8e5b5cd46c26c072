//! Serial 컬렉터 (`DefNew` / `Tenured`)

use heapscope_core::event::EventType;

use super::extract::generational_event;
use super::{EventPattern, classic};
use crate::grammar::{DURATION, TIMESTAMP, TRIGGER, occupancy, perm_block};

pub(super) fn patterns() -> Vec<EventPattern> {
    let young = occupancy("young");
    let old = occupancy("old");
    let combined = occupancy("combined");
    let perm = perm_block();

    vec![
        EventPattern::new(
            EventType::SerialNew,
            &classic(&format!(
                r"\[GC{TRIGGER} ?(?:{TIMESTAMP}: )?\[DefNew: {young}, {DURATION} secs\] {combined}, (?P<dur>{DURATION}) secs\]"
            )),
            generational_event,
        ),
        // young 수집이 실패해 old까지 수집한 경우 DefNew 블록이 앞에 붙습니다.
        EventPattern::new(
            EventType::SerialOld,
            &classic(&format!(
                r"\[(?:Full GC|GC){TRIGGER} ?(?:{TIMESTAMP}: )?(?:\[DefNew: {young}, {DURATION} secs\] ?(?:{TIMESTAMP}: )?)?\[Tenured: {old}, {DURATION} secs\] {combined}{perm}, (?P<dur>{DURATION}) secs\]"
            )),
            generational_event,
        ),
    ]
}
